//! Image-tracker simulator.
//!
//! Generates per-frame raw poses and lifecycle events with:
//! - Uniform position/rotation/scale jitter
//! - Glitch frames (re-detection snaps far from the true pose)
//! - Detection flicker (one-frame raw losses)
//! - Found/lost events derived from marker visibility

use crate::target::MarkerTarget;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use smoother_core::types::{
    Pose, PoseSample, TargetId, TrackerEvent, TrackerEventKind, Vec3,
};
use std::collections::HashMap;

/// Noise characteristics of the simulated tracker.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TrackerNoise {
    /// Half-width of the uniform position jitter (scene units)
    pub position_jitter: f64,
    /// Half-width of the uniform Euler jitter (radians)
    pub rotation_jitter: f64,
    /// Half-width of the uniform scale jitter
    pub scale_jitter: f64,
    /// Probability per frame of a glitch sample
    pub glitch_probability: f64,
    /// Position offset magnitude of a glitch sample
    pub glitch_magnitude: f64,
    /// Probability per frame that a visible marker is reported lost
    pub flicker_probability: f64,
}

impl Default for TrackerNoise {
    fn default() -> Self {
        Self {
            position_jitter: 0.005,
            rotation_jitter: 0.01,
            scale_jitter: 0.005,
            glitch_probability: 0.0,
            glitch_magnitude: 1.5,
            flicker_probability: 0.0,
        }
    }
}

/// Ground-truth pose of one marker at a frame.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct TruthPose {
    pub target: TargetId,
    pub pose: Pose,
}

/// Everything the simulated tracker reported at one frame.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TrackerFrame {
    pub time: f64,
    pub events: Vec<TrackerEvent>,
    pub samples: Vec<PoseSample>,
    /// True poses of the markers that produced a sample
    pub truth: Vec<TruthPose>,
}

/// Generates tracker frames from a set of markers.
pub struct TrackerSimulator {
    pub noise: TrackerNoise,
    rng: ChaCha8Rng,
    /// Detection state last reported per marker
    detected: HashMap<TargetId, bool>,
}

impl TrackerSimulator {
    pub fn new(noise: TrackerNoise, seed: u64) -> Self {
        Self {
            noise,
            rng: ChaCha8Rng::seed_from_u64(seed),
            detected: HashMap::new(),
        }
    }

    fn uniform(&mut self, half_width: f64) -> f64 {
        if half_width <= 0.0 {
            return 0.0;
        }
        self.rng.gen::<f64>() * half_width * 2.0 - half_width
    }

    fn jitter3(&mut self, half_width: f64) -> Vec3 {
        Vec3::new(
            self.uniform(half_width),
            self.uniform(half_width),
            self.uniform(half_width),
        )
    }

    /// Corrupt a true pose the way the tracker would.
    fn observe(&mut self, truth: &Pose) -> Pose {
        let mut pose = *truth;
        pose.position += self.jitter3(self.noise.position_jitter);
        pose.rotation += self.jitter3(self.noise.rotation_jitter);
        let s = self.uniform(self.noise.scale_jitter);
        pose.scale += Vec3::repeat(s);

        if self.rng.gen::<f64>() < self.noise.glitch_probability {
            // Random direction on the unit sphere, scaled
            let dir = Vec3::new(
                self.uniform(1.0),
                self.uniform(1.0),
                self.uniform(1.0),
            );
            let dir = if dir.norm() > 1e-6 {
                dir.normalize()
            } else {
                Vec3::x()
            };
            pose.position += dir * self.noise.glitch_magnitude;
        }
        pose
    }

    /// Produce the tracker output for all markers at `time`.
    pub fn generate_frame(&mut self, targets: &[MarkerTarget], time: f64) -> TrackerFrame {
        let mut frame = TrackerFrame {
            time,
            ..Default::default()
        };

        for target in targets {
            let mut visible = target.is_visible(time);
            if visible && self.rng.gen::<f64>() < self.noise.flicker_probability {
                visible = false;
            }

            let was = self.detected.get(&target.id).copied().unwrap_or(false);
            if visible != was {
                let kind = if visible {
                    TrackerEventKind::Found
                } else {
                    TrackerEventKind::Lost
                };
                frame.events.push(TrackerEvent {
                    target: target.id,
                    time,
                    kind,
                });
                self.detected.insert(target.id, visible);
            }

            if visible {
                let pose = self.observe(&target.pose);
                frame.samples.push(PoseSample {
                    target: target.id,
                    time,
                    pose,
                });
                frame.truth.push(TruthPose {
                    target: target.id,
                    pose: target.pose,
                });
            }
        }

        frame
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::MotionSpec;

    fn marker(id: u32) -> MarkerTarget {
        MarkerTarget::new(
            TargetId(id),
            Pose::from_position(Vec3::new(0.0, 0.0, -1.0)),
            MotionSpec::Static,
        )
    }

    #[test]
    fn first_visible_frame_emits_found() {
        let mut sim = TrackerSimulator::new(TrackerNoise::default(), 1);
        let targets = vec![marker(0)];
        let f0 = sim.generate_frame(&targets, 0.0);
        assert_eq!(f0.events.len(), 1);
        assert_eq!(f0.events[0].kind, TrackerEventKind::Found);
        assert_eq!(f0.samples.len(), 1);

        let f1 = sim.generate_frame(&targets, 0.1);
        assert!(f1.events.is_empty());
    }

    #[test]
    fn occlusion_emits_lost_then_found() {
        let mut sim = TrackerSimulator::new(TrackerNoise::default(), 1);
        let mut m = marker(0);
        m.occlusions = vec![(1.0, 2.0)];
        let targets = vec![m];
        sim.generate_frame(&targets, 0.5);
        let lost = sim.generate_frame(&targets, 1.5);
        assert_eq!(lost.events[0].kind, TrackerEventKind::Lost);
        assert!(lost.samples.is_empty());
        let found = sim.generate_frame(&targets, 2.5);
        assert_eq!(found.events[0].kind, TrackerEventKind::Found);
    }

    #[test]
    fn jitter_is_bounded() {
        let noise = TrackerNoise {
            position_jitter: 0.01,
            ..Default::default()
        };
        let mut sim = TrackerSimulator::new(noise, 7);
        let targets = vec![marker(0)];
        for i in 0..500 {
            let f = sim.generate_frame(&targets, i as f64);
            let d = f.samples[0].pose.position - targets[0].pose.position;
            assert!(d.iter().all(|v| v.abs() <= 0.01));
        }
    }

    #[test]
    fn glitches_are_far() {
        let noise = TrackerNoise {
            position_jitter: 0.0,
            glitch_probability: 1.0,
            glitch_magnitude: 2.0,
            ..Default::default()
        };
        let mut sim = TrackerSimulator::new(noise, 3);
        let targets = vec![marker(0)];
        let f = sim.generate_frame(&targets, 0.0);
        let d = f.samples[0].pose.position_distance(&targets[0].pose);
        assert!((d - 2.0).abs() < 1e-9);
    }

    #[test]
    fn same_seed_same_frames() {
        let noise = TrackerNoise {
            glitch_probability: 0.1,
            flicker_probability: 0.05,
            ..Default::default()
        };
        let targets = vec![marker(0), marker(1)];
        let mut a = TrackerSimulator::new(noise.clone(), 42);
        let mut b = TrackerSimulator::new(noise, 42);
        for i in 0..100 {
            let t = i as f64 / 60.0;
            let fa = a.generate_frame(&targets, t);
            let fb = b.generate_frame(&targets, t);
            assert_eq!(fa.samples, fb.samples);
            assert_eq!(fa.events, fb.events);
        }
    }
}
