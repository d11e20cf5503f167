//! Scenario definitions.
//!
//! Each scenario is a named set of markers plus tracker noise and frame
//! timing. All scenarios are deterministic given the same seed.

use crate::{
    target::{MarkerTarget, MotionSpec},
    tracker_sim::TrackerNoise,
};
use serde::{Deserialize, Serialize};
use smoother_core::types::{Pose, TargetId, Vec3};

/// Which pre-defined scenario to load.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, clap::ValueEnum)]
pub enum ScenarioKind {
    /// One static marker, light jitter
    Steady,
    /// One marker under hand-held camera sway
    Handheld,
    /// Static marker with frequent re-detection snaps
    Glitchy,
    /// Marker occluded twice, plus detection flicker
    Occluded,
    /// Three markers, one per physical target, appearing in turn
    MultiMarker,
    /// Heavy jitter and dropped frames, as on a phone in low light
    LowLight,
}

/// Frame-timing irregularities.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct FrameTiming {
    /// Probability per frame of a stall
    pub stall_probability: f64,
    /// Extra time added by a stall (seconds)
    pub stall_duration: f64,
}

/// A fully configured simulation scenario.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub seed: u64,
    pub duration: f64,   // seconds
    pub frame_dt: f64,   // nominal render interval (s)
    pub targets: Vec<MarkerTarget>,
    pub noise: TrackerNoise,
    pub timing: FrameTiming,
}

impl Scenario {
    /// Build the named scenario. Uses `seed` for repeatability.
    pub fn build(kind: ScenarioKind, seed: u64) -> Self {
        match kind {
            ScenarioKind::Steady => Self::steady(seed),
            ScenarioKind::Handheld => Self::handheld(seed),
            ScenarioKind::Glitchy => Self::glitchy(seed),
            ScenarioKind::Occluded => Self::occluded(seed),
            ScenarioKind::MultiMarker => Self::multi_marker(seed),
            ScenarioKind::LowLight => Self::low_light(seed),
        }
    }

    fn base(name: &str, seed: u64, targets: Vec<MarkerTarget>) -> Self {
        Scenario {
            name: name.into(),
            seed,
            duration: 10.0,
            frame_dt: 1.0 / 60.0,
            targets,
            noise: TrackerNoise::default(),
            timing: FrameTiming::default(),
        }
    }

    fn steady(seed: u64) -> Self {
        Self::base(
            "steady",
            seed,
            vec![MarkerTarget::new(TargetId(0), marker_pose(0.0), MotionSpec::Static)],
        )
    }

    fn handheld(seed: u64) -> Self {
        let motion = MotionSpec::Sway {
            amplitude: Vec3::new(0.08, 0.04, 0.02),
            angular_amplitude: Vec3::new(0.05, 0.1, 0.02),
            frequency: 0.4,
        };
        let mut s = Self::base(
            "handheld",
            seed,
            vec![MarkerTarget::new(TargetId(0), marker_pose(0.0), motion)],
        );
        s.noise.position_jitter = 0.01;
        s
    }

    fn glitchy(seed: u64) -> Self {
        let mut s = Self::base(
            "glitchy",
            seed,
            vec![MarkerTarget::new(TargetId(0), marker_pose(0.0), MotionSpec::Static)],
        );
        s.noise.glitch_probability = 0.05;
        s.noise.glitch_magnitude = 1.5;
        s
    }

    fn occluded(seed: u64) -> Self {
        let motion = MotionSpec::Segmented {
            segments: vec![
                (0.0, Box::new(MotionSpec::Static)),
                (
                    5.0,
                    Box::new(MotionSpec::ConstantVelocity {
                        linear: Vec3::new(0.02, 0.0, 0.0),
                        angular: Vec3::zeros(),
                    }),
                ),
            ],
        };
        let mut marker = MarkerTarget::new(TargetId(0), marker_pose(0.0), motion);
        // one short gap under the debounce window, one long occlusion
        marker.occlusions = vec![(3.0, 3.3), (6.0, 7.5)];
        let mut s = Self::base("occluded", seed, vec![marker]);
        s.noise.flicker_probability = 0.01;
        s
    }

    fn multi_marker(seed: u64) -> Self {
        let targets = (0..3u32)
            .map(|i| {
                let mut m = MarkerTarget::new(
                    TargetId(i),
                    marker_pose(i as f64 * 0.3 - 0.3),
                    MotionSpec::Sway {
                        amplitude: Vec3::new(0.03, 0.03, 0.0),
                        angular_amplitude: Vec3::new(0.0, 0.05, 0.0),
                        frequency: 0.3 + 0.1 * i as f64,
                    },
                );
                m.appear_at = Some(i as f64 * 3.0);
                m
            })
            .collect();
        let mut s = Self::base("multi_marker", seed, targets);
        s.duration = 15.0;
        s
    }

    fn low_light(seed: u64) -> Self {
        let motion = MotionSpec::Sway {
            amplitude: Vec3::new(0.05, 0.02, 0.0),
            angular_amplitude: Vec3::new(0.02, 0.05, 0.0),
            frequency: 0.25,
        };
        let mut s = Self::base(
            "low_light",
            seed,
            vec![MarkerTarget::new(TargetId(0), marker_pose(0.0), motion)],
        );
        s.frame_dt = 1.0 / 30.0;
        s.noise.position_jitter = 0.03;
        s.noise.rotation_jitter = 0.04;
        s.noise.glitch_probability = 0.02;
        s.timing = FrameTiming {
            stall_probability: 0.05,
            stall_duration: 0.08,
        };
        s
    }
}

/// Marker one unit in front of the camera, offset along x.
fn marker_pose(x: f64) -> Pose {
    Pose::from_position(Vec3::new(x, 0.0, -1.0))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
