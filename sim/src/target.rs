//! Marker trajectory models and ground-truth propagation.
//!
//! Each marker has a true pose and a `MotionSpec` describing how it moves
//! relative to the camera. The simulator steps each marker forward in time.

use serde::{Deserialize, Serialize};
use smoother_core::types::{Pose, TargetId, Vec3};

/// Describes marker motion.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum MotionSpec {
    /// Marker does not move.
    Static,
    /// Constant linear (units/s) and angular (rad/s per axis) velocity.
    ConstantVelocity { linear: Vec3, angular: Vec3 },
    /// Sinusoidal sway around the start pose, as from a hand-held camera.
    /// `amplitude` per position axis, `angular_amplitude` per Euler axis.
    Sway {
        amplitude: Vec3,
        angular_amplitude: Vec3,
        frequency: f64,
    },
    /// Switch motion model at given sim times.
    /// `segments` is sorted by time ascending: [(t_start, MotionSpec), ...].
    /// The active model is the last one whose t_start <= current_t.
    Segmented {
        segments: Vec<(f64, Box<MotionSpec>)>,
    },
}

/// A simulated marker with ground-truth pose.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MarkerTarget {
    pub id: TargetId,
    /// True pose at the current sim time
    pub pose: Pose,
    /// Pose at t = 0, anchor of the sway model
    pub origin: Pose,
    pub motion: MotionSpec,
    /// Marker enters the camera view at this time
    pub appear_at: Option<f64>,
    /// Marker leaves the camera view at this time
    pub disappear_at: Option<f64>,
    /// Intervals [start, end) during which the marker is occluded
    pub occlusions: Vec<(f64, f64)>,
}

impl MarkerTarget {
    pub fn new(id: TargetId, pose: Pose, motion: MotionSpec) -> Self {
        Self {
            id,
            pose,
            origin: pose,
            motion,
            appear_at: None,
            disappear_at: None,
            occlusions: Vec::new(),
        }
    }

    /// Propagate the true pose to time `t + dt`.
    pub fn step(&mut self, t: f64, dt: f64) {
        let motion = self.motion.clone();
        self.apply(&motion, t, dt);
    }

    fn apply(&mut self, motion: &MotionSpec, t: f64, dt: f64) {
        match motion {
            MotionSpec::Static => {}
            MotionSpec::ConstantVelocity { linear, angular } => {
                self.pose.position += linear * dt;
                self.pose.rotation += angular * dt;
            }
            MotionSpec::Sway {
                amplitude,
                angular_amplitude,
                frequency,
            } => {
                let phase = (std::f64::consts::TAU * frequency * (t + dt)).sin();
                self.pose.position = self.origin.position + amplitude * phase;
                self.pose.rotation = self.origin.rotation + angular_amplitude * phase;
            }
            MotionSpec::Segmented { segments } => {
                let active = segments.iter().filter(|(t_start, _)| *t_start <= t).last();
                if let Some((_, model)) = active {
                    self.apply(model, t, dt);
                }
            }
        }
    }

    /// True if the camera can see the marker at time `t`.
    pub fn is_visible(&self, t: f64) -> bool {
        if let Some(appear) = self.appear_at {
            if t < appear {
                return false;
            }
        }
        if let Some(disappear) = self.disappear_at {
            if t >= disappear {
                return false;
            }
        }
        !self.occlusions.iter().any(|&(s, e)| t >= s && t < e)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
