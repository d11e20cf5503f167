//! Abrupt-motion gating.
//!
//! A raw sample is compared against the reference pose (the last emitted
//! smoothed pose). If any per-frame change exceeds its configured maximum the
//! sample is treated as a tracker glitch rather than real motion.

use crate::{config::SmootherConfig, types::Pose};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a raw sample was not accepted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RejectReason {
    /// Position jumped further than `max_position_delta`
    Position,
    /// Summed Euler change exceeded `max_rotation_delta`
    Rotation,
    /// Scale (x axis) changed more than `max_scale_delta`
    Scale,
    /// Sample contained NaN or infinity
    NonFinite,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RejectReason::Position => "position",
            RejectReason::Rotation => "rotation",
            RejectReason::Scale => "scale",
            RejectReason::NonFinite => "non-finite",
        };
        f.write_str(s)
    }
}

/// Per-frame change between a reference pose and a raw sample.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MotionDeltas {
    /// Euclidean position distance
    pub position: f64,
    /// Sum of absolute per-axis Euler differences
    pub rotation: f64,
    /// Absolute x-axis scale difference
    pub scale: f64,
}

impl MotionDeltas {
    pub fn between(reference: &Pose, raw: &Pose) -> Self {
        Self {
            position: reference.position_distance(raw),
            rotation: reference.rotation_distance(raw),
            scale: (raw.scale.x - reference.scale.x).abs(),
        }
    }
}

/// Threshold check against the three per-frame limits.
#[derive(Clone, Copy, Debug)]
pub struct MotionGate {
    pub max_position: f64,
    pub max_rotation: f64,
    pub max_scale: f64,
}

impl MotionGate {
    pub fn from_config(cfg: &SmootherConfig) -> Self {
        Self {
            max_position: cfg.max_position_delta,
            max_rotation: cfg.max_rotation_delta,
            max_scale: cfg.max_scale_delta,
        }
    }

    /// `Some(reason)` for the first limit exceeded, `None` if the sample passes.
    pub fn classify(&self, deltas: &MotionDeltas) -> Option<RejectReason> {
        if deltas.position > self.max_position {
            Some(RejectReason::Position)
        } else if deltas.rotation > self.max_rotation {
            Some(RejectReason::Rotation)
        } else if deltas.scale > self.max_scale {
            Some(RejectReason::Scale)
        } else {
            None
        }
    }

    /// Classify `raw` against `reference`.
    pub fn check(&self, reference: &Pose, raw: &Pose) -> Option<RejectReason> {
        if !raw.is_finite() {
            return Some(RejectReason::NonFinite);
        }
        self.classify(&MotionDeltas::between(reference, raw))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Vec3;

    fn gate() -> MotionGate {
        MotionGate::from_config(&SmootherConfig::default())
    }

    #[test]
    fn small_motion_passes() {
        let r = Pose::identity();
        let raw = Pose::new(Vec3::new(0.1, 0.1, 0.0), Vec3::new(0.1, 0.1, 0.1), Vec3::repeat(1.1));
        assert_eq!(gate().check(&r, &raw), None);
    }

    #[test]
    fn position_jump_rejected() {
        let raw = Pose::from_position(Vec3::new(2.0, 0.0, 0.0));
        assert_eq!(gate().check(&Pose::identity(), &raw), Some(RejectReason::Position));
    }

    #[test]
    fn rotation_uses_axis_sum() {
        // each axis under the limit, the sum above it
        let raw = Pose::new(Vec3::zeros(), Vec3::new(0.3, 0.3, 0.3), Vec3::repeat(1.0));
        assert_eq!(gate().check(&Pose::identity(), &raw), Some(RejectReason::Rotation));
    }

    #[test]
    fn scale_uses_x_axis_only() {
        let r = Pose::identity();
        let y_only = Pose::new(Vec3::zeros(), Vec3::zeros(), Vec3::new(1.0, 5.0, 5.0));
        assert_eq!(gate().check(&r, &y_only), None);
        let x = Pose::new(Vec3::zeros(), Vec3::zeros(), Vec3::new(1.5, 1.0, 1.0));
        assert_eq!(gate().check(&r, &x), Some(RejectReason::Scale));
    }

    #[test]
    fn threshold_is_exclusive() {
        let raw = Pose::from_position(Vec3::new(0.5, 0.0, 0.0));
        assert_eq!(gate().check(&Pose::identity(), &raw), None);
    }

    #[test]
    fn nan_rejected() {
        let raw = Pose::from_position(Vec3::new(f64::NAN, 0.0, 0.0));
        assert_eq!(gate().check(&Pose::identity(), &raw), Some(RejectReason::NonFinite));
    }
}
