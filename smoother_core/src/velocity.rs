//! Exponentially smoothed velocity of position and Euler rotation.
//!
//! The instantaneous derivative `(current - reference) / dt` is low-passed
//! with a fixed blend weight so that short jitter does not spike the
//! estimate:
//!
//! `v ← v + w · (v_inst − v)`

use crate::types::{Pose, Vec3};
use serde::{Deserialize, Serialize};

/// Smoothed linear velocity (units/s) and per-axis angular velocity (rad/s).
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct VelocityEstimate {
    pub position: Vec3,
    pub rotation: Vec3,
}

impl VelocityEstimate {
    pub fn zero() -> Self {
        Self::default()
    }

    /// Blend the derivative between `reference` and `current` over `dt`
    /// seconds. Returns `false` and leaves the estimate untouched when `dt`
    /// is not a positive finite number.
    pub fn blend(&mut self, reference: &Pose, current: &Pose, dt: f64, weight: f64) -> bool {
        if !(dt.is_finite() && dt > 0.0) {
            return false;
        }
        let pos_inst = (current.position - reference.position) / dt;
        let rot_inst = (current.rotation - reference.rotation) / dt;
        self.position += (pos_inst - self.position) * weight;
        self.rotation += (rot_inst - self.rotation) * weight;
        true
    }

    /// Magnitude of the linear velocity.
    pub fn speed(&self) -> f64 {
        self.position.norm()
    }

    /// `pose` advanced by `velocity * strength`. Scale is carried through.
    pub fn extrapolate(&self, pose: &Pose, strength: f64) -> Pose {
        Pose {
            position: pose.position + self.position * strength,
            rotation: pose.rotation + self.rotation * strength,
            scale: pose.scale,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn blend_moves_towards_derivative() {
        let mut v = VelocityEstimate::zero();
        let a = Pose::identity();
        let b = Pose::new(Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 0.5, 0.0), Vec3::repeat(1.0));
        assert!(v.blend(&a, &b, 0.5, 0.3));
        // instantaneous: pos (2,0,0), rot (0,1,0); blended by 0.3
        assert_abs_diff_eq!(v.position, Vec3::new(0.6, 0.0, 0.0), epsilon = 1e-12);
        assert_abs_diff_eq!(v.rotation, Vec3::new(0.0, 0.3, 0.0), epsilon = 1e-12);

        assert!(v.blend(&a, &b, 0.5, 0.3));
        assert_abs_diff_eq!(v.position.x, 0.6 + (2.0 - 0.6) * 0.3, epsilon = 1e-12);
    }

    #[test]
    fn non_positive_dt_is_skipped() {
        let mut v = VelocityEstimate {
            position: Vec3::new(1.0, 2.0, 3.0),
            rotation: Vec3::zeros(),
        };
        let before = v;
        let b = Pose::from_position(Vec3::new(5.0, 0.0, 0.0));
        assert!(!v.blend(&Pose::identity(), &b, 0.0, 0.3));
        assert!(!v.blend(&Pose::identity(), &b, -0.01, 0.3));
        assert!(!v.blend(&Pose::identity(), &b, f64::NAN, 0.3));
        assert_eq!(v, before);
    }

    #[test]
    fn single_spike_is_damped() {
        let mut v = VelocityEstimate::zero();
        let rest = Pose::identity();
        let spike = Pose::from_position(Vec3::new(0.1, 0.0, 0.0));
        v.blend(&rest, &spike, 1.0 / 60.0, 0.3);
        // raw derivative would be 6 units/s
        assert!(v.speed() < 6.0 * 0.31);
    }

    #[test]
    fn extrapolate_keeps_scale() {
        let v = VelocityEstimate {
            position: Vec3::new(10.0, -5.0, 0.0),
            rotation: Vec3::new(1.0, 0.0, 0.0),
        };
        let pose = Pose::new(Vec3::new(1.0, 2.0, 3.0), Vec3::zeros(), Vec3::repeat(2.0));
        let p = v.extrapolate(&pose, 0.1);
        assert_abs_diff_eq!(p.position, Vec3::new(2.0, 1.5, 3.0), epsilon = 1e-12);
        assert_abs_diff_eq!(p.rotation, Vec3::new(0.1, 0.0, 0.0), epsilon = 1e-12);
        assert_eq!(p.scale, pose.scale);
    }
}
