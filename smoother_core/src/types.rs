//! Fundamental types used across the entire workspace.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Scalar type: f64 throughout, positions in scene units, angles in radians.
// ---------------------------------------------------------------------------

/// 3-component vector used for position, Euler rotation and scale.
pub type Vec3 = Vector3<f64>;

// ---------------------------------------------------------------------------
// Identifier types
// ---------------------------------------------------------------------------

/// Identifier of a physical marker tracked by the external vision system.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct TargetId(pub u32);

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "M{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Pose
// ---------------------------------------------------------------------------

/// A 6-DOF pose plus scale.
///
/// Rotation is stored as XYZ Euler angles in radians and is interpolated
/// per axis, never through quaternions.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vec3,
    /// Euler angles (x, y, z), radians
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Default for Pose {
    fn default() -> Self {
        Self::identity()
    }
}

impl Pose {
    pub fn new(position: Vec3, rotation: Vec3, scale: Vec3) -> Self {
        Self {
            position,
            rotation,
            scale,
        }
    }

    /// Origin, no rotation, unit scale.
    pub fn identity() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Vec3::zeros(),
            scale: Vec3::repeat(1.0),
        }
    }

    /// Pose at `position` with no rotation and unit scale.
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::identity()
        }
    }

    /// Linear interpolation towards `target` by weight `t`.
    ///
    /// Position and scale are vector lerps; rotation is a per-axis scalar
    /// lerp of the Euler angles.
    pub fn lerp(&self, target: &Pose, t: f64) -> Pose {
        Pose {
            position: self.position + (target.position - self.position) * t,
            rotation: self.rotation + (target.rotation - self.rotation) * t,
            scale: self.scale + (target.scale - self.scale) * t,
        }
    }

    /// True if every component is finite.
    pub fn is_finite(&self) -> bool {
        self.position
            .iter()
            .chain(self.rotation.iter())
            .chain(self.scale.iter())
            .all(|v| v.is_finite())
    }

    /// Euclidean distance between the two positions.
    pub fn position_distance(&self, other: &Pose) -> f64 {
        (self.position - other.position).norm()
    }

    /// Sum of absolute per-axis Euler differences.
    pub fn rotation_distance(&self, other: &Pose) -> f64 {
        (self.rotation - other.rotation).abs().sum()
    }
}

// ---------------------------------------------------------------------------
// Tracker events
// ---------------------------------------------------------------------------

/// Detection state change reported by the external tracker.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrackerEventKind {
    Found,
    Lost,
}

/// A timestamped lifecycle event for one target.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrackerEvent {
    pub target: TargetId,
    /// Monotonic time in seconds
    pub time: f64,
    pub kind: TrackerEventKind,
}

/// A raw per-frame pose sample for one target.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PoseSample {
    pub target: TargetId,
    /// Monotonic time in seconds
    pub time: f64,
    pub pose: Pose,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn identity_has_unit_scale() {
        let p = Pose::identity();
        assert_eq!(p.position, Vec3::zeros());
        assert_eq!(p.rotation, Vec3::zeros());
        assert_eq!(p.scale, Vec3::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn lerp_is_per_axis() {
        let a = Pose::new(Vec3::zeros(), Vec3::new(0.0, 1.0, -1.0), Vec3::repeat(1.0));
        let b = Pose::new(
            Vec3::new(2.0, 4.0, 6.0),
            Vec3::new(1.0, 3.0, 1.0),
            Vec3::repeat(3.0),
        );
        let m = a.lerp(&b, 0.5);
        assert_abs_diff_eq!(m.position, Vec3::new(1.0, 2.0, 3.0), epsilon = 1e-12);
        assert_abs_diff_eq!(m.rotation, Vec3::new(0.5, 2.0, 0.0), epsilon = 1e-12);
        assert_abs_diff_eq!(m.scale, Vec3::repeat(2.0), epsilon = 1e-12);
    }

    #[test]
    fn lerp_endpoints() {
        let a = Pose::from_position(Vec3::new(1.0, 2.0, 3.0));
        let b = Pose::from_position(Vec3::new(4.0, 5.0, 6.0));
        assert_eq!(a.lerp(&b, 0.0), a);
        assert_abs_diff_eq!(a.lerp(&b, 1.0).position, b.position, epsilon = 1e-12);
    }

    #[test]
    fn rotation_distance_sums_axes() {
        let a = Pose::identity();
        let b = Pose::new(Vec3::zeros(), Vec3::new(0.1, -0.2, 0.3), Vec3::repeat(1.0));
        assert_abs_diff_eq!(a.rotation_distance(&b), 0.6, epsilon = 1e-12);
    }

    #[test]
    fn non_finite_detected() {
        let mut p = Pose::identity();
        assert!(p.is_finite());
        p.rotation.y = f64::NAN;
        assert!(!p.is_finite());
        p.rotation.y = 0.0;
        p.scale.z = f64::INFINITY;
        assert!(!p.is_finite());
    }

    #[test]
    fn target_id_display() {
        assert_eq!(TargetId(2).to_string(), "M2");
    }
}
