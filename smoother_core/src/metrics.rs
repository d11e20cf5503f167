//! Smoothing metrics: RMSE against ground truth, jitter, frame accounting.

use crate::{
    gating::RejectReason,
    smoother::IngestOutcome,
    types::{Pose, Vec3},
};
use serde::{Deserialize, Serialize};

/// Accumulated metric statistics for one or more targets.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SmoothingMetrics {
    /// Number of outcomes accumulated
    pub n_frames: u64,
    /// Frames that produced a pose
    pub n_emitted: u64,
    /// Frames inside the stabilization window
    pub n_stabilizing: u64,
    /// Frames ignored because the target was not tracked
    pub n_inactive: u64,
    pub rejected_position: u64,
    pub rejected_rotation: u64,
    pub rejected_scale: u64,
    pub rejected_non_finite: u64,
    /// Emitted frames compared against ground truth
    pub n_scored: u64,
    pub sum_sq_pos_err: f64,
    pub sum_sq_rot_err: f64,
    /// Sum of frame-to-frame position steps of the raw input
    pub raw_path: f64,
    /// Sum of frame-to-frame position steps of the smoothed output
    pub smooth_path: f64,
    /// Number of steps in each path sum
    pub n_steps: u64,
}

impl SmoothingMetrics {
    pub fn n_rejected(&self) -> u64 {
        self.rejected_position + self.rejected_rotation + self.rejected_scale + self.rejected_non_finite
    }

    /// Root-mean-square position error of emitted poses.
    pub fn rmse_position(&self) -> f64 {
        if self.n_scored == 0 {
            return 0.0;
        }
        (self.sum_sq_pos_err / self.n_scored as f64).sqrt()
    }

    /// Root-mean-square Euler error (per-axis vector norm) of emitted poses.
    pub fn rmse_rotation(&self) -> f64 {
        if self.n_scored == 0 {
            return 0.0;
        }
        (self.sum_sq_rot_err / self.n_scored as f64).sqrt()
    }

    /// Mean raw frame-to-frame displacement.
    pub fn raw_jitter(&self) -> f64 {
        if self.n_steps == 0 {
            return 0.0;
        }
        self.raw_path / self.n_steps as f64
    }

    /// Mean smoothed frame-to-frame displacement.
    pub fn smooth_jitter(&self) -> f64 {
        if self.n_steps == 0 {
            return 0.0;
        }
        self.smooth_path / self.n_steps as f64
    }

    /// Raw jitter divided by smoothed jitter; 1.0 when undefined.
    pub fn jitter_reduction(&self) -> f64 {
        let smooth = self.smooth_jitter();
        if smooth <= f64::EPSILON {
            return 1.0;
        }
        self.raw_jitter() / smooth
    }

    /// Count one outcome.
    pub fn record_outcome(&mut self, outcome: &IngestOutcome) {
        self.n_frames += 1;
        match outcome {
            IngestOutcome::Inactive => self.n_inactive += 1,
            IngestOutcome::Stabilizing => self.n_stabilizing += 1,
            IngestOutcome::Rejected(reason) => match reason {
                RejectReason::Position => self.rejected_position += 1,
                RejectReason::Rotation => self.rejected_rotation += 1,
                RejectReason::Scale => self.rejected_scale += 1,
                RejectReason::NonFinite => self.rejected_non_finite += 1,
            },
            IngestOutcome::Updated(_) => self.n_emitted += 1,
        }
    }

    /// Score an emitted pose against ground truth.
    pub fn record_error(&mut self, emitted: &Pose, truth: &Pose) {
        let dp: Vec3 = emitted.position - truth.position;
        let dr: Vec3 = emitted.rotation - truth.rotation;
        self.sum_sq_pos_err += dp.norm_squared();
        self.sum_sq_rot_err += dr.norm_squared();
        self.n_scored += 1;
    }

    /// Record one step of both paths: raw input from `raw_prev` to `raw`,
    /// output from `out_prev` to `out`.
    pub fn record_step(&mut self, raw_prev: &Pose, raw: &Pose, out_prev: &Pose, out: &Pose) {
        self.raw_path += raw_prev.position_distance(raw);
        self.smooth_path += out_prev.position_distance(out);
        self.n_steps += 1;
    }

    /// Fold another accumulator into this one.
    pub fn merge(&mut self, other: &SmoothingMetrics) {
        self.n_frames += other.n_frames;
        self.n_emitted += other.n_emitted;
        self.n_stabilizing += other.n_stabilizing;
        self.n_inactive += other.n_inactive;
        self.rejected_position += other.rejected_position;
        self.rejected_rotation += other.rejected_rotation;
        self.rejected_scale += other.rejected_scale;
        self.rejected_non_finite += other.rejected_non_finite;
        self.n_scored += other.n_scored;
        self.sum_sq_pos_err += other.sum_sq_pos_err;
        self.sum_sq_rot_err += other.sum_sq_rot_err;
        self.raw_path += other.raw_path;
        self.smooth_path += other.smooth_path;
        self.n_steps += other.n_steps;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn at(x: f64) -> Pose {
        Pose::from_position(Vec3::new(x, 0.0, 0.0))
    }

    #[test]
    fn empty_metrics_are_neutral() {
        let m = SmoothingMetrics::default();
        assert_eq!(m.rmse_position(), 0.0);
        assert_eq!(m.raw_jitter(), 0.0);
        assert_eq!(m.jitter_reduction(), 1.0);
    }

    #[test]
    fn outcome_counters() {
        let mut m = SmoothingMetrics::default();
        m.record_outcome(&IngestOutcome::Stabilizing);
        m.record_outcome(&IngestOutcome::Rejected(RejectReason::Position));
        m.record_outcome(&IngestOutcome::Rejected(RejectReason::Scale));
        m.record_outcome(&IngestOutcome::Updated(Pose::identity()));
        m.record_outcome(&IngestOutcome::Inactive);
        assert_eq!(m.n_frames, 5);
        assert_eq!(m.n_rejected(), 2);
        assert_eq!(m.n_emitted, 1);
        assert_eq!(m.n_stabilizing, 1);
        assert_eq!(m.n_inactive, 1);
    }

    #[test]
    fn rmse_position() {
        let mut m = SmoothingMetrics::default();
        m.record_error(&at(3.0), &at(0.0));
        m.record_error(&at(0.0), &Pose::from_position(Vec3::new(0.0, 4.0, 0.0)));
        // sqrt((9 + 16) / 2)
        assert_abs_diff_eq!(m.rmse_position(), (12.5f64).sqrt(), epsilon = 1e-12);
        assert_eq!(m.rmse_rotation(), 0.0);
    }

    #[test]
    fn jitter_reduction_ratio() {
        let mut m = SmoothingMetrics::default();
        m.record_step(&at(0.0), &at(0.4), &at(0.0), &at(0.1));
        m.record_step(&at(0.4), &at(0.0), &at(0.1), &at(0.2));
        assert_abs_diff_eq!(m.raw_jitter(), 0.4, epsilon = 1e-12);
        assert_abs_diff_eq!(m.smooth_jitter(), 0.1, epsilon = 1e-12);
        assert_abs_diff_eq!(m.jitter_reduction(), 4.0, epsilon = 1e-9);
    }

    #[test]
    fn merge_adds_counts() {
        let mut a = SmoothingMetrics::default();
        a.record_outcome(&IngestOutcome::Stabilizing);
        a.record_error(&at(1.0), &at(0.0));
        let mut b = SmoothingMetrics::default();
        b.record_outcome(&IngestOutcome::Updated(Pose::identity()));
        b.record_error(&at(3.0), &at(0.0));
        a.merge(&b);
        assert_eq!(a.n_frames, 2);
        assert_eq!(a.n_scored, 2);
        assert_abs_diff_eq!(a.rmse_position(), (5.0f64).sqrt(), epsilon = 1e-12);
    }
}
