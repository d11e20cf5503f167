//! Per-target pose smoother: outlier gating, moving average, adaptive gain
//! and velocity look-ahead.
//!
//! # Processing steps per frame
//! 1. Measure `dt` since the previous sample; a stall (`dt > stall_threshold`)
//!    raises the baseline gain, capped at `max_smoothing_factor`
//! 2. Blend the derivative against the reference pose into the velocity
//! 3. Gate abrupt motion; a rejected sample never reaches the buffer
//! 4. Push the accepted sample into the moving-average buffer
//! 5. Hold output until more than `stabilization_frames` frames have passed
//! 6. Derive the adaptive gain from speed
//! 7. Predict `raw + velocity * prediction_strength`
//! 8. Target = buffer average, else the prediction
//! 9. Lerp the reference pose towards the target by the adaptive gain

use crate::{
    buffer::SampleBuffer,
    config::{DeviceClass, Sensitivity, SmootherConfig},
    gating::{MotionGate, RejectReason},
    types::{Pose, TargetId},
    velocity::VelocityEstimate,
};
use serde::{Deserialize, Serialize};

/// Mutable filter state for one target.
#[derive(Clone, Debug)]
pub struct FilterState {
    /// Most recently emitted smoothed pose; `None` until the first emission
    /// when the smoother was built without an initial pose
    pub last_pose: Option<Pose>,
    /// Smoothed velocity of position and rotation
    pub velocity: VelocityEstimate,
    /// Recent accepted raw poses
    pub sample_buffer: SampleBuffer,
    /// Baseline gain, raised on stalls
    pub smoothing_factor: f64,
    /// Gain used for the latest emission, always within the configured clamp
    pub adaptive_smoothing_factor: f64,
    pub is_tracking: bool,
    /// Frames ingested since the last acquisition
    pub frame_count: u32,
    /// Time of the previous sample (seconds, monotonic clock)
    pub last_sample_timestamp: Option<f64>,
}

impl FilterState {
    fn new(config: &SmootherConfig, initial: Option<Pose>) -> Self {
        Self {
            last_pose: initial,
            velocity: VelocityEstimate::zero(),
            sample_buffer: SampleBuffer::new(config.buffer_size),
            smoothing_factor: config.smoothing_factor,
            adaptive_smoothing_factor: config
                .smoothing_factor
                .clamp(config.min_smoothing_factor, config.max_smoothing_factor),
            is_tracking: false,
            frame_count: 0,
            last_sample_timestamp: None,
        }
    }
}

/// What one call to [`PoseSmoother::ingest`] did.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum IngestOutcome {
    /// Target not tracked; nothing changed
    Inactive,
    /// Sample buffered inside the stabilization window; no output
    Stabilizing,
    /// Sample dropped; the emitted pose is unchanged
    Rejected(RejectReason),
    /// New smoothed pose
    Updated(Pose),
}

impl IngestOutcome {
    /// The new pose, if one was emitted this frame.
    pub fn pose(&self) -> Option<Pose> {
        match self {
            IngestOutcome::Updated(p) => Some(*p),
            _ => None,
        }
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, IngestOutcome::Rejected(_))
    }
}

/// Smoothing and prediction filter for one tracked target.
#[derive(Clone, Debug)]
pub struct PoseSmoother {
    pub id: TargetId,
    config: SmootherConfig,
    gate: MotionGate,
    state: FilterState,
}

impl PoseSmoother {
    /// Create a smoother with no reference pose. Outlier gating and velocity
    /// estimation start once the first smoothed pose has been emitted.
    pub fn new(config: SmootherConfig) -> Self {
        Self::build(TargetId::default(), config, None)
    }

    /// Create a smoother whose reference starts at `initial`.
    pub fn with_initial_pose(config: SmootherConfig, initial: Pose) -> Self {
        Self::build(TargetId::default(), config, Some(initial))
    }

    /// Create a smoother labelled with a target id (used in log output).
    pub fn for_target(id: TargetId, config: SmootherConfig) -> Self {
        Self::build(id, config, None)
    }

    fn build(id: TargetId, config: SmootherConfig, initial: Option<Pose>) -> Self {
        let config = config.sanitized();
        Self {
            id,
            gate: MotionGate::from_config(&config),
            state: FilterState::new(&config, initial),
            config,
        }
    }

    pub fn config(&self) -> &SmootherConfig {
        &self.config
    }

    pub fn state(&self) -> &FilterState {
        &self.state
    }

    pub fn last_pose(&self) -> Option<Pose> {
        self.state.last_pose
    }

    pub fn is_tracking(&self) -> bool {
        self.state.is_tracking
    }

    /// Moving average of the buffered samples.
    pub fn buffer_average(&self) -> Option<Pose> {
        self.state.sample_buffer.average()
    }

    /// `raw` advanced by the current velocity times `prediction_strength`.
    pub fn predict(&self, raw: &Pose) -> Pose {
        self.state
            .velocity
            .extrapolate(raw, self.config.prediction_strength)
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Target (re)acquired. The reference pose and velocity are kept so that
    /// smoothing continues from the last stable pose.
    pub fn on_target_found(&mut self) {
        self.state.is_tracking = true;
        self.state.frame_count = 0;
        self.state.sample_buffer.clear();
        tracing::info!(target_id = %self.id, "target found, smoothing restarted");
    }

    /// Target lost; further frames are ignored until the next found.
    pub fn on_target_lost(&mut self) {
        self.state.is_tracking = false;
        tracing::info!(target_id = %self.id, "target lost, smoothing frozen");
    }

    // -----------------------------------------------------------------------
    // Reconfiguration
    // -----------------------------------------------------------------------

    /// Replace the whole configuration. The baseline gain restarts from the
    /// new `smoothing_factor`; the buffer keeps its newest samples.
    pub fn set_config(&mut self, config: SmootherConfig) {
        let config = config.sanitized();
        self.gate = MotionGate::from_config(&config);
        self.state.sample_buffer.set_capacity(config.buffer_size);
        self.state.smoothing_factor = config.smoothing_factor;
        self.state.adaptive_smoothing_factor = self
            .state
            .adaptive_smoothing_factor
            .clamp(config.min_smoothing_factor, config.max_smoothing_factor);
        self.config = config;
    }

    /// Apply a sensitivity preset on top of the current configuration.
    pub fn set_sensitivity(&mut self, level: Sensitivity) {
        let mut cfg = self.config.clone();
        level.apply(&mut cfg);
        tracing::debug!(target_id = %self.id, level = level.as_str(), "sensitivity changed");
        self.set_config(cfg);
    }

    /// Apply a device profile on top of the current configuration.
    pub fn set_device(&mut self, device: DeviceClass) {
        let mut cfg = self.config.clone();
        device.apply(&mut cfg);
        self.set_config(cfg);
    }

    // -----------------------------------------------------------------------
    // Per-frame update
    // -----------------------------------------------------------------------

    /// Feed one raw pose sampled at `now` (seconds, monotonic clock).
    pub fn ingest(&mut self, raw: Pose, now: f64) -> IngestOutcome {
        if !self.state.is_tracking {
            return IngestOutcome::Inactive;
        }
        self.state.frame_count = self.state.frame_count.saturating_add(1);

        // Step 1: timing and stall compensation
        let dt = self.advance_clock(now);
        if let Some(dt) = dt {
            if dt > self.config.stall_threshold {
                let bumped = (self.state.smoothing_factor * self.config.stall_gain)
                    .min(self.config.max_smoothing_factor);
                tracing::trace!(target_id = %self.id, dt, gain = bumped, "frame stall");
                self.state.smoothing_factor = bumped;
            }
        }

        if !raw.is_finite() {
            tracing::debug!(target_id = %self.id, "non-finite sample dropped");
            return IngestOutcome::Rejected(RejectReason::NonFinite);
        }

        // Step 2: velocity against the reference pose
        if let (Some(reference), Some(dt)) = (self.state.last_pose, dt) {
            self.state
                .velocity
                .blend(&reference, &raw, dt, self.config.velocity_blend);
        }

        // Step 3: abrupt-motion gating
        if let Some(reference) = self.state.last_pose {
            if let Some(reason) = self.gate.check(&reference, &raw) {
                tracing::debug!(
                    target_id = %self.id,
                    %reason,
                    frame = self.state.frame_count,
                    "abrupt motion, sample dropped"
                );
                if self.config.reinforce_on_abrupt {
                    if let Some(avg) = self.state.sample_buffer.average() {
                        self.state.sample_buffer.push(avg);
                    }
                }
                return IngestOutcome::Rejected(reason);
            }
        }

        // Step 4: buffer
        self.state.sample_buffer.push(raw);

        // Step 5: stabilization window
        if self.state.frame_count <= self.config.stabilization_frames {
            return IngestOutcome::Stabilizing;
        }

        // Steps 6-9
        let alpha = self.adaptive_factor();
        self.state.adaptive_smoothing_factor = alpha;
        let target = self.smoothing_target(&raw);
        let next = match self.state.last_pose {
            Some(current) => current.lerp(&target, alpha),
            None => {
                tracing::debug!(target_id = %self.id, "first emission, reference seeded");
                target
            }
        };
        self.state.last_pose = Some(next);
        IngestOutcome::Updated(next)
    }

    /// Returns `dt` since the previous sample, or `None` for the first sample
    /// or a non-finite timestamp.
    fn advance_clock(&mut self, now: f64) -> Option<f64> {
        if !now.is_finite() {
            return None;
        }
        let dt = self.state.last_sample_timestamp.map(|prev| now - prev);
        self.state.last_sample_timestamp = Some(now);
        dt
    }

    /// Fast motion lowers the baseline (heavier smoothing), slow motion
    /// doubles it (lighter smoothing). Always within the configured clamp.
    fn adaptive_factor(&self) -> f64 {
        let cfg = &self.config;
        let speed = self.state.velocity.speed();
        let base = self.state.smoothing_factor;
        let factor = if speed > cfg.velocity_threshold {
            let slowdown = (speed / cfg.velocity_threshold).min(cfg.max_slowdown);
            base / slowdown
        } else {
            base * 2.0
        };
        factor.clamp(cfg.min_smoothing_factor, cfg.max_smoothing_factor)
    }

    fn smoothing_target(&self, raw: &Pose) -> Pose {
        self.state
            .sample_buffer
            .average()
            .unwrap_or_else(|| self.predict(raw))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
