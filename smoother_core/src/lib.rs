//! `smoother_core` — Pose smoothing and short-horizon prediction for
//! marker-based tracking.
//!
//! # Module layout
//! - [`types`]     — Pose, target ids, tracker events
//! - [`config`]    — Smoother configuration, sensitivity presets, device profiles
//! - [`buffer`]    — Bounded sample history and moving average
//! - [`velocity`]  — Exponentially smoothed velocity and look-ahead
//! - [`gating`]    — Abrupt-motion rejection
//! - [`smoother`]  — Per-target filter (`PoseSmoother`)
//! - [`lifecycle`] — Loss debouncing
//! - [`bank`]      — Multi-target orchestrator
//! - [`metrics`]   — RMSE, jitter, frame accounting

pub mod bank;
pub mod buffer;
pub mod config;
pub mod gating;
pub mod lifecycle;
pub mod metrics;
pub mod smoother;
pub mod types;
pub mod velocity;

pub use bank::{BankConfig, FrameInput, FrameOutput, SmootherBank};
pub use config::{ConfigError, DeviceClass, Sensitivity, SmootherConfig};
pub use gating::RejectReason;
pub use smoother::{FilterState, IngestOutcome, PoseSmoother};
pub use types::{Pose, PoseSample, TargetId, TrackerEvent, TrackerEventKind, Vec3};
