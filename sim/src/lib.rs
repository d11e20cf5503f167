//! `sim` — Synthetic marker tracker: marker trajectories, noisy tracker
//! output, scenario runs and replay.

pub mod replay;
pub mod runner;
pub mod scenarios;
pub mod target;
pub mod tracker_sim;

pub use replay::{load_replay, save_replay, ReplayLog};
pub use runner::{evaluate, generate_frames, run_scenario, RunReport, TargetReport};
pub use scenarios::{Scenario, ScenarioKind};
pub use target::{MarkerTarget, MotionSpec};
pub use tracker_sim::{TrackerFrame, TrackerNoise, TrackerSimulator};
