//! Scenario runner: drives a [`SmootherBank`] with simulated tracker frames
//! and scores the output against ground truth.

use crate::{
    scenarios::Scenario,
    tracker_sim::{TrackerFrame, TrackerSimulator},
};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use smoother_core::{
    bank::{BankConfig, FrameInput, SmootherBank},
    metrics::SmoothingMetrics,
    types::{Pose, TargetId},
    IngestOutcome,
};
use std::collections::{BTreeMap, HashMap};
use std::time::Instant;

/// Metrics for one marker.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TargetReport {
    pub target: TargetId,
    pub metrics: SmoothingMetrics,
}

/// Summary of one run.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunReport {
    pub scenario: String,
    pub seed: u64,
    pub frames: usize,
    pub acquisitions: usize,
    pub confirmed_losses: usize,
    pub per_target: Vec<TargetReport>,
    pub total: SmoothingMetrics,
    /// Time spent inside the bank, summed over frames
    pub processing_us: u64,
    pub elapsed_s: f64,
}

/// Generate every tracker frame of `scenario`. Marker state is advanced in
/// place.
pub fn generate_frames(scenario: &mut Scenario) -> Vec<TrackerFrame> {
    let mut tracker = TrackerSimulator::new(scenario.noise.clone(), scenario.seed);
    let mut clock_rng = ChaCha8Rng::seed_from_u64(scenario.seed.wrapping_add(1));
    let mut frames = Vec::new();
    let mut t = 0.0f64;

    while t < scenario.duration {
        let mut dt = scenario.frame_dt;
        if clock_rng.gen::<f64>() < scenario.timing.stall_probability {
            dt += scenario.timing.stall_duration;
        }
        for target in &mut scenario.targets {
            target.step(t, dt);
        }
        t += dt;
        frames.push(tracker.generate_frame(&scenario.targets, t));
    }

    frames
}

/// Feed recorded frames through a fresh bank holding one smoother per marker.
pub fn evaluate(
    name: &str,
    seed: u64,
    targets: &[TargetId],
    frames: &[TrackerFrame],
    config: BankConfig,
) -> RunReport {
    let mut bank = SmootherBank::new(config.clone());
    for &id in targets {
        bank.insert(id, config.smoother.clone());
    }

    let start = Instant::now();
    let mut per_target: BTreeMap<TargetId, SmoothingMetrics> =
        targets.iter().map(|&id| (id, SmoothingMetrics::default())).collect();
    // (raw, smoothed) of the previous emission per target, for jitter
    let mut prev: HashMap<TargetId, (Pose, Pose)> = HashMap::new();
    let mut acquisitions = 0;
    let mut confirmed_losses = 0;
    let mut processing_us = 0u64;

    for frame in frames {
        let input = FrameInput {
            time: frame.time,
            events: frame.events.clone(),
            samples: frame.samples.clone(),
        };
        let out = bank.process_frame(&input);
        processing_us += out.total_time_us;

        acquisitions += out.acquired.len();
        confirmed_losses += out.confirmed_losses.len();
        for id in out.acquired.iter().chain(out.confirmed_losses.iter()) {
            prev.remove(id);
        }

        for ((id, outcome), sample) in out.outcomes.iter().zip(&frame.samples) {
            let metrics = per_target.entry(*id).or_default();
            metrics.record_outcome(outcome);
            if let IngestOutcome::Updated(pose) = outcome {
                if let Some(truth) = frame.truth.iter().find(|t| t.target == *id) {
                    metrics.record_error(pose, &truth.pose);
                }
                if let Some((raw_prev, out_prev)) = prev.get(id) {
                    metrics.record_step(raw_prev, &sample.pose, out_prev, pose);
                }
                prev.insert(*id, (sample.pose, *pose));
            }
        }
    }

    let mut total = SmoothingMetrics::default();
    for m in per_target.values() {
        total.merge(m);
    }

    tracing::debug!(
        scenario = name,
        frames = frames.len(),
        emitted = total.n_emitted,
        rejected = total.n_rejected(),
        "evaluation done"
    );

    RunReport {
        scenario: name.to_string(),
        seed,
        frames: frames.len(),
        acquisitions,
        confirmed_losses,
        per_target: per_target
            .into_iter()
            .map(|(target, metrics)| TargetReport { target, metrics })
            .collect(),
        total,
        processing_us,
        elapsed_s: start.elapsed().as_secs_f64(),
    }
}

/// Generate and evaluate a scenario in one go. Returns the report and the
/// generated frames (for saving a replay).
pub fn run_scenario(scenario: &mut Scenario, config: BankConfig) -> (RunReport, Vec<TrackerFrame>) {
    let ids: Vec<TargetId> = scenario.targets.iter().map(|t| t.id).collect();
    let frames = generate_frames(scenario);
    let report = evaluate(&scenario.name, scenario.seed, &ids, &frames, config);
    (report, frames)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
