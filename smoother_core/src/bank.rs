//! Multi-target orchestrator: one smoother and one loss debouncer per target.
//!
//! # Processing steps per frame
//! 1. Apply tracker lifecycle events (found → acquire, lost → pending loss)
//! 2. Confirm pending losses whose debounce window has elapsed
//! 3. Feed each raw sample to its target's smoother if the target is visible
//! 4. Collect per-target outcomes
//!
//! Targets share no state and are processed in id order.

use crate::{
    config::{DeviceClass, Sensitivity, SmootherConfig},
    lifecycle::{LossDebouncer, DEFAULT_LOSS_DEBOUNCE},
    smoother::{IngestOutcome, PoseSmoother},
    types::{Pose, PoseSample, TargetId, TrackerEvent, TrackerEventKind},
};
use std::{collections::BTreeMap, time::Instant};

/// Configuration for a [`SmootherBank`].
#[derive(Clone, Debug)]
pub struct BankConfig {
    /// Config given to targets added without an explicit one
    pub smoother: SmootherConfig,
    /// Seconds a raw loss must persist before it is confirmed
    pub loss_debounce: f64,
}

impl Default for BankConfig {
    fn default() -> Self {
        Self {
            smoother: SmootherConfig::default(),
            loss_debounce: DEFAULT_LOSS_DEBOUNCE,
        }
    }
}

/// Per-target filter and visibility state.
#[derive(Clone, Debug)]
pub struct TargetSlot {
    pub smoother: PoseSmoother,
    pub debounce: LossDebouncer,
}

/// Everything the tracker reported for one rendered frame.
#[derive(Clone, Debug, Default)]
pub struct FrameInput {
    pub time: f64,
    pub events: Vec<TrackerEvent>,
    pub samples: Vec<PoseSample>,
}

/// Outputs of one frame.
#[derive(Clone, Debug, Default)]
pub struct FrameOutput {
    /// Outcome per sample delivered this frame
    pub outcomes: Vec<(TargetId, IngestOutcome)>,
    /// Targets (re)acquired this frame
    pub acquired: Vec<TargetId>,
    /// Targets whose loss was confirmed this frame
    pub confirmed_losses: Vec<TargetId>,
    /// Wall-clock processing time
    pub total_time_us: u64,
}

impl FrameOutput {
    /// Poses emitted this frame.
    pub fn poses(&self) -> impl Iterator<Item = (TargetId, Pose)> + '_ {
        self.outcomes
            .iter()
            .filter_map(|(id, o)| o.pose().map(|p| (*id, p)))
    }
}

/// Owns the smoothing state for every tracked target.
pub struct SmootherBank {
    pub config: BankConfig,
    targets: BTreeMap<TargetId, TargetSlot>,
    next_id: u32,
}

impl SmootherBank {
    pub fn new(config: BankConfig) -> Self {
        Self {
            config,
            targets: BTreeMap::new(),
            next_id: 0,
        }
    }

    /// Register a target with the bank's default config.
    pub fn add_target(&mut self) -> TargetId {
        let cfg = self.config.smoother.clone();
        self.add_target_with(cfg)
    }

    /// Register a target with its own config.
    pub fn add_target_with(&mut self, config: SmootherConfig) -> TargetId {
        while self.targets.contains_key(&TargetId(self.next_id)) {
            self.next_id += 1;
        }
        let id = TargetId(self.next_id);
        self.next_id += 1;
        self.insert(id, config);
        id
    }

    /// Register (or replace) the target `id`.
    pub fn insert(&mut self, id: TargetId, config: SmootherConfig) {
        let slot = TargetSlot {
            smoother: PoseSmoother::for_target(id, config),
            debounce: LossDebouncer::new(self.config.loss_debounce),
        };
        self.targets.insert(id, slot);
    }

    pub fn get(&self, id: TargetId) -> Option<&TargetSlot> {
        self.targets.get(&id)
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = TargetId> + '_ {
        self.targets.keys().copied()
    }

    /// Targets currently receiving frames.
    pub fn visible_targets(&self) -> Vec<TargetId> {
        self.targets
            .iter()
            .filter(|(_, s)| s.debounce.is_visible())
            .map(|(id, _)| *id)
            .collect()
    }

    /// Apply a sensitivity preset to every target.
    pub fn set_sensitivity_all(&mut self, level: Sensitivity) {
        for slot in self.targets.values_mut() {
            slot.smoother.set_sensitivity(level);
        }
    }

    /// Apply a device profile to every target and to the default config.
    pub fn apply_device_profile(&mut self, device: DeviceClass) {
        device.apply(&mut self.config.smoother);
        for slot in self.targets.values_mut() {
            slot.smoother.set_device(device);
        }
    }

    /// Apply one raw lifecycle event. Returns `true` if the target was
    /// (re)acquired.
    pub fn handle_event(&mut self, event: &TrackerEvent) -> bool {
        let Some(slot) = self.targets.get_mut(&event.target) else {
            tracing::warn!(target_id = %event.target, "event for unknown target ignored");
            return false;
        };
        match event.kind {
            TrackerEventKind::Found => {
                if slot.debounce.found() {
                    tracing::debug!(target_id = %event.target, "pending loss cancelled");
                }
                slot.smoother.on_target_found();
                true
            }
            TrackerEventKind::Lost => {
                slot.debounce.lost(event.time);
                false
            }
        }
    }

    /// Confirm elapsed losses. Returns the targets lost at `now`.
    pub fn tick(&mut self, now: f64) -> Vec<TargetId> {
        let mut confirmed = Vec::new();
        for (id, slot) in self.targets.iter_mut() {
            if slot.debounce.poll(now) {
                slot.smoother.on_target_lost();
                confirmed.push(*id);
            }
        }
        confirmed
    }

    /// Feed a raw pose to one target. Unknown or hidden targets yield
    /// [`IngestOutcome::Inactive`].
    pub fn ingest(&mut self, id: TargetId, raw: Pose, now: f64) -> IngestOutcome {
        match self.targets.get_mut(&id) {
            Some(slot) if slot.debounce.is_visible() => slot.smoother.ingest(raw, now),
            Some(_) => IngestOutcome::Inactive,
            None => {
                tracing::warn!(target_id = %id, "sample for unknown target ignored");
                IngestOutcome::Inactive
            }
        }
    }

    /// Run one full frame.
    pub fn process_frame(&mut self, frame: &FrameInput) -> FrameOutput {
        let start = Instant::now();
        let mut out = FrameOutput::default();

        // Step 1: lifecycle events
        for event in &frame.events {
            if self.handle_event(event) {
                out.acquired.push(event.target);
            }
        }

        // Step 2: debounce
        out.confirmed_losses = self.tick(frame.time);

        // Step 3-4: samples
        for sample in &frame.samples {
            let outcome = self.ingest(sample.target, sample.pose, sample.time);
            out.outcomes.push((sample.target, outcome));
        }

        out.total_time_us = start.elapsed().as_micros() as u64;
        out
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
