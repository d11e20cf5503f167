//! Replay: serialize/deserialize recorded tracker frames for offline evaluation.

use crate::tracker_sim::TrackerFrame;
use serde::{Deserialize, Serialize};
use smoother_core::types::TargetId;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// A full recorded tracker session.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReplayLog {
    pub scenario_name: String,
    pub seed: u64,
    pub frame_dt: f64,
    pub duration: f64,
    /// Every marker that may appear in the frames
    pub targets: Vec<TargetId>,
    /// Tracker output in chronological order, with ground truth
    pub frames: Vec<TrackerFrame>,
}

/// Save a replay log to a JSON file.
pub fn save_replay(log: &ReplayLog, path: &Path) -> anyhow::Result<()> {
    let file = std::fs::File::create(path)?;
    let writer = BufWriter::new(file);
    serde_json::to_writer(writer, log)?;
    tracing::debug!(path = %path.display(), frames = log.frames.len(), "replay saved");
    Ok(())
}

/// Load a replay log from a JSON file.
pub fn load_replay(path: &Path) -> anyhow::Result<ReplayLog> {
    let file = std::fs::File::open(path)?;
    let reader = BufReader::new(file);
    let log: ReplayLog = serde_json::from_reader(reader)?;
    if log.frames.windows(2).any(|w| w[1].time < w[0].time) {
        anyhow::bail!("replay {} has frames out of order", path.display());
    }
    Ok(log)
}
