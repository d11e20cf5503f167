//! Target visibility lifecycle and loss debouncing.
//!
//! # Policy
//! - **Found**: every raw found signal (re)acquires the target immediately.
//! - **Lost**: a raw loss only stops frame delivery. It becomes a confirmed
//!   loss once `loss_debounce` seconds pass without another found signal.
//! - A found inside the debounce window cancels the pending loss.

use serde::{Deserialize, Serialize};

/// Debounce applied to raw loss signals (seconds).
pub const DEFAULT_LOSS_DEBOUNCE: f64 = 0.8;

/// Visibility status of one target.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum Visibility {
    /// Never seen, or loss confirmed
    #[default]
    Absent,
    /// Detected; frames are delivered
    Visible,
    /// Raw loss received at `since`, not yet confirmed
    PendingLoss { since: f64 },
}

/// Turns raw tracker found/lost signals into debounced ones.
#[derive(Clone, Debug)]
pub struct LossDebouncer {
    pub window: f64,
    visibility: Visibility,
}

impl Default for LossDebouncer {
    fn default() -> Self {
        Self::new(DEFAULT_LOSS_DEBOUNCE)
    }
}

impl LossDebouncer {
    /// Negative or non-finite windows are treated as zero.
    pub fn new(window: f64) -> Self {
        let window = if window.is_finite() { window.max(0.0) } else { 0.0 };
        Self {
            window,
            visibility: Visibility::Absent,
        }
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    /// True while frames should be fed to the smoother.
    pub fn is_visible(&self) -> bool {
        self.visibility == Visibility::Visible
    }

    /// Raw found. Returns `true` if a pending loss was cancelled.
    pub fn found(&mut self) -> bool {
        let cancelled = matches!(self.visibility, Visibility::PendingLoss { .. });
        self.visibility = Visibility::Visible;
        cancelled
    }

    /// Raw loss at `now`. Ignored unless the target is visible.
    pub fn lost(&mut self, now: f64) {
        if self.visibility == Visibility::Visible {
            self.visibility = Visibility::PendingLoss { since: now };
        }
    }

    /// Advance to `now`. Returns `true` exactly once per confirmed loss.
    pub fn poll(&mut self, now: f64) -> bool {
        match self.visibility {
            Visibility::PendingLoss { since } if now - since >= self.window => {
                self.visibility = Visibility::Absent;
                true
            }
            _ => false,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loss_confirmed_after_window() {
        let mut d = LossDebouncer::default();
        d.found();
        assert!(d.is_visible());
        d.lost(10.0);
        assert!(!d.is_visible());
        assert!(!d.poll(10.5));
        assert!(d.poll(10.8));
        assert_eq!(d.visibility(), Visibility::Absent);
        // only reported once
        assert!(!d.poll(12.0));
    }

    #[test]
    fn found_cancels_pending_loss() {
        let mut d = LossDebouncer::new(0.8);
        d.found();
        d.lost(1.0);
        assert!(d.found());
        assert!(!d.poll(5.0));
        assert!(d.is_visible());
    }

    #[test]
    fn lost_without_found_is_ignored() {
        let mut d = LossDebouncer::new(0.8);
        d.lost(0.0);
        assert_eq!(d.visibility(), Visibility::Absent);
        assert!(!d.poll(10.0));
    }

    #[test]
    fn repeated_loss_keeps_first_timestamp() {
        let mut d = LossDebouncer::new(1.0);
        d.found();
        d.lost(0.0);
        d.lost(0.9);
        assert!(d.poll(1.0));
    }

    #[test]
    fn zero_window_confirms_immediately() {
        let mut d = LossDebouncer::new(-3.0);
        assert_eq!(d.window, 0.0);
        d.found();
        d.lost(2.0);
        assert!(d.poll(2.0));
    }
}
