//! Edit coalescing
//!
//! Time is passed in by the caller so behaviour is deterministic.

use crate::surface::GesturePhase;
use std::time::{Duration, Instant};

/// Collapses bursts of in-gesture edits into one notification
///
/// Each `Continuing` edit restarts the quiet-period timer; the burst fires
/// once the timer runs out (see [`poll`](Self::poll)). A `Finished` edit
/// fires immediately and cancels any pending fire.
#[derive(Debug, Clone)]
pub struct Debouncer {
    interval: Duration,
    deadline: Option<Instant>,
    pending: usize,
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(Duration::from_millis(300))
    }
}

impl Debouncer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            deadline: None,
            pending: 0,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Record an edit
    ///
    /// Returns the number of coalesced edits if a notification fires now.
    pub fn event(&mut self, phase: GesturePhase, now: Instant) -> Option<usize> {
        self.pending += 1;
        match phase {
            GesturePhase::Finished => self.fire(),
            GesturePhase::Continuing => {
                self.deadline = Some(now + self.interval);
                None
            }
        }
    }

    /// Fire a pending burst whose quiet period has elapsed
    pub fn poll(&mut self, now: Instant) -> Option<usize> {
        match self.deadline {
            Some(deadline) if now >= deadline => self.fire(),
            _ => None,
        }
    }

    /// Whether edits are waiting for their quiet period
    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    fn fire(&mut self) -> Option<usize> {
        self.deadline = None;
        let count = std::mem::take(&mut self.pending);
        (count > 0).then_some(count)
    }
}
