//! Drop guards for poll-thread liveness and analysis fetch ownership.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Guard that keeps `poll_thread_exists` in sync with the worker lifetime.
pub(super) struct PollThreadGuard {
    exists: Arc<AtomicBool>,
}

impl PollThreadGuard {
    /// Mark the thread as alive.
    pub(super) fn new(exists: Arc<AtomicBool>) -> Self {
        exists.store(true, Ordering::SeqCst);
        Self { exists }
    }
}

impl Drop for PollThreadGuard {
    fn drop(&mut self) {
        self.exists.store(false, Ordering::SeqCst);
    }
}

/// Exclusive claim on the single analysis fetch slot.
pub(super) struct AnalysisFlightGuard {
    in_flight: Arc<AtomicBool>,
}

impl AnalysisFlightGuard {
    /// Claim the slot, or return `None` when a fetch is already in flight.
    pub(super) fn acquire(in_flight: &Arc<AtomicBool>) -> Option<Self> {
        in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()?;
        Some(Self {
            in_flight: in_flight.clone(),
        })
    }
}

impl Drop for AnalysisFlightGuard {
    fn drop(&mut self) {
        self.in_flight.store(false, Ordering::SeqCst);
    }
}
