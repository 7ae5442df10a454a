//! Internal runtime plumbing for the controller's poll thread.
//!
//! - [`thread`] captures shared state and spawns the poll loop.
//! - [`worker`] runs the fetch/apply/schedule loop and the analysis fetches.

use std::sync::mpsc::Sender;
use std::thread::JoinHandle;

use log::warn;

mod thread;
mod worker;

/// Owned handle to a running poll loop.
///
/// Dropping the stop sender wakes the loop and ends it after the in-flight
/// tick, if any, has been applied.
pub(super) struct PollHandle {
    stop: Option<Sender<()>>,
    thread: Option<JoinHandle<()>>,
}

impl PollHandle {
    /// Ask the loop to stop without waiting for it.
    pub(super) fn signal_stop(&mut self) {
        self.stop.take();
    }

    /// Stop the loop and wait for its last tick to finish.
    pub(super) fn join(mut self) {
        self.signal_stop();
        if let Some(handle) = self.thread.take() {
            if handle.join().is_err() {
                warn!("poll thread panicked during join");
            }
        }
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.signal_stop();
    }
}
