//! Shared runtime context captured at thread spawn time.

use std::sync::atomic::AtomicBool;
use std::sync::mpsc::Receiver;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::analysis::AnalysisScheduler;
use crate::session::StreamSession;
use crate::source::StreamSource;

/// Captured shared state passed from `StreamController::spawn_poll_loop` into
/// the poll thread.
pub(in crate::controller::runtime) struct PollContext {
    pub(in crate::controller::runtime) session: Arc<Mutex<StreamSession>>,
    pub(in crate::controller::runtime) source: Arc<dyn StreamSource>,
    pub(in crate::controller::runtime) scheduler: Arc<Mutex<AnalysisScheduler>>,
    pub(in crate::controller::runtime) analysis_in_flight: Arc<AtomicBool>,
    pub(in crate::controller::runtime) poll_thread_exists: Arc<AtomicBool>,
    pub(in crate::controller::runtime) tick_interval: Duration,
    pub(in crate::controller::runtime) stop: Receiver<()>,
}
