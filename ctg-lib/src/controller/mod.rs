//! High-level streaming controller.
//!
//! [`StreamController`] owns the session, the poll loop, and the analysis
//! scheduler. Control actions (`start`, `pause`, `jump`, `reset`) run on the
//! caller's thread; ticks run on a single poll thread spawned per `start`.

mod controls;
mod runtime;
mod seek;
mod settings;

use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use crate::analysis::AnalysisScheduler;
use crate::session::{SessionSnapshot, StreamSession};
use crate::source::StreamSource;

pub use seek::SeekCoordinator;
pub use settings::{ControllerSettings, DEFAULT_TICK_INTERVAL};

use runtime::PollHandle;

/// Primary streaming controller.
pub struct StreamController {
    session: Arc<Mutex<StreamSession>>,
    source: Arc<dyn StreamSource>,
    scheduler: Arc<Mutex<AnalysisScheduler>>,
    settings: ControllerSettings,
    analysis_in_flight: Arc<AtomicBool>,
    poll_thread_exists: Arc<AtomicBool>,
    poll: Option<PollHandle>,
}

impl StreamController {
    /// Create a controller with the scheduler described by `settings`.
    pub fn new(source: Arc<dyn StreamSource>, settings: ControllerSettings) -> Self {
        let scheduler = settings.build_scheduler();
        Self::with_scheduler(source, settings, scheduler)
    }

    /// Create a controller with an explicit analysis scheduler.
    pub fn with_scheduler(
        source: Arc<dyn StreamSource>,
        settings: ControllerSettings,
        scheduler: AnalysisScheduler,
    ) -> Self {
        Self {
            session: Arc::new(Mutex::new(StreamSession::new(settings.window_capacity))),
            source,
            scheduler: Arc::new(Mutex::new(scheduler)),
            settings,
            analysis_in_flight: Arc::new(AtomicBool::new(false)),
            poll_thread_exists: Arc::new(AtomicBool::new(false)),
            poll: None,
        }
    }

    pub fn settings(&self) -> &ControllerSettings {
        &self.settings
    }

    /// Read-only handle to the session for observers such as the reporter.
    pub fn session_handle(&self) -> SessionHandle {
        SessionHandle {
            session: self.session.clone(),
        }
    }
}

impl Drop for StreamController {
    fn drop(&mut self) {
        self.stop_poll_loop();
    }
}

/// Shared read-only view of a controller's session.
#[derive(Clone)]
pub struct SessionHandle {
    session: Arc<Mutex<StreamSession>>,
}

impl SessionHandle {
    pub fn snapshot(&self) -> SessionSnapshot {
        self.session.lock().unwrap().snapshot()
    }
}
