//! Periodic stream state reporter for UI updates.

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex,
    },
    thread::JoinHandle,
    time::Duration,
};

use crate::controller::SessionHandle;
use crate::session::{PlayState, SessionSnapshot};
use crate::types::Severity;

/// Coarse snapshot of stream state sent to UI consumers.
///
/// Position is reported in whole percent so consumers are only woken when
/// something visible changed.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub state: PlayState,
    pub percent: u8,
    pub elapsed_seconds: u64,
    pub buffered: usize,
    pub status: Option<String>,
    pub severity: Option<Severity>,
    pub flags: usize,
}

impl Report {
    pub fn from_snapshot(snapshot: &SessionSnapshot) -> Self {
        let metrics = snapshot.metrics();
        Self {
            state: snapshot.state,
            percent: snapshot.position.floor().clamp(0.0, 100.0) as u8,
            elapsed_seconds: snapshot.elapsed.max(0.0).floor() as u64,
            buffered: snapshot.series.len(),
            status: metrics.map(|m| m.status.clone()),
            severity: metrics.map(|m| m.severity),
            flags: snapshot.flags().len(),
        }
    }
}

/// Background reporter that polls a session at fixed intervals.
#[derive(Clone)]
pub struct Reporter {
    session: SessionHandle,
    report: Arc<Mutex<dyn FnMut(Report) + Send>>,
    interval: Duration,
    finish: Arc<AtomicBool>,
    thread_handle: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl Reporter {
    /// Create a new reporter for the given session and callback.
    pub fn new(
        session: SessionHandle,
        report: Arc<Mutex<dyn FnMut(Report) + Send>>,
        interval: Duration,
    ) -> Self {
        Self {
            session,
            report,
            interval,
            finish: Arc::new(AtomicBool::new(false)),
            thread_handle: Arc::new(Mutex::new(None)),
        }
    }

    fn run(&self) {
        let mut last_report: Option<Report> = None;

        loop {
            let report = Report::from_snapshot(&self.session.snapshot());

            if last_report.as_ref() != Some(&report) {
                let mut callback = self.report.lock().unwrap();
                (*callback)(report.clone());
                drop(callback);
                last_report = Some(report);
            }

            if self.finish.load(Ordering::Relaxed) {
                break;
            }

            std::thread::sleep(self.interval);
        }
    }

    /// Start the background reporting thread.
    pub fn start(&self) {
        self.stop();
        self.finish.store(false, Ordering::Relaxed);
        let this = self.clone();
        let handle = std::thread::spawn(move || this.run());
        *self.thread_handle.lock().unwrap() = Some(handle);
    }

    /// Stop the background reporting thread.
    pub fn stop(&self) {
        self.finish.store(true, Ordering::Relaxed);
        if let Some(handle) = self.thread_handle.lock().unwrap().take() {
            if handle.thread().id() == std::thread::current().id() {
                log::warn!("reporter stop called from reporter thread; skipping join");
            } else if handle.join().is_err() {
                log::warn!("reporter thread panicked during join");
            }
        }
    }
}
