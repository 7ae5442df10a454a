//! Transport and lifecycle operations for `StreamController`.
//!
//! Methods here move the session through its play states and start or stop
//! the poll loop accordingly.

use std::sync::atomic::Ordering;
use std::thread;
use std::time::{Duration, Instant};

use log::{info, warn};

use crate::error::StreamError;
use crate::session::{PlayState, SessionSnapshot};
use crate::types::{ClinicalReport, Timeline};

use super::{SeekCoordinator, StreamController};

impl StreamController {
    /// Load flags and total duration from the service.
    ///
    /// On failure the current duration and flags are kept.
    pub fn load_timeline(&mut self) -> Result<Timeline, StreamError> {
        let timeline = match self.source.fetch_timeline() {
            Ok(timeline) => timeline,
            Err(err) => {
                warn!("timeline load failed: {}", err);
                return Err(err);
            }
        };

        let mut session = self.session.lock().unwrap();
        session.set_total_duration(timeline.total_duration)?;
        session.replace_flags(timeline.flags.clone());
        info!(
            "timeline loaded: {:.1}s, {} flag(s)",
            timeline.total_duration,
            timeline.flags.len()
        );
        Ok(timeline)
    }

    /// Begin streaming from `Idle` or `Paused`.
    pub fn start(&mut self) -> Result<(), StreamError> {
        let state = self.state();
        if !matches!(state, PlayState::Idle | PlayState::Paused) {
            return Err(StreamError::InvalidTransition {
                from: state,
                action: "start",
            });
        }

        // A loop paused mid-fetch must finish applying before a new one runs,
        // and may finish the stream while doing so.
        self.stop_poll_loop();

        let generation = {
            let mut session = self.session.lock().unwrap();
            let state = session.state();
            if !matches!(state, PlayState::Idle | PlayState::Paused) {
                return Err(StreamError::InvalidTransition {
                    from: state,
                    action: "start",
                });
            }
            session.set_state(PlayState::Streaming);
            session.generation()
        };
        info!("streaming started");
        self.spawn_poll_loop(generation);
        Ok(())
    }

    /// Pause streaming. The in-flight tick, if any, is still applied.
    ///
    /// Does nothing unless the session is streaming.
    pub fn pause(&mut self) {
        {
            let mut session = self.session.lock().unwrap();
            if session.state() != PlayState::Streaming {
                return;
            }
            session.set_state(PlayState::Paused);
        }
        self.signal_poll_stop();
        info!("streaming paused");
    }

    /// Pause when streaming, otherwise start.
    pub fn toggle(&mut self) -> Result<(), StreamError> {
        if self.is_streaming() {
            self.pause();
            Ok(())
        } else {
            self.start()
        }
    }

    /// Clear all buffered state and reposition the source to `target_seconds`.
    ///
    /// Streaming resumes from the new position on success. On failure the
    /// session is left cleared and paused.
    pub fn jump(&mut self, target_seconds: f64) -> Result<(), StreamError> {
        let state = self.state();
        if state == PlayState::Finished {
            return Err(StreamError::InvalidTransition {
                from: state,
                action: "jump",
            });
        }

        let source = self.source.clone();
        let session = self.session.clone();
        let coordinator = SeekCoordinator::new(&session, source.as_ref());
        let target = coordinator.check_target(target_seconds)?;

        let generation = coordinator.invalidate(PlayState::Paused);
        self.stop_poll_loop();
        coordinator.jump(generation, target)?;

        self.spawn_poll_loop(generation);
        Ok(())
    }

    /// Return to the initial idle state and rewind the source.
    ///
    /// Local state is cleared even when the remote reset fails. Calling this
    /// repeatedly has the same effect as calling it once.
    pub fn reset(&mut self) -> Result<(), StreamError> {
        let source = self.source.clone();
        let session = self.session.clone();
        let coordinator = SeekCoordinator::new(&session, source.as_ref());

        let generation = coordinator.invalidate(PlayState::Idle);
        self.stop_poll_loop();
        coordinator.reset(generation)
    }

    /// Fetch the validated-warnings report for export.
    pub fn fetch_report(&self) -> Result<ClinicalReport, StreamError> {
        self.source.fetch_report()
    }

    pub fn state(&self) -> PlayState {
        self.session.lock().unwrap().state()
    }

    pub fn is_streaming(&self) -> bool {
        self.state() == PlayState::Streaming
    }

    pub fn is_finished(&self) -> bool {
        self.state() == PlayState::Finished
    }

    /// Return true while a poll thread is alive.
    pub fn is_polling(&self) -> bool {
        self.poll_thread_exists.load(Ordering::SeqCst)
    }

    /// Return true while an analysis fetch is in flight.
    pub fn is_analysis_in_flight(&self) -> bool {
        self.analysis_in_flight.load(Ordering::SeqCst)
    }

    /// Copy the observable session state.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.session.lock().unwrap().snapshot()
    }

    /// Current playback position in `[0, 100]`.
    pub fn position(&self) -> f64 {
        self.session.lock().unwrap().progress().position
    }

    /// Current elapsed time in seconds.
    pub fn elapsed(&self) -> f64 {
        self.session.lock().unwrap().progress().elapsed()
    }

    pub fn total_duration(&self) -> f64 {
        self.session.lock().unwrap().progress().total_duration
    }

    /// Block until the session stops streaming or `timeout` elapses.
    ///
    /// # Returns
    ///
    /// The state observed last.
    pub fn wait_while_streaming(&self, timeout: Duration) -> PlayState {
        let start = Instant::now();
        loop {
            let state = self.state();
            if state != PlayState::Streaming || start.elapsed() >= timeout {
                return state;
            }
            thread::sleep(Duration::from_millis(10));
        }
    }
}
