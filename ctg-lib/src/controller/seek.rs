//! Jump and reset coordination.
//!
//! Both operations work in two phases around stopping the poll loop:
//! [`SeekCoordinator::invalidate`] bumps the generation and clears the window
//! and analysis *before* the loop is joined, so the tick that is in flight at
//! that moment is discarded as stale; the remote request then runs against a
//! quiet session.

use std::sync::Mutex;

use log::{info, warn};

use crate::error::StreamError;
use crate::progress;
use crate::session::{PlayState, StreamSession};
use crate::source::StreamSource;

/// Applies jump/reset requests to a session and the remote source.
pub struct SeekCoordinator<'a> {
    session: &'a Mutex<StreamSession>,
    source: &'a dyn StreamSource,
}

impl<'a> SeekCoordinator<'a> {
    pub fn new(session: &'a Mutex<StreamSession>, source: &'a dyn StreamSource) -> Self {
        Self { session, source }
    }

    /// Validate a jump target against the known total duration.
    ///
    /// # Returns
    ///
    /// The target clamped to `[0, total_duration]`.
    pub fn check_target(&self, target_seconds: f64) -> Result<f64, StreamError> {
        if !target_seconds.is_finite() {
            return Err(StreamError::InvalidTarget(target_seconds));
        }
        let total_duration = self.session.lock().unwrap().progress().total_duration;
        progress::to_position(target_seconds, total_duration)?;
        Ok(target_seconds.clamp(0.0, total_duration))
    }

    /// Start a new generation, clear buffered state, and park the session in
    /// `state`.
    ///
    /// # Returns
    ///
    /// The new generation.
    pub fn invalidate(&self, state: PlayState) -> u64 {
        let mut session = self.session.lock().unwrap();
        let generation = session.invalidate();
        session.set_state(state);
        if state == PlayState::Idle {
            session.rewind_progress();
        }
        generation
    }

    /// Reposition the remote source and resume streaming on success.
    ///
    /// On failure the session stays cleared and paused.
    ///
    /// # Arguments
    ///
    /// * `generation` - Generation returned by [`Self::invalidate`].
    /// * `target_seconds` - Validated target from [`Self::check_target`].
    pub fn jump(&self, generation: u64, target_seconds: f64) -> Result<(), StreamError> {
        let requested = self.source.jump(target_seconds);

        let mut session = self.session.lock().unwrap();
        session.ensure_current(generation)?;
        if let Err(err) = requested {
            warn!("jump to {:.1}s failed: {}", target_seconds, err);
            session.record_error(&err);
            session.set_state(PlayState::Paused);
            return Err(err);
        }

        session.seek_progress(target_seconds)?;
        session.set_state(PlayState::Streaming);
        info!(
            "jumped to {:.1}s ({:.1}%)",
            target_seconds,
            session.progress().position
        );
        Ok(())
    }

    /// Rewind the remote source. Local state was already cleared by
    /// [`Self::invalidate`] and stays idle whatever the outcome.
    pub fn reset(&self, generation: u64) -> Result<(), StreamError> {
        let requested = self.source.reset();

        let mut session = self.session.lock().unwrap();
        session.ensure_current(generation)?;
        if let Err(err) = requested {
            warn!("remote reset failed: {}", err);
            session.record_error(&err);
            return Err(err);
        }
        info!("stream reset");
        Ok(())
    }
}
