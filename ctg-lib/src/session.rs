//! The stream session: the single owner of all view state.

use std::sync::Arc;

use crate::analysis::AnalysisSnapshot;
use crate::buffer::{SeriesSnapshot, WindowBuffer};
use crate::error::StreamError;
use crate::progress::ProgressState;
use crate::types::{AnalysisResponse, Chunk, Flag, Metrics};

/// Play mode of a stream session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayState {
    /// Never started, or reset.
    Idle,
    Streaming,
    Paused,
    /// The source reported it is exhausted.
    Finished,
}

/// Outcome of applying one polled chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Chunk applied, polling continues.
    Continue,
    /// Final chunk applied, the session is finished.
    Finished,
}

/// Aggregate of window, progress, analysis, and play mode.
///
/// Every asynchronous result carries the generation it was issued under;
/// `reset` and `jump` bump the generation so late results are discarded.
#[derive(Debug)]
pub struct StreamSession {
    buffer: WindowBuffer,
    progress: ProgressState,
    analysis: Arc<AnalysisSnapshot>,
    state: PlayState,
    generation: u64,
    last_error: Option<String>,
}

impl StreamSession {
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: WindowBuffer::new(capacity),
            progress: ProgressState::default(),
            analysis: Arc::new(AnalysisSnapshot::default()),
            state: PlayState::Idle,
            generation: 0,
            last_error: None,
        }
    }

    pub fn state(&self) -> PlayState {
        self.state
    }

    pub(crate) fn set_state(&mut self, state: PlayState) {
        self.state = state;
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn buffer(&self) -> &WindowBuffer {
        &self.buffer
    }

    pub fn progress(&self) -> ProgressState {
        self.progress
    }

    pub fn analysis(&self) -> Arc<AnalysisSnapshot> {
        self.analysis.clone()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub(crate) fn record_error(&mut self, err: &StreamError) {
        self.last_error = Some(err.to_string());
    }

    /// Check that a result issued under `issued` may still be applied.
    pub fn ensure_current(&self, issued: u64) -> Result<(), StreamError> {
        if issued == self.generation {
            Ok(())
        } else {
            Err(StreamError::StaleResponse {
                issued,
                current: self.generation,
            })
        }
    }

    /// Start a new generation and drop window and analysis state.
    ///
    /// Returns the new generation.
    pub(crate) fn invalidate(&mut self) -> u64 {
        self.generation += 1;
        self.buffer.clear();
        self.analysis = Arc::new(AnalysisSnapshot::default());
        self.last_error = None;
        self.generation
    }

    /// Set the total duration, keeping the current elapsed time.
    pub(crate) fn set_total_duration(&mut self, total_duration: f64) -> Result<(), StreamError> {
        let elapsed = self.progress.elapsed();
        let mut progress = ProgressState {
            position: 0.0,
            total_duration,
        };
        progress.seek_to(elapsed)?;
        self.progress = progress;
        Ok(())
    }

    pub(crate) fn seek_progress(&mut self, elapsed: f64) -> Result<(), StreamError> {
        self.progress.seek_to(elapsed)
    }

    pub(crate) fn rewind_progress(&mut self) {
        self.progress.rewind();
    }

    /// Apply a polled chunk issued under `issued`.
    ///
    /// The chunk is validated before anything is mutated, so a stale or
    /// malformed chunk leaves the session exactly as it was.
    pub fn apply_chunk(&mut self, issued: u64, chunk: &Chunk) -> Result<TickOutcome, StreamError> {
        self.ensure_current(issued)?;
        self.buffer.append(chunk)?;
        self.progress.advance(chunk.progress);
        self.last_error = None;

        if chunk.finished {
            self.state = PlayState::Finished;
            return Ok(TickOutcome::Finished);
        }
        Ok(TickOutcome::Continue)
    }

    /// Fold an analysis response issued under `issued` into a fresh snapshot.
    pub fn apply_analysis(
        &mut self,
        issued: u64,
        response: AnalysisResponse,
    ) -> Result<(), StreamError> {
        self.ensure_current(issued)?;
        let mut next = (*self.analysis).clone();
        next.apply(response);
        self.analysis = Arc::new(next);
        Ok(())
    }

    /// Replace the flag set from the initial timeline load.
    pub(crate) fn replace_flags(&mut self, flags: Vec<Flag>) {
        let mut next = (*self.analysis).clone();
        next.flags = flags;
        self.analysis = Arc::new(next);
    }

    /// Copy the observable state for rendering collaborators.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            state: self.state,
            generation: self.generation,
            position: self.progress.position,
            elapsed: self.progress.elapsed(),
            total_duration: self.progress.total_duration,
            series: self.buffer.series(),
            capacity: self.buffer.capacity(),
            analysis: self.analysis.clone(),
            last_error: self.last_error.clone(),
        }
    }
}

/// Read-only copy of a session for rendering and reporting.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub state: PlayState,
    pub generation: u64,
    pub position: f64,
    pub elapsed: f64,
    pub total_duration: f64,
    pub series: SeriesSnapshot,
    pub capacity: usize,
    pub analysis: Arc<AnalysisSnapshot>,
    pub last_error: Option<String>,
}

impl SessionSnapshot {
    pub fn metrics(&self) -> Option<&Metrics> {
        self.analysis.metrics.as_ref()
    }

    pub fn flags(&self) -> &[Flag] {
        &self.analysis.flags
    }

    /// Flags covering the current elapsed time.
    pub fn active_flags(&self) -> impl Iterator<Item = &Flag> {
        let elapsed = self.elapsed;
        self.analysis
            .flags
            .iter()
            .filter(move |flag| flag.contains(elapsed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Severity;

    fn chunk(times: &[f64], progress: f64, finished: bool) -> Chunk {
        Chunk {
            time: times.to_vec(),
            raw_fhr: vec![140.0; times.len()],
            filtered_fhr: vec![141.0; times.len()],
            uc_signal: vec![12.0; times.len()],
            progress,
            finished,
        }
    }

    #[test]
    fn stale_chunk_is_not_applied() {
        let mut session = StreamSession::new(400);
        let issued = session.generation();
        session.invalidate();

        let result = session.apply_chunk(issued, &chunk(&[0.0, 0.25], 1.0, false));
        assert!(matches!(result, Err(StreamError::StaleResponse { .. })));
        assert!(session.buffer().is_empty());
        assert_eq!(session.progress().position, 0.0);
    }

    #[test]
    fn finished_chunk_is_applied_then_finishes() {
        let mut session = StreamSession::new(400);
        session.set_state(PlayState::Streaming);
        let generation = session.generation();

        let outcome = session
            .apply_chunk(generation, &chunk(&[0.0], 99.5, false))
            .expect("apply");
        assert_eq!(outcome, TickOutcome::Continue);

        let outcome = session
            .apply_chunk(generation, &chunk(&[], 100.0, true))
            .expect("apply");
        assert_eq!(outcome, TickOutcome::Finished);
        assert_eq!(session.state(), PlayState::Finished);
        assert_eq!(session.progress().position, 100.0);
        assert_eq!(session.buffer().len(), 1);
    }

    #[test]
    fn analysis_snapshot_is_replaced_not_mutated() {
        let mut session = StreamSession::new(400);
        let before = session.analysis();
        session
            .apply_analysis(
                session.generation(),
                AnalysisResponse {
                    metrics: None,
                    flags: Some(vec![Flag {
                        start: 0.0,
                        end: 5.0,
                        kind: "SUSPICIOUS (Minimal Variability)".to_string(),
                        category: Some("II".to_string()),
                        severity: Severity::Medium,
                        details: None,
                    }]),
                },
            )
            .expect("apply");
        assert!(before.flags.is_empty());
        assert_eq!(session.analysis().flags.len(), 1);
        assert_eq!(session.snapshot().active_flags().count(), 1);
    }

    #[test]
    fn total_duration_change_keeps_elapsed_time() {
        let mut session = StreamSession::new(400);
        session.seek_progress(250.0).expect("seek");
        session.set_total_duration(500.0).expect("duration");
        assert_eq!(session.progress().position, 50.0);
        assert!(session.set_total_duration(0.0).is_err());
        assert_eq!(session.progress().total_duration, 500.0);
    }
}
