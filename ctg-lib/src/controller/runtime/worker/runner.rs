//! Poll worker loop implementation.

use std::sync::mpsc::RecvTimeoutError;
use std::thread;

use log::{debug, error, info, warn};

use crate::error::StreamError;
use crate::session::{PlayState, TickOutcome};
use crate::types::Chunk;

use super::context::PollContext;
use super::guard::{AnalysisFlightGuard, PollThreadGuard};

/// Run the poll loop for a single generation.
///
/// Each iteration fetches one chunk, applies it under the session lock, and
/// only then waits for the next tick, so data fetches never overlap.
///
/// # Arguments
///
/// * `ctx` - Captured shared state and handles for this run.
/// * `generation` - Session generation the loop was started under.
pub(in crate::controller::runtime) fn run_poll_loop(ctx: PollContext, generation: u64) {
    let _thread_guard = PollThreadGuard::new(ctx.poll_thread_exists.clone());

    loop {
        if !is_streaming(&ctx, generation) {
            break;
        }

        let fetched = ctx.source.fetch_chunk();
        match apply_tick(&ctx, generation, fetched) {
            Some(chunk) => schedule_analysis(&ctx, generation, &chunk),
            None => break,
        }

        match ctx.stop.recv_timeout(ctx.tick_interval) {
            Err(RecvTimeoutError::Timeout) => continue,
            Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    debug!("poll loop for generation {} finished", generation);
}

/// Return true while the session is still streaming under `generation`.
fn is_streaming(ctx: &PollContext, generation: u64) -> bool {
    let session = ctx.session.lock().unwrap();
    session.generation() == generation && session.state() == PlayState::Streaming
}

/// Apply one fetch result to the session.
///
/// # Returns
///
/// The applied chunk when polling should continue, otherwise `None`.
fn apply_tick(
    ctx: &PollContext,
    generation: u64,
    fetched: Result<Chunk, StreamError>,
) -> Option<Chunk> {
    let mut session = ctx.session.lock().unwrap();

    let chunk = match fetched {
        Ok(chunk) => chunk,
        Err(err) => {
            if let Err(stale) = session.ensure_current(generation) {
                debug!("discarding failed tick: {}", stale);
                return None;
            }
            warn!("stream fetch failed, pausing: {}", err);
            session.record_error(&err);
            if session.state() == PlayState::Streaming {
                session.set_state(PlayState::Paused);
            }
            return None;
        }
    };

    match session.apply_chunk(generation, &chunk) {
        Ok(TickOutcome::Continue) => Some(chunk),
        Ok(TickOutcome::Finished) => {
            info!("stream finished at {:.1}%", session.progress().position);
            None
        }
        Err(err) if err.is_stale() => {
            debug!("discarding chunk: {}", err);
            None
        }
        Err(err) => {
            error!("rejecting chunk, pausing: {}", err);
            session.record_error(&err);
            if session.state() == PlayState::Streaming {
                session.set_state(PlayState::Paused);
            }
            None
        }
    }
}

/// Ask the scheduler about `chunk` and fire an analysis fetch if it agrees.
///
/// The fetch runs on its own thread and is not awaited; its result is applied
/// only if the session is still at `generation`.
fn schedule_analysis(ctx: &PollContext, generation: u64, chunk: &Chunk) {
    if !ctx.scheduler.lock().unwrap().should_fetch(chunk) {
        return;
    }

    let Some(flight) = AnalysisFlightGuard::acquire(&ctx.analysis_in_flight) else {
        debug!("analysis fetch already in flight, skipping");
        return;
    };

    let session = ctx.session.clone();
    let source = ctx.source.clone();
    thread::spawn(move || {
        let _flight = flight;
        match source.fetch_analysis() {
            Ok(response) => {
                let mut session = session.lock().unwrap();
                if let Err(err) = session.apply_analysis(generation, response) {
                    debug!("discarding analysis: {}", err);
                }
            }
            Err(err) => warn!("analysis fetch failed: {}", err),
        }
    });
}
