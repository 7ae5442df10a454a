//! Poll-thread bootstrap for `StreamController`.

use std::sync::mpsc;
use std::thread;

use log::debug;

use super::super::StreamController;
use super::worker::{run_poll_loop, PollContext};
use super::PollHandle;

impl StreamController {
    /// Spawn a fresh poll loop bound to `generation`.
    ///
    /// Any previous loop is joined first so two data fetches are never in
    /// flight at once.
    pub(in crate::controller) fn spawn_poll_loop(&mut self, generation: u64) {
        self.stop_poll_loop();

        let (stop_tx, stop_rx) = mpsc::channel();
        let context = PollContext {
            session: self.session.clone(),
            source: self.source.clone(),
            scheduler: self.scheduler.clone(),
            analysis_in_flight: self.analysis_in_flight.clone(),
            poll_thread_exists: self.poll_thread_exists.clone(),
            tick_interval: self.settings.tick_interval,
            stop: stop_rx,
        };

        debug!("spawning poll loop for generation {}", generation);
        let handle = thread::spawn(move || run_poll_loop(context, generation));
        self.poll = Some(PollHandle {
            stop: Some(stop_tx),
            thread: Some(handle),
        });
    }

    /// Stop the poll loop, if any, and wait for it to exit.
    pub(in crate::controller) fn stop_poll_loop(&mut self) {
        if let Some(poll) = self.poll.take() {
            poll.join();
        }
    }

    /// Ask the poll loop to stop after its current tick, without waiting.
    pub(in crate::controller) fn signal_poll_stop(&mut self) {
        if let Some(poll) = self.poll.as_mut() {
            poll.signal_stop();
        }
    }
}
