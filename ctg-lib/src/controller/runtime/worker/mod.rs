//! Poll worker internals.
//!
//! - [`context`] defines captured shared thread state.
//! - [`guard`] tracks poll-thread liveness and analysis fetch ownership.
//! - [`runner`] executes the fetch/apply/schedule loop.

mod context;
mod guard;
mod runner;

pub(in crate::controller::runtime) use context::PollContext;
pub(in crate::controller::runtime) use runner::run_poll_loop;
