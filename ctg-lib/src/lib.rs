//! # CTG Stream Library
//!
//! This library provides the streaming/playback core for the CTG monitor.
//! It polls a remote waveform service at a fixed cadence, keeps a bounded
//! window of heart-rate and contraction samples, coordinates seeks and resets
//! with the poll loop, and fetches derived clinical metrics at a throttled
//! cadence.

pub mod analysis;
pub mod buffer;
pub mod controller;
pub mod diagnostics;
pub mod error;
pub mod progress;
pub mod session;
pub mod source;
pub mod types;

pub use controller::{ControllerSettings, SessionHandle, StreamController};
pub use error::StreamError;
pub use session::{PlayState, SessionSnapshot};
