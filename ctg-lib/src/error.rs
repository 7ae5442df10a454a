use std::fmt::{Display, Formatter};

use crate::session::PlayState;

/// Error type for stream control, chunk validation, and remote IO.
#[derive(Debug)]
pub enum StreamError {
    /// Network or remote failure on any fetch, including undecodable bodies.
    Transport(String),
    /// A chunk whose series arrays do not share one length.
    MalformedChunk {
        time: usize,
        raw_fhr: usize,
        filtered_fhr: usize,
        uc_signal: usize,
    },
    /// A non-positive (or non-finite) total duration.
    InvalidDuration(f64),
    /// A jump target that is not a finite number of seconds.
    InvalidTarget(f64),
    /// A response issued under an older session generation.
    StaleResponse { issued: u64, current: u64 },
    /// A control action that the current play state does not allow.
    InvalidTransition {
        from: PlayState,
        action: &'static str,
    },
}

impl Display for StreamError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transport(err) => write!(f, "transport error: {}", err),
            Self::MalformedChunk {
                time,
                raw_fhr,
                filtered_fhr,
                uc_signal,
            } => write!(
                f,
                "malformed chunk: series lengths differ (time={}, raw_fhr={}, filtered_fhr={}, uc_signal={})",
                time, raw_fhr, filtered_fhr, uc_signal
            ),
            Self::InvalidDuration(duration) => {
                write!(f, "invalid total duration: {}", duration)
            }
            Self::InvalidTarget(target) => write!(f, "invalid jump target: {}", target),
            Self::StaleResponse { issued, current } => write!(
                f,
                "stale response: issued at generation {}, session is at {}",
                issued, current
            ),
            Self::InvalidTransition { from, action } => {
                write!(f, "cannot {} while {:?}", action, from)
            }
        }
    }
}

impl std::error::Error for StreamError {}

impl From<ureq::Error> for StreamError {
    fn from(value: ureq::Error) -> Self {
        match value {
            ureq::Error::Status(code, response) => {
                Self::Transport(format!("{} returned status {}", response.get_url(), code))
            }
            ureq::Error::Transport(transport) => Self::Transport(transport.to_string()),
        }
    }
}

impl From<std::io::Error> for StreamError {
    fn from(value: std::io::Error) -> Self {
        Self::Transport(value.to_string())
    }
}

impl StreamError {
    /// Return `true` for errors that only signal an outdated response.
    pub fn is_stale(&self) -> bool {
        matches!(self, Self::StaleResponse { .. })
    }
}
