//! Command-line surface: argument parsing, export, and flag listing.

use std::fmt::{Display, Formatter};

use ctg_lib::StreamError;

pub mod args;
pub mod export;
pub mod flags;

/// Errors that end a CLI run.
#[derive(Debug)]
pub enum CliError {
    Stream(StreamError),
    Io(std::io::Error),
    Json(serde_json::Error),
    InvalidArgument { name: &'static str, value: String },
}

impl Display for CliError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stream(err) => write!(f, "{}", err),
            Self::Io(err) => write!(f, "io error: {}", err),
            Self::Json(err) => write!(f, "json error: {}", err),
            Self::InvalidArgument { name, value } => {
                write!(f, "invalid value '{}' for --{}", value, name)
            }
        }
    }
}

impl std::error::Error for CliError {}

impl From<StreamError> for CliError {
    fn from(value: StreamError) -> Self {
        Self::Stream(value)
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}
