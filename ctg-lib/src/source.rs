//! Remote data/analysis service boundary.

use std::time::Duration;

use log::debug;
use serde::de::DeserializeOwned;

use crate::error::StreamError;
use crate::types::{AnalysisResponse, Chunk, ClinicalReport, Timeline};

/// Default base URL of the CTG service API.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";

/// Per-request timeout applied by [`HttpSource`].
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Request/response boundary to the service producing chunks and metrics.
///
/// Implementations must be callable from the poll thread and from analysis
/// threads concurrently.
pub trait StreamSource: Send + Sync {
    /// `GET /stream`: the next chunk after the source cursor.
    fn fetch_chunk(&self) -> Result<Chunk, StreamError>;

    /// `GET /analysis`: derived metrics and flags for the recent window.
    fn fetch_analysis(&self) -> Result<AnalysisResponse, StreamError>;

    /// `GET /flags`: the flag set and total duration.
    fn fetch_timeline(&self) -> Result<Timeline, StreamError>;

    /// `POST /jump`: reposition the source cursor.
    fn jump(&self, time_seconds: f64) -> Result<(), StreamError>;

    /// `POST /reset`: rewind the source cursor to the start.
    fn reset(&self) -> Result<(), StreamError>;

    /// `GET /report`: validated warnings up to the cursor.
    fn fetch_report(&self) -> Result<ClinicalReport, StreamError>;
}

/// [`StreamSource`] over HTTP/JSON.
#[derive(Clone)]
pub struct HttpSource {
    agent: ureq::Agent,
    base_url: String,
}

impl HttpSource {
    /// Create a source for `base_url` (for example `http://localhost:8000/api`).
    pub fn new(base_url: &str) -> Self {
        Self::with_timeout(base_url, DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self {
            agent,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, StreamError> {
        let url = self.url(path);
        debug!("GET {}", url);
        let response = self.agent.get(&url).call()?;
        Ok(response.into_json::<T>()?)
    }

    fn post(&self, path: &str, body: serde_json::Value) -> Result<(), StreamError> {
        let url = self.url(path);
        debug!("POST {} {}", url, body);
        self.agent.post(&url).send_json(body)?;
        Ok(())
    }
}

impl StreamSource for HttpSource {
    fn fetch_chunk(&self) -> Result<Chunk, StreamError> {
        self.get_json("stream")
    }

    fn fetch_analysis(&self) -> Result<AnalysisResponse, StreamError> {
        self.get_json("analysis")
    }

    fn fetch_timeline(&self) -> Result<Timeline, StreamError> {
        self.get_json("flags")
    }

    fn jump(&self, time_seconds: f64) -> Result<(), StreamError> {
        self.post("jump", serde_json::json!({ "time_seconds": time_seconds }))
    }

    fn reset(&self) -> Result<(), StreamError> {
        self.post("reset", serde_json::json!({}))
    }

    fn fetch_report(&self) -> Result<ClinicalReport, StreamError> {
        self.get_json("report")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_is_normalized() {
        let source = HttpSource::new("http://localhost:8000/api/");
        assert_eq!(source.base_url(), "http://localhost:8000/api");
        assert_eq!(source.url("stream"), "http://localhost:8000/api/stream");
    }

    #[test]
    fn unreachable_service_is_a_transport_error() {
        let source = HttpSource::with_timeout("http://127.0.0.1:9/api", Duration::from_millis(200));
        assert!(matches!(
            source.fetch_chunk(),
            Err(StreamError::Transport(_))
        ));
    }
}
