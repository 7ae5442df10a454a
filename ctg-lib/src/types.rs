//! Wire types exchanged with the remote CTG data/analysis service.
//!
//! Every payload is deserialized with `serde`. Optional fields on
//! [`AnalysisResponse`] keep their "absent means unchanged" meaning all the way
//! into the session, so they are modelled as `Option` rather than defaulted.

use serde::{Deserialize, Serialize};

use crate::error::StreamError;

/// One poll response: time-aligned samples plus progress/finished status.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    #[serde(default)]
    pub time: Vec<f64>,
    #[serde(default)]
    pub raw_fhr: Vec<f64>,
    #[serde(default)]
    pub filtered_fhr: Vec<f64>,
    #[serde(default)]
    pub uc_signal: Vec<f64>,
    #[serde(default)]
    pub progress: f64,
    #[serde(default)]
    pub finished: bool,
}

impl Chunk {
    /// Number of samples per series.
    ///
    /// # Errors
    /// Returns [`StreamError::MalformedChunk`] when the series lengths differ.
    pub fn sample_count(&self) -> Result<usize, StreamError> {
        let len = self.time.len();
        if self.raw_fhr.len() != len || self.filtered_fhr.len() != len || self.uc_signal.len() != len
        {
            return Err(StreamError::MalformedChunk {
                time: self.time.len(),
                raw_fhr: self.raw_fhr.len(),
                filtered_fhr: self.filtered_fhr.len(),
                uc_signal: self.uc_signal.len(),
            });
        }
        Ok(len)
    }

    /// Return true when the chunk carries no time samples.
    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }
}

/// Clinical severity attached to flags and metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
        }
    }
}

/// Hazard zone on the playback timeline, `[start, end)` in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flag {
    pub start: f64,
    pub end: f64,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub category: Option<String>,
    pub severity: Severity,
    #[serde(default)]
    pub details: Option<String>,
}

impl Flag {
    /// Return true when `time_seconds` lies inside the half-open interval.
    pub fn contains(&self, time_seconds: f64) -> bool {
        time_seconds >= self.start && time_seconds < self.end
    }
}

/// Derived metrics for the most recent analysis window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub baseline_bpm: f64,
    pub variability_index: f64,
    pub status: String,
    pub category: String,
    pub interpretation_details: String,
    pub severity: Severity,
    #[serde(default)]
    pub accelerations_count: u32,
    #[serde(default)]
    pub decelerations: Vec<String>,
    #[serde(default)]
    pub prolonged_decelerations: u32,
}

/// Response of `GET /analysis`. Absent fields mean "unchanged".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResponse {
    #[serde(default)]
    pub metrics: Option<Metrics>,
    #[serde(default)]
    pub flags: Option<Vec<Flag>>,
}

/// Response of `GET /flags`, loaded once before streaming.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timeline {
    #[serde(default)]
    pub flags: Vec<Flag>,
    pub total_duration: f64,
}

/// One validated warning row of `GET /report`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRow {
    pub start_time: f64,
    pub end_time: f64,
    pub duration_sec: f64,
    pub ctg_category: String,
    pub condition: String,
    pub severity: String,
    pub clinical_notes: String,
}

/// Response of `GET /report`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClinicalReport {
    #[serde(default)]
    pub report: Vec<ReportRow>,
    #[serde(default)]
    pub generated_at: Option<String>,
}
