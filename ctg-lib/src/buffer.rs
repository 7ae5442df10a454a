//! Bounded sliding window over the four time-aligned CTG series.

use dasp_ring_buffer::Bounded;

use crate::error::StreamError;
use crate::types::Chunk;

/// Default number of most-recent samples kept per series.
pub const DEFAULT_WINDOW_CAPACITY: usize = 400;

type Series = Bounded<Vec<f64>>;

fn new_series(capacity: usize) -> Series {
    Bounded::from(vec![0.0; capacity])
}

/// Fixed-capacity window holding time, raw FHR, filtered FHR, and UC samples.
///
/// All four series share one length at all times. Pushing past capacity drops
/// the oldest sample of every series.
#[derive(Debug, Clone)]
pub struct WindowBuffer {
    time: Series,
    raw_fhr: Series,
    filtered_fhr: Series,
    uc_signal: Series,
}

impl Default for WindowBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW_CAPACITY)
    }
}

impl WindowBuffer {
    /// Create an empty window. A capacity of `0` is raised to `1`.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            time: new_series(capacity),
            raw_fhr: new_series(capacity),
            filtered_fhr: new_series(capacity),
            uc_signal: new_series(capacity),
        }
    }

    /// Merge a chunk into the window, evicting the oldest samples on overflow.
    ///
    /// # Errors
    /// Returns [`StreamError::MalformedChunk`] when the chunk's series lengths
    /// differ; the window is left untouched in that case.
    pub fn append(&mut self, chunk: &Chunk) -> Result<usize, StreamError> {
        let count = chunk.sample_count()?;
        for index in 0..count {
            self.time.push(chunk.time[index]);
            self.raw_fhr.push(chunk.raw_fhr[index]);
            self.filtered_fhr.push(chunk.filtered_fhr[index]);
            self.uc_signal.push(chunk.uc_signal[index]);
        }
        Ok(count)
    }

    /// Drop every buffered sample.
    pub fn clear(&mut self) {
        for series in [
            &mut self.time,
            &mut self.raw_fhr,
            &mut self.filtered_fhr,
            &mut self.uc_signal,
        ] {
            while series.pop().is_some() {}
        }
    }

    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.time.max_len()
    }

    /// Time of the newest buffered sample.
    pub fn latest_time(&self) -> Option<f64> {
        self.time.iter().last().copied()
    }

    pub fn time(&self) -> Vec<f64> {
        self.time.iter().copied().collect()
    }

    pub fn raw_fhr(&self) -> Vec<f64> {
        self.raw_fhr.iter().copied().collect()
    }

    pub fn filtered_fhr(&self) -> Vec<f64> {
        self.filtered_fhr.iter().copied().collect()
    }

    pub fn uc_signal(&self) -> Vec<f64> {
        self.uc_signal.iter().copied().collect()
    }

    /// Copy the window out as plain vectors for rendering.
    pub fn series(&self) -> SeriesSnapshot {
        SeriesSnapshot {
            time: self.time(),
            raw_fhr: self.raw_fhr(),
            filtered_fhr: self.filtered_fhr(),
            uc_signal: self.uc_signal(),
        }
    }
}

/// Owned copy of the buffered series, oldest sample first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeriesSnapshot {
    pub time: Vec<f64>,
    pub raw_fhr: Vec<f64>,
    pub filtered_fhr: Vec<f64>,
    pub uc_signal: Vec<f64>,
}

impl SeriesSnapshot {
    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }
}
