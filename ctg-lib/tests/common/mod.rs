#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Condvar, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use ctg_lib::error::StreamError;
use ctg_lib::source::StreamSource;
use ctg_lib::types::{
    AnalysisResponse, Chunk, ClinicalReport, Flag, Metrics, ReportRow, Severity, Timeline,
};

pub const SAMPLE_PERIOD: f64 = 0.25;
pub const CHUNK_SIZE: usize = 5;

/// Blocks callers of `pass` while held.
#[derive(Default)]
pub struct Gate {
    state: Mutex<GateState>,
    changed: Condvar,
}

#[derive(Default)]
struct GateState {
    held: bool,
    waiting: usize,
}

impl Gate {
    pub fn hold(&self) {
        self.state.lock().unwrap().held = true;
    }

    pub fn release(&self) {
        self.state.lock().unwrap().held = false;
        self.changed.notify_all();
    }

    fn pass(&self) {
        let mut state = self.state.lock().unwrap();
        state.waiting += 1;
        self.changed.notify_all();
        while state.held {
            state = self.changed.wait(state).unwrap();
        }
        state.waiting -= 1;
    }

    /// Wait until at least one caller is blocked on the gate.
    pub fn wait_for_waiter(&self, timeout: Duration) -> bool {
        let start = Instant::now();
        let mut state = self.state.lock().unwrap();
        while state.waiting == 0 {
            let remaining = match timeout.checked_sub(start.elapsed()) {
                Some(remaining) => remaining,
                None => return false,
            };
            state = self.changed.wait_timeout(state, remaining).unwrap().0;
        }
        true
    }
}

struct ServiceState {
    cursor: usize,
    samples: usize,
    scripted: VecDeque<Chunk>,
    analysis: AnalysisResponse,
    timeline_flags: Vec<Flag>,
    fail_stream: bool,
    fail_analysis: bool,
    fail_jump: bool,
    fail_reset: bool,
    fail_timeline: bool,
    fetch_delay: Duration,
}

/// In-memory stand-in for the CTG service, 4 Hz samples in chunks of five.
pub struct FakeService {
    state: Mutex<ServiceState>,
    pub chunk_gate: Gate,
    pub analysis_gate: Gate,
    pub stream_calls: AtomicUsize,
    in_flight: AtomicUsize,
    /// Most data fetches seen running at the same time.
    pub max_in_flight: AtomicUsize,
    pub analysis_calls: AtomicUsize,
    pub jump_calls: AtomicUsize,
    pub reset_calls: AtomicUsize,
}

impl FakeService {
    pub fn new(samples: usize) -> Self {
        Self {
            state: Mutex::new(ServiceState {
                cursor: 0,
                samples,
                scripted: VecDeque::new(),
                analysis: AnalysisResponse::default(),
                timeline_flags: Vec::new(),
                fail_stream: false,
                fail_analysis: false,
                fail_jump: false,
                fail_reset: false,
                fail_timeline: false,
                fetch_delay: Duration::ZERO,
            }),
            chunk_gate: Gate::default(),
            analysis_gate: Gate::default(),
            stream_calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            analysis_calls: AtomicUsize::new(0),
            jump_calls: AtomicUsize::new(0),
            reset_calls: AtomicUsize::new(0),
        }
    }

    pub fn total_duration(&self) -> f64 {
        self.state.lock().unwrap().samples as f64 * SAMPLE_PERIOD
    }

    /// Serve `chunk` before any generated chunk.
    pub fn script(&self, chunk: Chunk) {
        self.state.lock().unwrap().scripted.push_back(chunk);
    }

    pub fn set_analysis(&self, analysis: AnalysisResponse) {
        self.state.lock().unwrap().analysis = analysis;
    }

    pub fn set_timeline_flags(&self, flags: Vec<Flag>) {
        self.state.lock().unwrap().timeline_flags = flags;
    }

    /// Keep every data fetch running for at least `delay`.
    pub fn set_fetch_delay(&self, delay: Duration) {
        self.state.lock().unwrap().fetch_delay = delay;
    }

    pub fn fail_stream(&self, fail: bool) {
        self.state.lock().unwrap().fail_stream = fail;
    }

    pub fn fail_analysis(&self, fail: bool) {
        self.state.lock().unwrap().fail_analysis = fail;
    }

    pub fn fail_jump(&self, fail: bool) {
        self.state.lock().unwrap().fail_jump = fail;
    }

    pub fn fail_reset(&self, fail: bool) {
        self.state.lock().unwrap().fail_reset = fail;
    }

    pub fn fail_timeline(&self, fail: bool) {
        self.state.lock().unwrap().fail_timeline = fail;
    }

    fn unavailable() -> StreamError {
        StreamError::Transport("service unavailable".to_string())
    }

    fn next_chunk(&self) -> Result<Chunk, StreamError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_stream {
            return Err(Self::unavailable());
        }
        if let Some(chunk) = state.scripted.pop_front() {
            return Ok(chunk);
        }
        if state.cursor >= state.samples {
            return Ok(Chunk {
                progress: 100.0,
                finished: true,
                ..Chunk::default()
            });
        }

        let start = state.cursor;
        let end = (start + CHUNK_SIZE).min(state.samples);
        state.cursor = end;
        Ok(Chunk {
            time: (start..end).map(|i| i as f64 * SAMPLE_PERIOD).collect(),
            raw_fhr: (start..end).map(|i| 140.0 + (i % 10) as f64).collect(),
            filtered_fhr: (start..end).map(|_| 140.0).collect(),
            uc_signal: (start..end).map(|i| 10.0 + (i % 5) as f64).collect(),
            progress: start as f64 / state.samples as f64 * 100.0,
            finished: false,
        })
    }
}

impl StreamSource for FakeService {
    fn fetch_chunk(&self) -> Result<Chunk, StreamError> {
        self.stream_calls.fetch_add(1, Ordering::SeqCst);
        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(running, Ordering::SeqCst);

        self.chunk_gate.pass();
        let delay = self.state.lock().unwrap().fetch_delay;
        if !delay.is_zero() {
            thread::sleep(delay);
        }
        let chunk = self.next_chunk();

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        chunk
    }

    fn fetch_analysis(&self) -> Result<AnalysisResponse, StreamError> {
        self.analysis_calls.fetch_add(1, Ordering::SeqCst);
        self.analysis_gate.pass();

        let state = self.state.lock().unwrap();
        if state.fail_analysis {
            return Err(Self::unavailable());
        }
        Ok(state.analysis.clone())
    }

    fn fetch_timeline(&self) -> Result<Timeline, StreamError> {
        let state = self.state.lock().unwrap();
        if state.fail_timeline {
            return Err(Self::unavailable());
        }
        Ok(Timeline {
            flags: state.timeline_flags.clone(),
            total_duration: state.samples as f64 * SAMPLE_PERIOD,
        })
    }

    fn jump(&self, time_seconds: f64) -> Result<(), StreamError> {
        self.jump_calls.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.lock().unwrap();
        if state.fail_jump {
            return Err(Self::unavailable());
        }
        state.cursor = ((time_seconds / SAMPLE_PERIOD).round() as usize).min(state.samples);
        Ok(())
    }

    fn reset(&self) -> Result<(), StreamError> {
        self.reset_calls.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.lock().unwrap();
        if state.fail_reset {
            return Err(Self::unavailable());
        }
        state.cursor = 0;
        Ok(())
    }

    fn fetch_report(&self) -> Result<ClinicalReport, StreamError> {
        Ok(ClinicalReport {
            report: vec![ReportRow {
                start_time: 95.0,
                end_time: 100.0,
                duration_sec: 5.0,
                ctg_category: "II".to_string(),
                condition: "SUSPICIOUS (Tachycardia)".to_string(),
                severity: "MEDIUM".to_string(),
                clinical_notes: "Baseline FHR >160 bpm.".to_string(),
            }],
            generated_at: None,
        })
    }
}

pub fn metrics(status: &str, severity: Severity) -> Metrics {
    Metrics {
        baseline_bpm: 141.5,
        variability_index: 6.3,
        status: status.to_string(),
        category: "I".to_string(),
        interpretation_details: "Fetal heart rate patterns appear within normal limits."
            .to_string(),
        severity,
        accelerations_count: 0,
        decelerations: vec![],
        prolonged_decelerations: 0,
    }
}

pub fn flag(start: f64, end: f64, severity: Severity) -> Flag {
    Flag {
        start,
        end,
        kind: "CRITICAL (Bradycardia)".to_string(),
        category: Some("III".to_string()),
        severity,
        details: Some("Baseline FHR <110 bpm indicates severe fetal bradycardia.".to_string()),
    }
}

/// Poll `condition` every millisecond until it holds or `timeout` passes.
pub fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let start = Instant::now();
    while start.elapsed() < timeout {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(1));
    }
    condition()
}
