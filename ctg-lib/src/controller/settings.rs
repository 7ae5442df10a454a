use std::time::Duration;

use crate::analysis::{
    AnalysisScheduler, IntervalPolicy, RandomPolicy, DEFAULT_FETCH_PROBABILITY,
};
use crate::buffer::DEFAULT_WINDOW_CAPACITY;

/// Default poll cadence.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(150);

/// Tunables for a [`StreamController`](super::StreamController).
#[derive(Debug, Clone, PartialEq)]
pub struct ControllerSettings {
    pub tick_interval: Duration,
    pub window_capacity: usize,
    pub analysis_probability: f64,
    /// Seed for the probabilistic analysis policy. `None` seeds from entropy.
    pub analysis_seed: Option<u64>,
    /// Replace the probabilistic policy with "every N eligible ticks".
    pub analysis_every: Option<u32>,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            tick_interval: DEFAULT_TICK_INTERVAL,
            window_capacity: DEFAULT_WINDOW_CAPACITY,
            analysis_probability: DEFAULT_FETCH_PROBABILITY,
            analysis_seed: None,
            analysis_every: None,
        }
    }
}

impl ControllerSettings {
    /// Configure the poll cadence. Zero is raised to one millisecond.
    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval.max(Duration::from_millis(1));
        self
    }

    /// Configure how many samples per series the window keeps.
    pub fn with_window_capacity(mut self, capacity: usize) -> Self {
        self.window_capacity = capacity.max(1);
        self
    }

    /// Configure the per-tick analysis probability (clamped to `0.0..=1.0`).
    pub fn with_analysis_probability(mut self, probability: f64) -> Self {
        self.analysis_probability = probability.clamp(0.0, 1.0);
        self
    }

    pub fn with_analysis_seed(mut self, seed: u64) -> Self {
        self.analysis_seed = Some(seed);
        self
    }

    pub fn with_analysis_every(mut self, every: u32) -> Self {
        self.analysis_every = Some(every.max(1));
        self
    }

    /// Build the scheduler described by these settings.
    pub fn build_scheduler(&self) -> AnalysisScheduler {
        if let Some(every) = self.analysis_every {
            return AnalysisScheduler::new(Box::new(IntervalPolicy::new(every)));
        }
        let policy = match self.analysis_seed {
            Some(seed) => RandomPolicy::seeded(self.analysis_probability, seed),
            None => RandomPolicy::new(self.analysis_probability),
        };
        AnalysisScheduler::new(Box::new(policy))
    }
}
