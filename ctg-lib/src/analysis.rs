//! Throttled scheduling of secondary analysis fetches.
//!
//! The poll loop asks the [`AnalysisScheduler`] once per applied chunk whether
//! a `GET /analysis` should follow. The decision itself lives behind
//! [`AnalysisPolicy`] so the cadence can be random (seedable) or a fixed
//! interval without touching the controller.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::types::{AnalysisResponse, Chunk, Flag, Metrics};

/// Default probability of fetching analysis on an eligible tick.
pub const DEFAULT_FETCH_PROBABILITY: f64 = 0.3;

/// Decision rule for non-empty chunks.
pub trait AnalysisPolicy: Send {
    /// Return true when this eligible tick should trigger an analysis fetch.
    fn decide(&mut self) -> bool;
}

/// Fetch with a fixed probability per eligible tick.
pub struct RandomPolicy {
    probability: f64,
    rng: StdRng,
}

impl RandomPolicy {
    /// Create an entropy-seeded policy.
    pub fn new(probability: f64) -> Self {
        Self {
            probability: probability.clamp(0.0, 1.0),
            rng: StdRng::from_entropy(),
        }
    }

    /// Create a reproducible policy.
    pub fn seeded(probability: f64, seed: u64) -> Self {
        Self {
            probability: probability.clamp(0.0, 1.0),
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl AnalysisPolicy for RandomPolicy {
    fn decide(&mut self) -> bool {
        self.rng.gen_bool(self.probability)
    }
}

/// Fetch on every `every`-th eligible tick.
pub struct IntervalPolicy {
    every: u32,
    eligible_ticks: u32,
}

impl IntervalPolicy {
    /// `every` of `0` is treated as `1`.
    pub fn new(every: u32) -> Self {
        Self {
            every: every.max(1),
            eligible_ticks: 0,
        }
    }
}

impl AnalysisPolicy for IntervalPolicy {
    fn decide(&mut self) -> bool {
        self.eligible_ticks += 1;
        if self.eligible_ticks >= self.every {
            self.eligible_ticks = 0;
            return true;
        }
        false
    }
}

/// Gatekeeper between the poll loop and the analysis endpoint.
pub struct AnalysisScheduler {
    policy: Box<dyn AnalysisPolicy>,
}

impl Default for AnalysisScheduler {
    fn default() -> Self {
        Self::new(Box::new(RandomPolicy::new(DEFAULT_FETCH_PROBABILITY)))
    }
}

impl AnalysisScheduler {
    pub fn new(policy: Box<dyn AnalysisPolicy>) -> Self {
        Self { policy }
    }

    /// Decide whether `chunk` should be followed by an analysis fetch.
    ///
    /// Empty chunks never qualify and do not advance the policy.
    pub fn should_fetch(&mut self, chunk: &Chunk) -> bool {
        if chunk.is_empty() {
            return false;
        }
        self.policy.decide()
    }
}

/// Latest derived metrics and flags, replaced wholesale per field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalysisSnapshot {
    pub metrics: Option<Metrics>,
    pub flags: Vec<Flag>,
}

impl AnalysisSnapshot {
    /// Fold an analysis response in. Absent fields leave the current value.
    pub fn apply(&mut self, response: AnalysisResponse) {
        if let Some(metrics) = response.metrics {
            self.metrics = Some(metrics);
        }
        if let Some(flags) = response.flags {
            self.flags = flags;
        }
    }

    pub fn clear(&mut self) {
        self.metrics = None;
        self.flags.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_none() && self.flags.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Severity;

    fn chunk_with(samples: usize) -> Chunk {
        let values = vec![140.0; samples];
        Chunk {
            time: (0..samples).map(|i| i as f64 * 0.25).collect(),
            raw_fhr: values.clone(),
            filtered_fhr: values.clone(),
            uc_signal: values,
            progress: 1.0,
            finished: false,
        }
    }

    fn metrics(status: &str) -> Metrics {
        Metrics {
            baseline_bpm: 140.0,
            variability_index: 8.2,
            status: status.to_string(),
            category: "I".to_string(),
            interpretation_details: "Fetal heart rate patterns appear reassuring.".to_string(),
            severity: Severity::Low,
            accelerations_count: 2,
            decelerations: vec![],
            prolonged_decelerations: 0,
        }
    }

    fn flag(start: f64) -> Flag {
        Flag {
            start,
            end: start + 5.0,
            kind: "CRITICAL (Bradycardia)".to_string(),
            category: Some("III".to_string()),
            severity: Severity::High,
            details: None,
        }
    }

    #[test]
    fn empty_chunk_never_fetches() {
        let mut scheduler = AnalysisScheduler::new(Box::new(RandomPolicy::seeded(1.0, 7)));
        for _ in 0..50 {
            assert!(!scheduler.should_fetch(&Chunk::default()));
        }
        assert!(scheduler.should_fetch(&chunk_with(5)));
    }

    #[test]
    fn zero_probability_never_fetches() {
        let mut scheduler = AnalysisScheduler::new(Box::new(RandomPolicy::seeded(0.0, 7)));
        assert!((0..200).all(|_| !scheduler.should_fetch(&chunk_with(5))));
    }

    #[test]
    fn seeded_policy_is_reproducible_and_throttled() {
        let run = |seed| {
            let mut scheduler = AnalysisScheduler::new(Box::new(RandomPolicy::seeded(0.3, seed)));
            (0..1000)
                .map(|_| scheduler.should_fetch(&chunk_with(5)))
                .collect::<Vec<_>>()
        };
        let first = run(42);
        assert_eq!(first, run(42));

        let fetched = first.iter().filter(|fetch| **fetch).count();
        assert!(fetched > 200 && fetched < 400, "fetched {}", fetched);
    }

    #[test]
    fn interval_policy_fetches_every_nth_eligible_tick() {
        let mut scheduler = AnalysisScheduler::new(Box::new(IntervalPolicy::new(3)));
        let decisions: Vec<bool> = (0..6)
            .map(|_| {
                assert!(!scheduler.should_fetch(&Chunk::default()));
                scheduler.should_fetch(&chunk_with(2))
            })
            .collect();
        assert_eq!(decisions, vec![false, false, true, false, false, true]);
    }

    #[test]
    fn missing_fields_leave_snapshot_unchanged() {
        let mut snapshot = AnalysisSnapshot::default();
        snapshot.apply(AnalysisResponse {
            metrics: Some(metrics("NORMAL")),
            flags: Some(vec![flag(10.0)]),
        });

        snapshot.apply(AnalysisResponse {
            metrics: Some(metrics("NORMAL - Reassuring")),
            flags: None,
        });
        assert_eq!(snapshot.flags, vec![flag(10.0)]);
        assert_eq!(
            snapshot.metrics.as_ref().map(|m| m.status.as_str()),
            Some("NORMAL - Reassuring")
        );

        snapshot.apply(AnalysisResponse {
            metrics: None,
            flags: Some(vec![]),
        });
        assert!(snapshot.flags.is_empty());
        assert!(snapshot.metrics.is_some());
    }
}
