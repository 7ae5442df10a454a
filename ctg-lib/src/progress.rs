//! Mapping between elapsed seconds and the 0–100 playback-position scale.

use crate::error::StreamError;
use crate::types::{Flag, Severity};

/// Total duration assumed before the timeline has been loaded (seconds).
pub const DEFAULT_TOTAL_DURATION: f64 = 1000.0;

/// Narrowest flag overlay span, in percent of the timeline.
pub const MIN_OVERLAY_WIDTH: f64 = 0.5;

fn check_duration(total_duration: f64) -> Result<(), StreamError> {
    if total_duration.is_finite() && total_duration > 0.0 {
        Ok(())
    } else {
        Err(StreamError::InvalidDuration(total_duration))
    }
}

/// Convert elapsed seconds to a playback position in `[0, 100]`.
///
/// # Errors
/// Returns [`StreamError::InvalidDuration`] when `total_duration <= 0`.
pub fn to_position(elapsed: f64, total_duration: f64) -> Result<f64, StreamError> {
    check_duration(total_duration)?;
    Ok((elapsed / total_duration * 100.0).clamp(0.0, 100.0))
}

/// Convert a playback position back to elapsed seconds.
///
/// # Errors
/// Returns [`StreamError::InvalidDuration`] when `total_duration <= 0`.
pub fn to_elapsed(position: f64, total_duration: f64) -> Result<f64, StreamError> {
    check_duration(total_duration)?;
    Ok(position.clamp(0.0, 100.0) / 100.0 * total_duration)
}

/// Map a scrub fraction (pointer offset over track width) to elapsed seconds.
pub fn scrub_time(fraction: f64, total_duration: f64) -> Result<f64, StreamError> {
    to_elapsed(fraction.clamp(0.0, 1.0) * 100.0, total_duration)
}

/// Playback position plus the total duration it is measured against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressState {
    pub position: f64,
    pub total_duration: f64,
}

impl Default for ProgressState {
    fn default() -> Self {
        Self {
            position: 0.0,
            total_duration: DEFAULT_TOTAL_DURATION,
        }
    }
}

impl ProgressState {
    /// Set the position from an elapsed time.
    pub fn seek_to(&mut self, elapsed: f64) -> Result<(), StreamError> {
        self.position = to_position(elapsed, self.total_duration)?;
        Ok(())
    }

    /// Adopt a position reported by the source, clamped to the scale.
    pub fn advance(&mut self, position: f64) {
        if position.is_finite() {
            self.position = position.clamp(0.0, 100.0);
        }
    }

    /// Elapsed seconds for the current position.
    pub fn elapsed(&self) -> f64 {
        to_elapsed(self.position, self.total_duration).unwrap_or(0.0)
    }

    /// Rewind to the start, keeping the known total duration.
    pub fn rewind(&mut self) {
        self.position = 0.0;
    }
}

/// Horizontal span of a flag on the progress track, in percent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlagSpan {
    pub left: f64,
    pub width: f64,
    pub severity: Severity,
}

/// Lay flags out over the progress track.
///
/// Spans narrower than [`MIN_OVERLAY_WIDTH`] are widened so short zones stay
/// visible.
pub fn flag_overlay(flags: &[Flag], total_duration: f64) -> Result<Vec<FlagSpan>, StreamError> {
    check_duration(total_duration)?;
    flags
        .iter()
        .map(|flag| {
            let left = to_position(flag.start, total_duration)?;
            let right = to_position(flag.end, total_duration)?;
            Ok(FlagSpan {
                left,
                width: (right - left).max(MIN_OVERLAY_WIDTH),
                severity: flag.severity,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_round_trips_through_elapsed() {
        for duration in [0.25, 1.0, 1000.0, 4321.5] {
            for step in 0..=100 {
                let position = step as f64;
                let elapsed = to_elapsed(position, duration).expect("elapsed");
                let back = to_position(elapsed, duration).expect("position");
                assert!((back - position).abs() < 1e-9, "{} vs {}", back, position);
            }
        }
    }

    #[test]
    fn quarter_of_a_thousand_seconds_is_twenty_five_percent() {
        assert_eq!(to_position(250.0, 1000.0).expect("position"), 25.0);
    }

    #[test]
    fn non_positive_duration_is_rejected() {
        assert!(matches!(
            to_position(10.0, 0.0),
            Err(StreamError::InvalidDuration(_))
        ));
        assert!(matches!(
            to_elapsed(10.0, -5.0),
            Err(StreamError::InvalidDuration(_))
        ));
        assert!(to_position(1.0, f64::NAN).is_err());
    }

    #[test]
    fn scrub_fraction_is_clamped() {
        assert_eq!(scrub_time(1.5, 600.0).expect("time"), 600.0);
        assert_eq!(scrub_time(-0.2, 600.0).expect("time"), 0.0);
        assert_eq!(scrub_time(0.5, 600.0).expect("time"), 300.0);
    }

    #[test]
    fn short_flags_get_minimum_width() {
        let flags = vec![Flag {
            start: 100.0,
            end: 101.0,
            kind: "SUSPICIOUS (Late Decelerations)".to_string(),
            category: None,
            severity: Severity::Medium,
            details: None,
        }];
        let spans = flag_overlay(&flags, 1000.0).expect("overlay");
        assert_eq!(spans[0].left, 10.0);
        assert_eq!(spans[0].width, MIN_OVERLAY_WIDTH);
    }
}
