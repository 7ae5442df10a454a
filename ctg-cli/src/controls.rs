use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ctg_lib::diagnostics::reporter::Report;
use ctg_lib::progress::scrub_time;
use ctg_lib::{PlayState, SessionSnapshot, StreamController};
use log::{info, warn};

use crate::cli::export;

/// Seconds moved by one press of the arrow keys.
pub const SEEK_STEP_SECONDS: f64 = 30.0;

pub struct StatusSnapshot {
    pub text: String,
}

fn state_label(state: PlayState) -> &'static str {
    match state {
        PlayState::Idle => "■ Idle",
        PlayState::Streaming => "▶ Streaming",
        PlayState::Paused => "⏸ Paused",
        PlayState::Finished => "✔ Finished",
    }
}

fn range(values: &[f64]) -> Option<(f64, f64)> {
    values.iter().fold(None, |acc, &v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}

pub fn status_text(snapshot: &SessionSnapshot) -> StatusSnapshot {
    let mut lines = vec![format!(
        "{}   {} / {}   ({:>5.1}%)",
        state_label(snapshot.state),
        format_time(snapshot.elapsed),
        format_time(snapshot.total_duration),
        snapshot.position
    )];

    let series = &snapshot.series;
    lines.push(match range(&series.filtered_fhr) {
        Some((lo, hi)) => format!(
            "Window: {}/{} samples | FHR {:.0}-{:.0} bpm (now {:.0}) | UC now {:.1}",
            series.len(),
            snapshot.capacity,
            lo,
            hi,
            series.filtered_fhr.last().copied().unwrap_or_default(),
            series.uc_signal.last().copied().unwrap_or_default()
        ),
        None => format!("Window: 0/{} samples", snapshot.capacity),
    });

    lines.push(match snapshot.metrics() {
        Some(m) => format!(
            "{} (category {}, {}) | baseline {:.1} bpm | variability {:.1} | accels {} | prolonged decels {}",
            m.status,
            m.category,
            m.severity.label(),
            m.baseline_bpm,
            m.variability_index,
            m.accelerations_count,
            m.prolonged_decelerations
        ),
        None => "Awaiting analysis".to_string(),
    });

    let active: Vec<String> = snapshot
        .active_flags()
        .map(|flag| format!("{} [{}]", flag.kind, flag.severity.label()))
        .collect();
    if !active.is_empty() {
        lines.push(format!("Active: {}", active.join(", ")));
    }

    if let Some(err) = &snapshot.last_error {
        lines.push(format!("Last error: {}", err));
    }

    StatusSnapshot {
        text: lines.join("\n"),
    }
}

/// One-line progress summary for headless runs.
pub fn report_line(report: &Report) -> String {
    let mut line = format!(
        "{:?} {:>3}% {} buffered={}",
        report.state,
        report.percent,
        format_time(report.elapsed_seconds as f64),
        report.buffered
    );
    if let (Some(status), Some(severity)) = (&report.status, report.severity) {
        line.push_str(&format!(" status={} severity={}", status, severity.label()));
    }
    if report.flags > 0 {
        line.push_str(&format!(" flags={}", report.flags));
    }
    line
}

/// Target for a relative seek, kept inside the recording.
pub fn seek_target(elapsed: f64, total_duration: f64, delta: f64) -> f64 {
    (elapsed + delta).clamp(0.0, total_duration.max(0.0))
}

fn seek_by(controller: &mut StreamController, delta: f64) {
    let target = seek_target(controller.elapsed(), controller.total_duration(), delta);
    if let Err(err) = controller.jump(target) {
        warn!("jump to {:.0}s failed: {}", target, err);
    }
}

/// Fraction of the recording a digit key jumps to: `0` is the start, `9` is 90%.
pub fn digit_fraction(key: char) -> Option<f64> {
    key.to_digit(10).map(|digit| digit as f64 / 10.0)
}

fn scrub_to(controller: &mut StreamController, fraction: f64) {
    let target = match scrub_time(fraction, controller.total_duration()) {
        Ok(target) => target,
        Err(err) => {
            warn!("{}", err);
            return;
        }
    };
    if let Err(err) = controller.jump(target) {
        warn!("jump to {:.0}s failed: {}", target, err);
    }
}

fn export_report(controller: &StreamController) {
    let report = match controller.fetch_report() {
        Ok(report) => report,
        Err(err) => {
            warn!("report fetch failed: {}", err);
            return;
        }
    };
    if let Err(err) = export::write_report(&report, None) {
        warn!("export failed: {}", err);
    }
}

/// Handle one pending key press, if any.
///
/// # Returns
///
/// `false` when the user asked to quit.
pub fn handle_key_event(controller: &mut StreamController) -> bool {
    if event::poll(Duration::from_millis(100)).unwrap_or(false) {
        if let Ok(Event::Key(key)) = event::read() {
            if key.kind != KeyEventKind::Press {
                return true;
            }
            match key.code {
                KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => return false,
                KeyCode::Char(' ') => {
                    if controller.is_finished() {
                        info!("stream finished, press r to start over");
                    } else if let Err(err) = controller.toggle() {
                        warn!("{}", err);
                    }
                }
                KeyCode::Left => seek_by(controller, -SEEK_STEP_SECONDS),
                KeyCode::Right => seek_by(controller, SEEK_STEP_SECONDS),
                KeyCode::Char('r') | KeyCode::Char('R') => {
                    if let Err(err) = controller.reset() {
                        warn!("reset incomplete: {}", err);
                    }
                }
                KeyCode::Char('e') | KeyCode::Char('E') => export_report(controller),
                KeyCode::Char(key) => {
                    if let Some(fraction) = digit_fraction(key) {
                        scrub_to(controller, fraction);
                    }
                }
                _ => {}
            }
        }
    }

    true
}

pub fn format_time(seconds: f64) -> String {
    let seconds = seconds.max(0.0).floor() as u64;
    let minutes = seconds / 60;
    let seconds = seconds % 60;
    let hours = minutes / 60;
    let minutes = minutes % 60;

    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}
