use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Sparkline},
    Frame, Terminal,
};

use ctg_lib::progress::{flag_overlay, FlagSpan};
use ctg_lib::types::Severity;
use ctg_lib::SessionSnapshot;

use crate::controls::{format_time, StatusSnapshot};

pub struct View<'a> {
    pub status: &'a StatusSnapshot,
    pub snapshot: &'a SessionSnapshot,
    pub log_lines: &'a [String],
}

fn severity_rank(severity: Severity) -> u8 {
    match severity {
        Severity::Low => 0,
        Severity::Medium => 1,
        Severity::High => 2,
    }
}

fn severity_color(severity: Severity) -> Color {
    match severity {
        Severity::Low => Color::Green,
        Severity::Medium => Color::Yellow,
        Severity::High => Color::Red,
    }
}

/// Rasterize flag spans into `width` cells, each showing the most severe
/// flag that overlaps it.
pub fn flag_track(spans: &[FlagSpan], width: u16) -> Vec<Option<Severity>> {
    let width = width.max(1);
    (0..width)
        .map(|col| {
            let lo = col as f64 / width as f64 * 100.0;
            let hi = (col + 1) as f64 / width as f64 * 100.0;
            spans
                .iter()
                .filter(|span| span.left < hi && span.left + span.width > lo)
                .map(|span| span.severity)
                .max_by_key(|severity| severity_rank(*severity))
        })
        .collect()
}

/// Scale the last `width` values for a sparkline.
///
/// # Returns
///
/// Bar heights relative to the window minimum and the matching maximum.
pub fn sparkline_data(values: &[f64], width: usize) -> (Vec<u64>, u64) {
    let tail = &values[values.len().saturating_sub(width)..];
    let Some(lo) = tail.iter().copied().reduce(f64::min) else {
        return (Vec::new(), 1);
    };
    let hi = tail.iter().copied().fold(lo, f64::max);
    let data = tail.iter().map(|v| (v - lo).round() as u64).collect();
    (data, ((hi - lo).round() as u64).max(1))
}

fn draw_progress(f: &mut Frame, area: Rect, snapshot: &SessionSnapshot) {
    let block = Block::default().borders(Borders::ALL).title("Progress");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1)])
        .split(inner);

    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(Color::Cyan).bg(Color::Black))
        .ratio((snapshot.position / 100.0).clamp(0.0, 1.0))
        .label(format!(
            "{} / {}",
            format_time(snapshot.elapsed),
            format_time(snapshot.total_duration)
        ));
    f.render_widget(gauge, rows[0]);

    let spans = flag_overlay(snapshot.flags(), snapshot.total_duration).unwrap_or_default();
    let track: Vec<Span> = flag_track(&spans, rows[1].width)
        .into_iter()
        .map(|cell| match cell {
            Some(severity) => Span::styled("▀", Style::default().fg(severity_color(severity))),
            None => Span::raw(" "),
        })
        .collect();
    f.render_widget(Paragraph::new(Line::from(track)), rows[1]);
}

fn draw_signals(f: &mut Frame, area: Rect, snapshot: &SessionSnapshot) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let signals = [
        ("Filtered FHR (bpm)", &snapshot.series.filtered_fhr, Color::Red),
        ("Uterine contractions", &snapshot.series.uc_signal, Color::Magenta),
    ];
    for ((title, values, color), column) in signals.into_iter().zip(columns.iter()) {
        let width = column.width.saturating_sub(2) as usize;
        let (data, max) = sparkline_data(values, width);
        let sparkline = Sparkline::default()
            .block(Block::default().borders(Borders::ALL).title(title))
            .data(&data)
            .max(max)
            .style(Style::default().fg(color));
        f.render_widget(sparkline, *column);
    }
}

fn flag_lines(snapshot: &SessionSnapshot) -> Vec<Line<'static>> {
    if snapshot.flags().is_empty() {
        return vec![Line::from("No flags.")];
    }
    snapshot
        .flags()
        .iter()
        .map(|flag| {
            let marker = if flag.contains(snapshot.elapsed) { "●" } else { " " };
            Line::from(vec![
                Span::styled(
                    format!("{} {:<6} ", marker, flag.severity.label()),
                    Style::default().fg(severity_color(flag.severity)),
                ),
                Span::raw(format!(
                    "{}-{} {}",
                    format_time(flag.start),
                    format_time(flag.end),
                    flag.kind
                )),
            ])
        })
        .collect()
}

pub fn draw_status(terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>, view: &View) {
    let _ = terminal.draw(|f| {
        let status_height = view.status.text.lines().count() as u16 + 2;
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(3),
                Constraint::Length(4),
                Constraint::Length(status_height),
                Constraint::Min(8),
                Constraint::Length(8),
            ])
            .split(f.size());

        let title = Paragraph::new("CTG Monitor").style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        );
        f.render_widget(title, chunks[0]);

        let controls = Paragraph::new(
            "space=stream/pause  ←/→=seek 30s  0-9=jump to 0-90%  r=reset  e=export report  q=quit",
        )
        .style(Style::default().fg(Color::Blue))
        .block(Block::default().borders(Borders::ALL).title("Controls"));
        f.render_widget(controls, chunks[1]);

        draw_progress(f, chunks[2], view.snapshot);

        let status_widget = Paragraph::new(view.status.text.as_str())
            .style(
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            )
            .block(Block::default().borders(Borders::ALL).title("Monitor"));
        f.render_widget(status_widget, chunks[3]);

        draw_signals(f, chunks[4], view.snapshot);

        let bottom = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
            .split(chunks[5]);

        let flags_widget = Paragraph::new(flag_lines(view.snapshot))
            .block(Block::default().borders(Borders::ALL).title("Flags"));
        f.render_widget(flags_widget, bottom[0]);

        let log_height = bottom[1].height.saturating_sub(2) as usize;
        let start = view.log_lines.len().saturating_sub(log_height);
        let log_text = if view.log_lines.is_empty() {
            "No logs yet.".to_string()
        } else {
            view.log_lines[start..].join("\n")
        };

        let log_widget = Paragraph::new(log_text)
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::ALL).title("Logs"));
        f.render_widget(log_widget, bottom[1]);
    });
}
