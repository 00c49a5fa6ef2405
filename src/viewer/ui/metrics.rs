//! Metrics tab UI

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use crate::sampler::LivePoint;
use crate::util::format_rate;
use crate::viewer::state::{AppState, MetricsSource};

use super::layout::render_placeholder;
use super::widgets::{Series, render_line_chart};

/// Render metrics tab
pub fn render(frame: &mut Frame, area: Rect, state: &AppState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Summary
            Constraint::Min(0),    // Charts
        ])
        .split(area);

    render_summary(frame, chunks[0], state);

    let points = state.chart_points();
    if points.is_empty() {
        let message = match state.metrics_source {
            MetricsSource::Live => "Waiting for first sample...",
            MetricsSource::History(_) => "No history for this range",
        };
        render_placeholder(frame, chunks[1], "Metrics", message);
        return;
    }

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[1]);
    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[0]);
    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[1]);

    let series = |f: fn(&LivePoint) -> f64| -> Vec<(f64, f64)> {
        points
            .iter()
            .enumerate()
            .map(|(i, point)| (i as f64, f(point)))
            .collect()
    };

    render_line_chart(
        frame,
        top[0],
        "CPU Usage (%)",
        &[Series {
            name: "CPU %",
            color: Color::Cyan,
            data: series(|p| p.cpu_percent),
        }],
        100.0,
        |v| format!("{:.0}", v),
    );

    render_line_chart(
        frame,
        top[1],
        "Memory (MiB)",
        &[Series {
            name: "MiB",
            color: Color::Magenta,
            data: series(|p| p.memory_mib),
        }],
        64.0,
        |v| format!("{:.0}", v),
    );

    render_line_chart(
        frame,
        bottom[0],
        "Disk I/O",
        &[
            Series {
                name: "read",
                color: Color::Green,
                data: series(|p| p.disk_read_rate),
            },
            Series {
                name: "write",
                color: Color::Yellow,
                data: series(|p| p.disk_write_rate),
            },
        ],
        1024.0,
        format_rate,
    );

    render_line_chart(
        frame,
        bottom[1],
        "Network",
        &[
            Series {
                name: "rx",
                color: Color::Blue,
                data: series(|p| p.net_rx_rate),
            },
            Series {
                name: "tx",
                color: Color::Red,
                data: series(|p| p.net_tx_rate),
            },
        ],
        1024.0,
        format_rate,
    );
}

/// One-line summary of the latest point
fn render_summary(frame: &mut Frame, area: Rect, state: &AppState) {
    let label = Style::default().fg(Color::Cyan);

    let source = match state.metrics_source {
        MetricsSource::Live => format!("Live ({} / {})", state.live.len(), state.live.capacity()),
        MetricsSource::History(range) => format!("History ({})", range),
    };

    let mut spans = vec![Span::styled("Source: ", label), Span::raw(source)];

    if let Some(latest) = state.chart_points().last() {
        spans.extend([
            Span::styled("  CPU: ", label),
            Span::raw(format!("{:.1}%", latest.cpu_percent)),
            Span::styled("  Mem: ", label),
            Span::raw(format!("{:.0} MiB", latest.memory_mib)),
            Span::styled("  Disk: ", label),
            Span::raw(format_rate(latest.disk_rate())),
            Span::styled("  Net: ", label),
            Span::raw(format_rate(latest.net_rate())),
        ]);
    }

    if let Some(updated) = state.last_update {
        spans.push(Span::styled(
            format!("  (updated {})", updated.format("%H:%M:%S")),
            Style::default().fg(Color::DarkGray),
        ));
    }

    let title = state
        .store
        .selected_instance()
        .map(|i| format!("Metrics: {}", i.name))
        .unwrap_or_else(|| "Metrics".to_string());

    let summary = Paragraph::new(Line::from(spans))
        .block(Block::default().borders(Borders::ALL).title(title));

    frame.render_widget(summary, area);
}
