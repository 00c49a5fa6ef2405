//! Instances tab UI

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
};

use crate::api::types::{Instance, InstanceStatus};
use crate::util::format_timestamp;
use crate::viewer::state::AppState;

use super::layout::render_placeholder;

pub(super) fn status_color(status: InstanceStatus) -> Color {
    match status {
        InstanceStatus::Running => Color::Green,
        InstanceStatus::Pending => Color::Yellow,
        InstanceStatus::Stopped => Color::Gray,
        InstanceStatus::Deleting => Color::Magenta,
        InstanceStatus::Failed => Color::Red,
        InstanceStatus::Unknown => Color::DarkGray,
    }
}

/// Render instances tab
pub fn render(frame: &mut Frame, area: Rect, state: &AppState) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(35), // Instance list
            Constraint::Percentage(65), // Details
        ])
        .split(area);

    render_instance_list(frame, chunks[0], state);

    match state.store.instances.get(state.selected_row) {
        Some(instance) => render_instance_info(frame, chunks[1], instance, state),
        None => render_placeholder(frame, chunks[1], "Instance", "No instances yet"),
    }
}

/// Render instance list on the left
fn render_instance_list(frame: &mut Frame, area: Rect, state: &AppState) {
    let selected_id = state.store.selected_instance().map(|i| i.id.as_str());

    let items: Vec<ListItem> = state
        .store
        .instances
        .iter()
        .enumerate()
        .map(|(i, instance)| {
            let color = status_color(instance.status);
            let marker = if Some(instance.id.as_str()) == selected_id {
                "▶ "
            } else {
                "  "
            };

            let content = Line::from(vec![
                Span::styled(marker, Style::default().fg(Color::Yellow)),
                Span::styled("● ", Style::default().fg(color)),
                Span::raw(&instance.name),
                Span::raw(" "),
                Span::styled(format!("[{}]", instance.status), Style::default().fg(color)),
            ]);

            let mut style = Style::default();
            if i == state.selected_row {
                style = style.bg(Color::DarkGray).add_modifier(Modifier::BOLD);
            }

            ListItem::new(content).style(style)
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!("Instances ({})", state.store.instances.len())),
    );

    frame.render_widget(list, area);
}

/// Render instance info panel
fn render_instance_info(frame: &mut Frame, area: Rect, instance: &Instance, state: &AppState) {
    let label = Style::default().fg(Color::Cyan);

    let mut lines = vec![
        Line::from(vec![
            Span::styled("Name: ", label),
            Span::raw(&instance.name),
        ]),
        Line::from(vec![Span::styled("ID: ", label), Span::raw(&instance.id)]),
        Line::from(vec![
            Span::styled("Status: ", label),
            Span::styled(
                instance.status.to_string(),
                Style::default().fg(status_color(instance.status)),
            ),
        ]),
        Line::from(vec![
            Span::styled("Version: ", label),
            Span::raw(instance.version.as_deref().unwrap_or("-")),
        ]),
        Line::from(vec![
            Span::styled("Created: ", label),
            Span::raw(format_timestamp(instance.created_at.as_ref())),
        ]),
    ];

    if let Some(url) = &instance.url {
        lines.push(Line::from(vec![Span::styled("URL: ", label), Span::raw(url)]));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("CPU: ", label),
        Span::raw(format!("{:.1}%", instance.usage.cpu_percent)),
    ]));
    lines.push(Line::from(vec![
        Span::styled("Memory: ", label),
        Span::raw(format!("{:.0} MiB", instance.usage.memory_mib)),
    ]));
    if let Some(disk) = instance.usage.disk_gib {
        lines.push(Line::from(vec![
            Span::styled("Disk: ", label),
            Span::raw(format!("{:.1} GiB", disk)),
        ]));
    }

    let selected = state
        .store
        .selected_instance()
        .is_some_and(|selected| selected.id == instance.id);
    if selected {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Selected for Metrics, Backups, Domains and Collaborators",
            Style::default().fg(Color::Yellow),
        )));
    }

    let info =
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Instance"));

    frame.render_widget(info, area);
}
