//! Backups, domains and collaborators of the selected instance

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    prelude::Stylize,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Row, Table},
};

use crate::api::types::{BackupStatus, DomainStatus, Permission};
use crate::util::{format_bytes, format_timestamp};
use crate::viewer::state::AppState;

use super::layout::render_placeholder;

fn header(columns: Vec<&'static str>) -> Row<'static> {
    Row::new(columns)
        .style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
        .bottom_margin(1)
}

fn row_style(selected: bool) -> Style {
    if selected {
        Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    }
}

/// Render backups tab
pub fn render_backups(frame: &mut Frame, area: Rect, state: &AppState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),    // Backup list
            Constraint::Length(6), // Schedule
        ])
        .split(area);

    if state.store.backups.is_empty() {
        render_placeholder(frame, chunks[0], "Backups", "No backups yet (B to create one)");
    } else {
        let rows: Vec<Row> = state
            .store
            .backups
            .iter()
            .enumerate()
            .map(|(i, backup)| {
                let color = match backup.status {
                    BackupStatus::Completed => Color::Green,
                    BackupStatus::Pending | BackupStatus::Running => Color::Yellow,
                    BackupStatus::Failed => Color::Red,
                    BackupStatus::Unknown => Color::Gray,
                };

                Row::new(vec![
                    format!("● {}", backup.status),
                    backup.id.clone(),
                    backup.kind.clone().unwrap_or_else(|| "-".to_string()),
                    backup
                        .size_bytes
                        .map(|size| format_bytes(size as f64))
                        .unwrap_or_else(|| "-".to_string()),
                    format_timestamp(backup.created_at.as_ref()),
                ])
                .style(row_style(i == state.selected_row))
                .fg(color)
            })
            .collect();

        let table = Table::new(
            rows,
            [
                Constraint::Length(14),
                Constraint::Percentage(30),
                Constraint::Length(10),
                Constraint::Length(12),
                Constraint::Percentage(30),
            ],
        )
        .header(header(vec!["Status", "ID", "Kind", "Size", "Created"]))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Backups ({})", state.store.backups.len())),
        );

        frame.render_widget(table, chunks[0]);
    }

    render_schedule(frame, chunks[1], state);
}

fn render_schedule(frame: &mut Frame, area: Rect, state: &AppState) {
    let Some(schedule) = &state.store.backup_configuration else {
        render_placeholder(frame, area, "Schedule", "No schedule loaded");
        return;
    };

    let label = Style::default().fg(Color::Cyan);
    let (enabled, color) = if schedule.enabled {
        ("enabled", Color::Green)
    } else {
        ("disabled", Color::Gray)
    };

    let lines = vec![
        Line::from(vec![
            Span::styled("Automatic backups: ", label),
            Span::styled(enabled, Style::default().fg(color)),
        ]),
        Line::from(vec![
            Span::styled("Frequency: ", label),
            Span::raw(schedule.frequency.to_string()),
            Span::raw(
                schedule
                    .time_of_day
                    .as_ref()
                    .map(|time| format!(" at {} UTC", time))
                    .unwrap_or_default(),
            ),
        ]),
        Line::from(vec![
            Span::styled("Retention: ", label),
            Span::raw(format!("{} days", schedule.retention_days)),
        ]),
    ];

    let paragraph =
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Schedule"));

    frame.render_widget(paragraph, area);
}

/// Render domains tab
pub fn render_domains(frame: &mut Frame, area: Rect, state: &AppState) {
    if state.store.domains.is_empty() {
        render_placeholder(frame, area, "Domains", "No custom domains (add one with deckctl)");
        return;
    }

    let rows: Vec<Row> = state
        .store
        .domains
        .iter()
        .enumerate()
        .map(|(i, domain)| {
            let color = match domain.status {
                DomainStatus::Verified => Color::Green,
                DomainStatus::Pending => Color::Yellow,
                DomainStatus::Failed => Color::Red,
                DomainStatus::Unknown => Color::Gray,
            };

            Row::new(vec![
                format!("● {}", domain.status),
                domain.name.clone(),
                if domain.is_primary { "yes" } else { "" }.to_string(),
                domain.dns_target.clone().unwrap_or_else(|| "-".to_string()),
            ])
            .style(row_style(i == state.selected_row))
            .fg(color)
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(14),
            Constraint::Percentage(40),
            Constraint::Length(8),
            Constraint::Percentage(40),
        ],
    )
    .header(header(vec!["Status", "Domain", "Primary", "CNAME target"]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!("Domains ({})", state.store.domains.len())),
    );

    frame.render_widget(table, area);
}

/// Render collaborators tab
pub fn render_collaborators(frame: &mut Frame, area: Rect, state: &AppState) {
    if state.store.collaborators.is_empty() {
        render_placeholder(frame, area, "Collaborators", "No collaborators");
        return;
    }

    let rows: Vec<Row> = state
        .store
        .collaborators
        .iter()
        .enumerate()
        .map(|(i, collaborator)| {
            let color = match collaborator.permission {
                Permission::Admin => Color::Red,
                Permission::Write => Color::Yellow,
                Permission::Read => Color::White,
            };

            Row::new(vec![
                collaborator.username.clone(),
                collaborator.email.clone().unwrap_or_else(|| "-".to_string()),
                collaborator.permission.to_string(),
                format_timestamp(collaborator.added_at.as_ref()),
            ])
            .style(row_style(i == state.selected_row))
            .fg(color)
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Percentage(25),
            Constraint::Percentage(35),
            Constraint::Length(10),
            Constraint::Percentage(25),
        ],
    )
    .header(header(vec!["Username", "Email", "Access", "Added"]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!("Git Collaborators ({})", state.store.collaborators.len())),
    );

    frame.render_widget(table, area);
}
