//! Main dashboard layout

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs},
};

use crate::viewer::state::{AppState, Gate, Tab};

use super::{account, instances, metrics, resources};

/// Render the main dashboard UI
pub fn render(frame: &mut Frame, state: &AppState) {
    let banner_height = if state.error_message.is_some() { 3 } else { 0 };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),             // Header
            Constraint::Length(banner_height), // Error banner
            Constraint::Min(0),                // Content
            Constraint::Length(3),             // Footer
        ])
        .split(frame.area());

    render_header(frame, chunks[0], state);
    if let Some(error) = &state.error_message {
        render_error_banner(frame, chunks[1], error);
    }
    render_content(frame, chunks[2], state);
    render_footer(frame, chunks[3], state);
}

/// Render header with tabs
fn render_header(frame: &mut Frame, area: Rect, state: &AppState) {
    let titles: Vec<&str> = Tab::ALL.iter().map(|tab| tab.title()).collect();

    let mut title = String::from("Instance Deck");
    if let Some(user) = state.store.user() {
        title.push_str(&format!(" - {}", user.email));
    }
    if let Some(instance) = state.store.selected_instance() {
        title.push_str(&format!(" @ {}", instance.name));
    }

    let tabs = Tabs::new(titles)
        .block(Block::default().borders(Borders::ALL).title(title))
        .select(state.current_tab.index())
        .style(Style::default().fg(Color::White))
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );

    frame.render_widget(tabs, area);
}

/// Inline error banner, dismissed with `c`
fn render_error_banner(frame: &mut Frame, area: Rect, error: &str) {
    let banner = Paragraph::new(Line::from(vec![
        Span::styled(
            "Error: ",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ),
        Span::raw(error),
        Span::styled("  (c to dismiss)", Style::default().fg(Color::DarkGray)),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Red)),
    );

    frame.render_widget(banner, area);
}

/// Render main content area based on selected tab
fn render_content(frame: &mut Frame, area: Rect, state: &AppState) {
    match state.gate {
        Gate::Loading => {
            render_placeholder(frame, area, state.current_tab.title(), "Loading...");
            return;
        }
        Gate::Redirected => {
            render_placeholder(
                frame,
                area,
                state.current_tab.title(),
                "No instance selected",
            );
            return;
        }
        Gate::Open => {}
    }

    match state.current_tab {
        Tab::Instances => instances::render(frame, area, state),
        Tab::Metrics => metrics::render(frame, area, state),
        Tab::Backups => resources::render_backups(frame, area, state),
        Tab::Domains => resources::render_domains(frame, area, state),
        Tab::Collaborators => resources::render_collaborators(frame, area, state),
        Tab::Billing => account::render_billing(frame, area, state),
        Tab::Tickets => account::render_tickets(frame, area, state),
    }
}

/// Gray message inside a titled block
pub(super) fn render_placeholder(frame: &mut Frame, area: Rect, title: &str, message: &str) {
    let paragraph = Paragraph::new(message.to_string())
        .block(Block::default().borders(Borders::ALL).title(title.to_string()))
        .style(Style::default().fg(Color::Gray));

    frame.render_widget(paragraph, area);
}

/// Per-tab key hints
fn tab_hints(tab: Tab) -> Vec<(&'static str, &'static str)> {
    match tab {
        Tab::Instances => vec![("Select", "Enter")],
        Tab::Metrics => vec![("History", "H"), ("Pause", "Space")],
        Tab::Backups => vec![("Backup now", "B")],
        Tab::Domains => vec![("Verify", "V")],
        Tab::Tickets => vec![("Open", "Enter")],
        _ => vec![],
    }
}

/// Render footer with status and keybindings
fn render_footer(frame: &mut Frame, area: Rect, state: &AppState) {
    let mut footer_text = vec![
        Span::raw("Tab: "),
        Span::styled("←/→", Style::default().fg(Color::Yellow)),
        Span::raw(" | Items: "),
        Span::styled("↑/↓", Style::default().fg(Color::Yellow)),
    ];

    for (label, key) in tab_hints(state.current_tab) {
        footer_text.push(Span::raw(format!(" | {}: ", label)));
        footer_text.push(Span::styled(key, Style::default().fg(Color::Yellow)));
    }

    footer_text.extend([
        Span::raw(" | Refresh: "),
        Span::styled("R", Style::default().fg(Color::Yellow)),
        Span::raw(" | Quit: "),
        Span::styled("Q", Style::default().fg(Color::Yellow)),
        Span::raw(" | "),
    ]);

    // Connection status
    if state.connected {
        footer_text.push(Span::styled(
            "● Connected",
            Style::default().fg(Color::Green),
        ));
    } else {
        footer_text.push(Span::styled(
            "○ Disconnected",
            Style::default().fg(Color::Red),
        ));
    }

    // Paused indicator
    if state.paused {
        footer_text.push(Span::raw(" | "));
        footer_text.push(Span::styled(
            "⏸ PAUSED",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ));
    }

    if let Some(status) = &state.status_message {
        footer_text.push(Span::raw(" | "));
        footer_text.push(Span::styled(
            status.as_str(),
            Style::default().fg(Color::Cyan),
        ));
    }

    let footer =
        Paragraph::new(Line::from(footer_text)).block(Block::default().borders(Borders::ALL));

    frame.render_widget(footer, area);
}
