//! Billing and support tabs

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    prelude::Stylize,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Row, Table, Wrap},
};

use crate::api::types::{SubscriptionStatus, TicketStatus};
use crate::util::format_timestamp;
use crate::viewer::state::AppState;

use super::layout::render_placeholder;

/// Render billing tab
pub fn render_billing(frame: &mut Frame, area: Rect, state: &AppState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(50), // Subscriptions
            Constraint::Percentage(50), // Plans
        ])
        .split(area);

    render_subscriptions(frame, chunks[0], state);
    render_plans(frame, chunks[1], state);
}

fn render_subscriptions(frame: &mut Frame, area: Rect, state: &AppState) {
    if state.store.subscriptions.is_empty() {
        render_placeholder(frame, area, "Subscriptions", "No active subscriptions");
        return;
    }

    let rows: Vec<Row> = state
        .store
        .subscriptions
        .iter()
        .enumerate()
        .map(|(i, subscription)| {
            let color = match subscription.status {
                SubscriptionStatus::Active => Color::Green,
                SubscriptionStatus::Trialing => Color::Cyan,
                SubscriptionStatus::PastDue => Color::Red,
                SubscriptionStatus::Canceled | SubscriptionStatus::Unknown => Color::Gray,
            };

            // Plan name falls back to the catalogue, then to the raw id
            let plan = subscription.plan_name.clone().unwrap_or_else(|| {
                state
                    .store
                    .plans
                    .iter()
                    .find(|plan| plan.id == subscription.plan_id)
                    .map(|plan| plan.name.clone())
                    .unwrap_or_else(|| subscription.plan_id.clone())
            });

            let instance = subscription
                .instance_id
                .as_ref()
                .and_then(|id| state.store.instances.iter().find(|i| &i.id == id))
                .map(|instance| instance.name.clone())
                .or_else(|| subscription.instance_id.clone())
                .unwrap_or_else(|| "-".to_string());

            let mut style = Style::default();
            if i == state.selected_row {
                style = style.bg(Color::DarkGray).add_modifier(Modifier::BOLD);
            }

            Row::new(vec![
                format!("● {}", subscription.status),
                plan,
                instance,
                format_timestamp(subscription.current_period_end.as_ref()),
            ])
            .style(style)
            .fg(color)
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(14),
            Constraint::Percentage(30),
            Constraint::Percentage(30),
            Constraint::Percentage(25),
        ],
    )
    .header(
        Row::new(vec!["Status", "Plan", "Instance", "Renews"])
            .style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
            .bottom_margin(1),
    )
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!("Subscriptions ({})", state.store.subscriptions.len())),
    );

    frame.render_widget(table, area);
}

fn render_plans(frame: &mut Frame, area: Rect, state: &AppState) {
    if state.store.plans.is_empty() {
        render_placeholder(frame, area, "Plans", "No plans available");
        return;
    }

    let items: Vec<ListItem> = state
        .store
        .plans
        .iter()
        .map(|plan| {
            let mut spans = vec![
                Span::styled(
                    format!("{:<16}", plan.name),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::styled(plan.price_label(), Style::default().fg(Color::Green)),
            ];
            if !plan.features.is_empty() {
                spans.push(Span::styled(
                    format!("  {}", plan.features.join(", ")),
                    Style::default().fg(Color::Gray),
                ));
            }
            ListItem::new(Line::from(spans))
        })
        .collect();

    let list = List::new(items).block(Block::default().borders(Borders::ALL).title("Plans"));

    frame.render_widget(list, area);
}

fn ticket_color(status: TicketStatus) -> Color {
    match status {
        TicketStatus::Open => Color::Green,
        TicketStatus::Pending => Color::Yellow,
        TicketStatus::Closed => Color::Gray,
        TicketStatus::Unknown => Color::DarkGray,
    }
}

/// Render tickets tab
pub fn render_tickets(frame: &mut Frame, area: Rect, state: &AppState) {
    if state.store.tickets.is_empty() {
        render_placeholder(frame, area, "Help Tickets", "No tickets");
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(40), // Ticket list
            Constraint::Percentage(60), // Conversation
        ])
        .split(area);

    let items: Vec<ListItem> = state
        .store
        .tickets
        .iter()
        .enumerate()
        .map(|(i, ticket)| {
            let content = Line::from(vec![
                Span::styled("● ", Style::default().fg(ticket_color(ticket.status))),
                Span::raw(&ticket.subject),
                Span::styled(
                    format!(" [{}]", ticket.status),
                    Style::default().fg(Color::DarkGray),
                ),
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
            .title(format!("Help Tickets ({})", state.store.tickets.len())),
    );
    frame.render_widget(list, chunks[0]);

    let Some(ticket) = state.store.tickets.get(state.selected_row) else {
        return;
    };

    if ticket.messages.is_empty() {
        render_placeholder(
            frame,
            chunks[1],
            &ticket.subject,
            "Press Enter to load the conversation",
        );
        return;
    }

    let mut lines = Vec::new();
    for message in &ticket.messages {
        lines.push(Line::from(vec![
            Span::styled(
                message.author.clone(),
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("  {}", format_timestamp(message.created_at.as_ref())),
                Style::default().fg(Color::DarkGray),
            ),
        ]));
        lines.push(Line::from(message.body.clone()));
        lines.push(Line::from(""));
    }

    let conversation = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(ticket.subject.clone()),
        );

    frame.render_widget(conversation, chunks[1]);
}
