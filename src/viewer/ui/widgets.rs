//! Reusable UI widgets

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Style},
    symbols,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
};

/// One line of a chart
pub struct Series<'a> {
    pub name: &'a str,
    pub color: Color,
    pub data: Vec<(f64, f64)>,
}

/// Render a line chart over point indices.
///
/// `floor` is the minimum upper bound of the y axis (100 for percentages);
/// `label` formats axis values.
pub fn render_line_chart(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    series: &[Series],
    floor: f64,
    label: impl Fn(f64) -> String,
) {
    // Calculate bounds
    let y_max = series
        .iter()
        .flat_map(|s| s.data.iter().map(|(_, y)| *y))
        .fold(0.0, f64::max)
        .max(floor);

    let x_max = series
        .iter()
        .map(|s| s.data.len())
        .max()
        .unwrap_or(0)
        .max(10) as f64;

    let datasets: Vec<Dataset> = series
        .iter()
        .map(|s| {
            Dataset::default()
                .name(s.name)
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(s.color))
                .data(&s.data)
        })
        .collect();

    let chart = Chart::new(datasets)
        .block(Block::default().borders(Borders::ALL).title(title.to_string()))
        .x_axis(
            Axis::default()
                .style(Style::default().fg(Color::Gray))
                .bounds([0.0, x_max]),
        )
        .y_axis(
            Axis::default()
                .style(Style::default().fg(Color::Gray))
                .labels(vec![label(0.0), label(y_max / 2.0), label(y_max)])
                .bounds([0.0, y_max]),
        );

    frame.render_widget(chart, area);
}
