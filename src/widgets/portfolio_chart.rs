//! Portfolio value chart, one line per agent.
//!
//! Draws whatever the chart owner currently holds. Before the first
//! snapshot with history arrives there is nothing to plot and only the
//! frame is drawn.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    symbols::Marker,
    text::Line,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph, Widget},
};

use super::agent_color;
use crate::views::ChartState;

const TITLE: &str = "Portfolio Value";

pub struct PortfolioChart<'a> {
    chart: &'a ChartState,
}

impl<'a> PortfolioChart<'a> {
    pub fn new(chart: &'a ChartState) -> Self {
        Self { chart }
    }
}

/// Y bounds with 10% padding, never narrower than 1% of the midpoint.
fn y_bounds(lo: f64, hi: f64) -> (f64, f64) {
    let mid = (lo + hi) / 2.0;
    let min_range = (mid.abs() * 0.01).max(1.0);
    let range = hi - lo;
    if range < min_range {
        (mid - min_range / 2.0, mid + min_range / 2.0)
    } else {
        (lo - range * 0.1, hi + range * 0.1)
    }
}

/// First, middle and last axis labels.
fn x_labels(labels: &[String]) -> Vec<Line<'static>> {
    match labels.len() {
        0 => vec![],
        1 => vec![Line::from(labels[0].clone())],
        2 => vec![Line::from(labels[0].clone()), Line::from(labels[1].clone())],
        n => vec![
            Line::from(labels[0].clone()),
            Line::from(labels[(n - 1) / 2].clone()),
            Line::from(labels[n - 1].clone()),
        ],
    }
}

impl Widget for PortfolioChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let Some((lo, hi)) = self.chart.value_range() else {
            Paragraph::new("Waiting for history...")
                .style(Style::default().fg(Color::DarkGray))
                .block(
                    Block::default()
                        .title(TITLE)
                        .borders(Borders::ALL)
                        .border_style(Style::default().fg(Color::DarkGray)),
                )
                .render(area, buf);
            return;
        };
        let (y_min, y_max) = y_bounds(lo, hi);
        let x_max = self.chart.axis().len().saturating_sub(1) as f64;

        let data_vecs: Vec<Vec<(f64, f64)>> =
            self.chart.series().iter().map(|s| s.plotted()).collect();
        let datasets: Vec<Dataset> = self
            .chart
            .series()
            .iter()
            .zip(data_vecs.iter())
            .map(|(series, data)| {
                Dataset::default()
                    .name(series.name.clone())
                    .marker(Marker::Braille)
                    .graph_type(GraphType::Line)
                    .style(Style::default().fg(agent_color(&series.color)))
                    .data(data)
            })
            .collect();

        let y_labels: Vec<Line> = vec![
            Line::from(format!("{:.0}", y_min)),
            Line::from(format!("{:.0}", (y_min + y_max) / 2.0)),
            Line::from(format!("{:.0}", y_max)),
        ];

        let chart = Chart::new(datasets)
            .block(
                Block::default()
                    .title(TITLE)
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::White)),
            )
            .x_axis(
                Axis::default()
                    .style(Style::default().fg(Color::Gray))
                    .bounds([0.0, x_max.max(1.0)])
                    .labels(x_labels(self.chart.labels())),
            )
            .y_axis(
                Axis::default()
                    .title("USD")
                    .style(Style::default().fg(Color::Gray))
                    .bounds([y_min, y_max])
                    .labels(y_labels),
            );

        chart.render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::{HistoryPoint, Roster, SnapshotId, Stamp};
    use crate::widgets::buffer_lines;

    #[test]
    fn test_unmounted_chart_draws_placeholder() {
        let chart = ChartState::new();
        let area = Rect::new(0, 0, 40, 8);
        let mut buf = Buffer::empty(area);
        PortfolioChart::new(&chart).render(area, &mut buf);
        let text = buffer_lines(&buf).join("\n");
        assert!(text.contains("Portfolio Value"));
        assert!(text.contains("Waiting for history"));
    }

    #[test]
    fn test_chart_with_series_renders_axis_labels() {
        let history: Roster<Vec<HistoryPoint>> = vec![(
            "Pro",
            vec![
                HistoryPoint {
                    date: Stamp::parse("2024-03-01T10:00:00").unwrap(),
                    value: 10_000.0,
                },
                HistoryPoint {
                    date: Stamp::parse("2024-03-02T10:00:00").unwrap(),
                    value: 10_400.0,
                },
            ],
        )]
        .into_iter()
        .collect();
        let mut chart = ChartState::new();
        chart.render(&history, &Roster::new(), &SnapshotId::of(b"1"));

        let area = Rect::new(0, 0, 80, 20);
        let mut buf = Buffer::empty(area);
        PortfolioChart::new(&chart).render(area, &mut buf);
        let text = buffer_lines(&buf).join("\n");
        assert!(text.contains("2024-03-01"));
        assert!(text.contains("2024-03-02"));
        assert!(!text.contains("Waiting for history"));
    }

    #[test]
    fn test_flat_series_still_gets_a_range() {
        let (lo, hi) = y_bounds(10_000.0, 10_000.0);
        assert!(lo < 10_000.0 && hi > 10_000.0);
        assert_eq!(x_labels(&[]).len(), 0);
        assert_eq!(x_labels(&["a", "b", "c", "d"].map(String::from)).len(), 3);
    }
}
