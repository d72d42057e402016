//! Ranked agent table.

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Cell, Row, Table, Widget},
};

use super::{agent_color, tone_color};
use crate::views::LeaderboardRow;

pub struct LeaderboardTable<'a> {
    rows: &'a [LeaderboardRow],
}

impl<'a> LeaderboardTable<'a> {
    pub fn new(rows: &'a [LeaderboardRow]) -> Self {
        Self { rows }
    }
}

impl Widget for LeaderboardTable<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let header_cells = ["Rank", "Agent", "Value", "Return", "Revenue", "Cash", "Pos", "Strategy"]
            .iter()
            .map(|h| Cell::from(*h).style(Style::default().add_modifier(Modifier::BOLD)));
        let header = Row::new(header_cells)
            .style(Style::default().fg(Color::Yellow))
            .height(1);

        let rows = self.rows.iter().map(|row| {
            let name_style = Style::default()
                .fg(agent_color(&row.color))
                .add_modifier(Modifier::BOLD);
            Row::new(vec![
                Cell::from(row.rank_display()),
                Cell::from(row.name.clone()).style(name_style),
                Cell::from(row.value_display()),
                Cell::from(row.return_display()).style(Style::default().fg(tone_color(row.return_tone()))),
                Cell::from(row.revenue_display()).style(Style::default().fg(tone_color(row.revenue_tone()))),
                Cell::from(row.cash_display()),
                Cell::from(format!("{:>3}", row.open_positions)),
                Cell::from(row.description.clone()).style(Style::default().fg(Color::DarkGray)),
            ])
        });

        let table = Table::new(
            rows,
            [
                Constraint::Length(5),  // Rank
                Constraint::Min(12),    // Agent
                Constraint::Length(12), // Value
                Constraint::Length(9),  // Return
                Constraint::Length(11), // Revenue
                Constraint::Length(12), // Cash
                Constraint::Length(4),  // Positions
                Constraint::Fill(1),    // Strategy
            ],
        )
        .header(header)
        .block(
            Block::default()
                .title("Leaderboard")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::White)),
        );

        Widget::render(table, area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::{Agent, Roster, SnapshotId};
    use crate::views::LeaderboardView;
    use crate::widgets::buffer_lines;

    fn agent(value: f64, color: &str) -> Agent {
        Agent {
            portfolio_value: value,
            cash: 500.0,
            revenue: Some(value - 10_000.0),
            color: color.to_string(),
            description: "momentum".to_string(),
            holdings: Default::default(),
        }
    }

    #[test]
    fn test_leaderboard_table_empty() {
        let widget = LeaderboardTable::new(&[]);
        let area = Rect::new(0, 0, 80, 6);
        let mut buf = Buffer::empty(area);
        widget.render(area, &mut buf);
        assert!(buffer_lines(&buf)[0].contains("Leaderboard"));
    }

    #[test]
    fn test_leaderboard_table_shows_ranked_rows() {
        let agents: Roster<Agent> = vec![("Basic", agent(9_000.0, "#3498db")), ("Pro", agent(12_000.0, "#2ecc71"))]
            .into_iter()
            .collect();
        let mut view = LeaderboardView::default();
        view.render(&agents, &SnapshotId::of(b"1"));

        let area = Rect::new(0, 0, 100, 6);
        let mut buf = Buffer::empty(area);
        LeaderboardTable::new(view.rows()).render(area, &mut buf);
        let lines = buffer_lines(&buf);

        assert!(lines[2].contains("#1") && lines[2].contains("Pro") && lines[2].contains("+20.00%"));
        assert!(lines[3].contains("#2") && lines[3].contains("Basic") && lines[3].contains("-10.00%"));
        let byte = lines[2].find("Pro").unwrap();
        let pro_col = lines[2][..byte].chars().count() as u16;
        assert_eq!(buf[(pro_col, 2)].fg, Color::Rgb(0x2e, 0xcc, 0x71));
    }
}
