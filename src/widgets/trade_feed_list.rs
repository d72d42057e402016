//! Recent trades, newest first.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Widget},
};

use crate::snapshot::TradeAction;
use crate::views::TradeLine;

pub struct TradeFeedList<'a> {
    lines: &'a [TradeLine],
}

impl<'a> TradeFeedList<'a> {
    pub fn new(lines: &'a [TradeLine]) -> Self {
        Self { lines }
    }
}

fn action_style(action: TradeAction) -> Style {
    let color = match action {
        TradeAction::Buy => Color::Green,
        TradeAction::Sell => Color::Red,
    };
    Style::default().fg(color).add_modifier(Modifier::BOLD)
}

impl Widget for TradeFeedList<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let items: Vec<ListItem> = self
            .lines
            .iter()
            .map(|line| {
                ListItem::new(Line::from(vec![
                    Span::styled(format!("{} ", line.time), Style::default().fg(Color::DarkGray)),
                    Span::styled(format!("{:<4} ", line.action.as_str()), action_style(line.action)),
                    Span::styled(format!("{} ", line.agent), Style::default().fg(Color::White)),
                    Span::raw(line.detail()),
                ]))
            })
            .collect();

        let title = if self.lines.is_empty() {
            "Recent Trades (none yet)".to_string()
        } else {
            format!("Recent Trades ({})", self.lines.len())
        };

        List::new(items)
            .block(
                Block::default()
                    .title(title)
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::White)),
            )
            .render(area, buf);
    }
}
