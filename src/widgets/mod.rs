//! Terminal widgets. Each one reads a view and draws it; none of them
//! mutate dashboard state.
//!
//! - `LeaderboardTable`: ranked agent table
//! - `PortfolioChart`: portfolio value over time, one line per agent
//! - `TradeFeedList`: newest trades first
//! - `StatusBar`: trigger control, last notice, fetch health

mod leaderboard_table;
mod portfolio_chart;
mod status_bar;
mod trade_feed_list;

pub use leaderboard_table::LeaderboardTable;
pub use portfolio_chart::PortfolioChart;
pub use status_bar::StatusBar;
pub use trade_feed_list::TradeFeedList;

use ratatui::style::Color;

use crate::views::Tone;

/// Parse a CSS-ish colour from the backend: `#rrggbb`, `#rgb`, or a name.
pub fn parse_color(raw: &str) -> Option<Color> {
    let raw = raw.trim();
    if let Some(hex) = raw.strip_prefix('#') {
        if hex.len() == 3 {
            let expanded: String = hex.chars().flat_map(|c| [c, c]).collect();
            return format!("#{}", expanded).parse().ok();
        }
    }
    raw.parse().ok()
}

pub fn agent_color(raw: &str) -> Color {
    parse_color(raw).unwrap_or(Color::Gray)
}

pub fn tone_color(tone: Tone) -> Color {
    match tone {
        Tone::Gain => Color::Green,
        Tone::Loss => Color::Red,
    }
}

#[cfg(test)]
pub(crate) fn buffer_lines(buf: &ratatui::buffer::Buffer) -> Vec<String> {
    let width = buf.area.width as usize;
    buf.content
        .chunks(width)
        .map(|row| row.iter().map(|cell| cell.symbol()).collect())
        .collect()
}
