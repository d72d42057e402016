//! Derived views. Each view is rebuilt wholesale from one snapshot and
//! remembers which snapshot it came from.

pub mod chart;
pub mod leaderboard;
pub mod trade_feed;

pub use chart::{ChartState, Series};
pub use leaderboard::{LeaderboardRow, LeaderboardView};
pub use trade_feed::{TradeFeedView, TradeLine, TRADE_FEED_LIMIT};

/// Sign colouring used by the leaderboard: non-negative is a gain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Gain,
    Loss,
}

impl Tone {
    pub fn of(value: f64) -> Self {
        if value >= 0.0 {
            Tone::Gain
        } else {
            Tone::Loss
        }
    }
}

/// `$1234.50`, `-$12.00`
pub fn format_usd(value: f64) -> String {
    if value < 0.0 {
        format!("-${:.2}", -value)
    } else {
        format!("${:.2}", value)
    }
}

/// `+20.00%`, `-10.00%`
pub fn format_signed_pct(pct: f64) -> String {
    if pct >= 0.0 {
        format!("+{:.2}%", pct)
    } else {
        format!("{:.2}%", pct)
    }
}
