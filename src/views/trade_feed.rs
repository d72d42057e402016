//! Most-recent-first tail of the trade log.

use super::format_usd;
use crate::snapshot::{SnapshotId, Trade, TradeAction};

pub const TRADE_FEED_LIMIT: usize = 20;

#[derive(Debug, Clone, PartialEq)]
pub struct TradeLine {
    pub agent: String,
    pub action: TradeAction,
    pub shares: f64,
    pub symbol: String,
    pub price: f64,
    pub total: Option<f64>,
    /// Local time of day, `HH:MM:SS`.
    pub time: String,
}

impl TradeLine {
    fn from_trade(trade: &Trade) -> Self {
        Self {
            agent: trade.agent.clone(),
            action: trade.action,
            shares: trade.shares,
            symbol: trade.symbol.clone(),
            price: trade.price,
            total: trade.total,
            time: trade.date.time_of_day(),
        }
    }

    /// `10 AAPL @ $181.25`, with ` = $1812.50` appended when the trade
    /// carries its total.
    pub fn detail(&self) -> String {
        let base = format!("{} {} @ ${:.2}", self.shares, self.symbol, self.price);
        match self.total {
            Some(total) => format!("{} = {}", base, format_usd(total)),
            None => base,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TradeFeedView {
    lines: Vec<TradeLine>,
    source: Option<SnapshotId>,
}

impl TradeFeedView {
    /// `trades` is oldest-first; the feed shows the newest
    /// [`TRADE_FEED_LIMIT`] of them, newest first.
    pub fn render(&mut self, trades: &[Trade], source: &SnapshotId) {
        self.lines.clear();
        self.lines.extend(
            trades
                .iter()
                .rev()
                .take(TRADE_FEED_LIMIT)
                .map(TradeLine::from_trade),
        );
        self.source = Some(source.clone());
    }

    pub fn lines(&self) -> &[TradeLine] {
        &self.lines
    }

    pub fn source(&self) -> Option<&SnapshotId> {
        self.source.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::Stamp;

    fn trade(i: usize) -> Trade {
        Trade {
            agent: format!("agent-{}", i),
            action: if i % 2 == 0 { TradeAction::Buy } else { TradeAction::Sell },
            shares: 10.0,
            symbol: "AAPL".to_string(),
            price: 181.25,
            date: Stamp::parse(&format!("2024-03-01T10:{:02}:00", i)).unwrap(),
            total: None,
        }
    }

    #[test]
    fn test_feed_is_capped_and_newest_first() {
        let trades: Vec<Trade> = (0..25).map(trade).collect();
        let mut feed = TradeFeedView::default();
        feed.render(&trades, &SnapshotId::of(b"1"));
        assert_eq!(feed.lines().len(), 20);
        assert_eq!(feed.lines()[0].agent, "agent-24");
        assert_eq!(feed.lines()[19].agent, "agent-5");
        assert_eq!(feed.lines()[0].time, "10:24:00");
    }

    #[test]
    fn test_two_trades_reverse() {
        let trades = vec![trade(1), trade(2)];
        let mut feed = TradeFeedView::default();
        feed.render(&trades, &SnapshotId::of(b"1"));
        let agents: Vec<&str> = feed.lines().iter().map(|l| l.agent.as_str()).collect();
        assert_eq!(agents, vec!["agent-2", "agent-1"]);
    }

    #[test]
    fn test_render_clears_previous_lines() {
        let mut feed = TradeFeedView::default();
        feed.render(&[trade(1), trade(2), trade(3)], &SnapshotId::of(b"1"));
        feed.render(&[], &SnapshotId::of(b"2"));
        assert!(feed.lines().is_empty());
        assert_eq!(feed.source(), Some(&SnapshotId::of(b"2")));
    }

    #[test]
    fn test_detail_shows_total_when_present() {
        let mut with_total = trade(0);
        with_total.total = Some(1812.5);
        let mut feed = TradeFeedView::default();
        feed.render(&[with_total], &SnapshotId::of(b"1"));
        assert_eq!(feed.lines()[0].total, Some(1812.5));
        assert_eq!(feed.lines()[0].detail(), "10 AAPL @ $181.25 = $1812.50");
    }

    #[test]
    fn test_detail_line() {
        let mut feed = TradeFeedView::default();
        feed.render(&[trade(0)], &SnapshotId::of(b"1"));
        assert_eq!(feed.lines()[0].detail(), "10 AAPL @ $181.25");
        assert_eq!(feed.lines()[0].action, TradeAction::Buy);
    }
}
