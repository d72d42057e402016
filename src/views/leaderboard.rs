//! Ranked leaderboard rows.

use crate::snapshot::{Agent, Roster, SnapshotId, BASELINE_VALUE};
use crate::views::{format_signed_pct, format_usd, Tone};

#[derive(Debug, Clone, PartialEq)]
pub struct LeaderboardRow {
    /// 1-based
    pub rank: usize,
    pub name: String,
    pub color: String,
    pub description: String,
    pub portfolio_value: f64,
    pub return_pct: f64,
    /// 0 when the backend did not report revenue.
    pub revenue: f64,
    pub cash: f64,
    pub open_positions: usize,
}

impl LeaderboardRow {
    fn from_agent(rank: usize, name: &str, agent: &Agent) -> Self {
        Self {
            rank,
            name: name.to_string(),
            color: agent.color.clone(),
            description: agent.description.clone(),
            portfolio_value: agent.portfolio_value,
            return_pct: return_pct(agent.portfolio_value),
            revenue: agent.revenue.unwrap_or(0.0),
            cash: agent.cash,
            open_positions: agent.open_positions(),
        }
    }

    pub fn rank_display(&self) -> String {
        format!("#{}", self.rank)
    }

    pub fn value_display(&self) -> String {
        format_usd(self.portfolio_value)
    }

    pub fn return_display(&self) -> String {
        format_signed_pct(self.return_pct)
    }

    pub fn return_tone(&self) -> Tone {
        Tone::of(self.return_pct)
    }

    pub fn revenue_display(&self) -> String {
        format_usd(self.revenue)
    }

    pub fn revenue_tone(&self) -> Tone {
        Tone::of(self.revenue)
    }

    pub fn cash_display(&self) -> String {
        format_usd(self.cash)
    }
}

/// Return relative to the fixed baseline, in percent.
pub fn return_pct(portfolio_value: f64) -> f64 {
    (portfolio_value - BASELINE_VALUE) / BASELINE_VALUE * 100.0
}

/// Descending portfolio value; equal values keep roster order.
pub fn rank_agents(agents: &Roster<Agent>) -> Vec<LeaderboardRow> {
    let mut ordered: Vec<(&str, &Agent)> = agents.iter().collect();
    ordered.sort_by(|a, b| b.1.portfolio_value.total_cmp(&a.1.portfolio_value));
    ordered
        .into_iter()
        .enumerate()
        .map(|(i, (name, agent))| LeaderboardRow::from_agent(i + 1, name, agent))
        .collect()
}

#[derive(Debug, Clone, Default)]
pub struct LeaderboardView {
    rows: Vec<LeaderboardRow>,
    source: Option<SnapshotId>,
}

impl LeaderboardView {
    /// Replace every row. An empty roster empties the table.
    pub fn render(&mut self, agents: &Roster<Agent>, source: &SnapshotId) {
        self.rows.clear();
        self.rows.extend(rank_agents(agents));
        self.source = Some(source.clone());
    }

    pub fn rows(&self) -> &[LeaderboardRow] {
        &self.rows
    }

    pub fn source(&self) -> Option<&SnapshotId> {
        self.source.as_ref()
    }
}
