//! Everything the screen shows, in one place.
//!
//! Renderers write here; the terminal widgets only read. The whole value sits
//! behind one mutex, and a refresh applies all three views inside a single
//! critical section, so a reader never sees the leaderboard of one snapshot
//! next to the trade feed of another.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Local};

use crate::logging::{log_refresh, v_str, ProfileScope};
use crate::snapshot::{Snapshot, SnapshotId};
use crate::views::{ChartState, LeaderboardView, TradeFeedView};

pub const TRIGGER_IDLE_LABEL: &str = "Trigger trade cycle";
pub const TRIGGER_BUSY_LABEL: &str = "Running trade cycle...";

/// The on-screen trigger button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerControl {
    enabled: bool,
    label: String,
}

impl Default for TriggerControl {
    fn default() -> Self {
        Self {
            enabled: true,
            label: TRIGGER_IDLE_LABEL.to_string(),
        }
    }
}

impl TriggerControl {
    /// Disable the control. Returns false when it was already disabled.
    pub fn try_begin(&mut self) -> bool {
        if !self.enabled {
            return false;
        }
        self.enabled = false;
        self.label = TRIGGER_BUSY_LABEL.to_string();
        true
    }

    pub fn restore(&mut self) {
        self.enabled = true;
        self.label = TRIGGER_IDLE_LABEL.to_string();
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// A message surfaced to the user.
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
    pub at: DateTime<Local>,
}

/// Fetch health shown in the header. Not one of the three views.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Health {
    pub refreshes: u64,
    pub consecutive_failures: u32,
    pub last_error: Option<String>,
}

#[derive(Debug, Default)]
pub struct Dashboard {
    pub leaderboard: LeaderboardView,
    pub chart: ChartState,
    pub trade_feed: TradeFeedView,
    pub control: TriggerControl,
    pub notice: Option<Notice>,
    pub health: Health,
}

pub type SharedDashboard = Arc<Mutex<Dashboard>>;

impl Dashboard {
    pub fn shared() -> SharedDashboard {
        Arc::new(Mutex::new(Dashboard::default()))
    }

    /// Fan one snapshot out to the three views, always in the order
    /// leaderboard, chart, trade feed.
    pub fn apply(&mut self, snapshot: &Snapshot) {
        let _scope =
            ProfileScope::with_context("render_fanout", &[("snapshot_id", v_str(snapshot.id.short()))]);
        self.leaderboard.render(&snapshot.agents, &snapshot.id);
        self.chart.render(&snapshot.history, &snapshot.agents, &snapshot.id);
        self.trade_feed.render(&snapshot.trades, &snapshot.id);

        self.health.refreshes += 1;
        self.health.consecutive_failures = 0;
        self.health.last_error = None;
        log_refresh(
            snapshot.id.short(),
            self.leaderboard.rows().len(),
            self.chart.series().len(),
            self.trade_feed.lines().len(),
        );
    }

    pub fn record_failure(&mut self, error: &str) {
        self.health.consecutive_failures = self.health.consecutive_failures.saturating_add(1);
        self.health.last_error = Some(error.to_string());
    }

    pub fn notify(&mut self, level: NoticeLevel, text: impl Into<String>) {
        self.notice = Some(Notice {
            level,
            text: text.into(),
            at: Local::now(),
        });
    }

    /// The snapshot the leaderboard and trade feed were built from, when
    /// they agree. The chart is left out because an empty history keeps the
    /// previous chart on purpose.
    pub fn rendered_snapshot(&self) -> Option<&SnapshotId> {
        match (self.leaderboard.source(), self.trade_feed.source()) {
            (Some(a), Some(b)) if a == b => Some(a),
            _ => None,
        }
    }
}

/// Lock the dashboard, recovering the data if a panicking holder poisoned it.
pub fn lock(board: &SharedDashboard) -> MutexGuard<'_, Dashboard> {
    board.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
