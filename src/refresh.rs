//! Refresh cycle: fetch one snapshot, fan it out to the three views.
//!
//! Overlapping cycles are allowed. A slow fetch that finishes after a newer
//! one simply re-renders its older snapshot; every view then shows that older
//! snapshot until the next tick. This staleness window is accepted: cycles
//! are never serialised, only each cycle's three renders are applied
//! atomically. Cycles are cancelled only when the poll itself is stopped;
//! in-flight fetches are dropped with it and never render afterwards.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::{JoinHandle, JoinSet};
use tokio::time::{interval, MissedTickBehavior};

use crate::backend::Backend;
use crate::config::STATS_PATH;
use crate::dashboard::{lock, SharedDashboard};
use crate::logging::{
    log, log_fetch_failure, obj, tick_aggregator, v_str, Domain, Level, ProfileScope,
};
use crate::snapshot::SnapshotId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    Rendered(SnapshotId),
    /// The views were left exactly as they were.
    Failed,
}

#[derive(Clone)]
pub struct Refresher {
    backend: Arc<dyn Backend>,
    board: SharedDashboard,
}

impl Refresher {
    pub fn new(backend: Arc<dyn Backend>, board: SharedDashboard) -> Self {
        Self { backend, board }
    }

    pub fn board(&self) -> &SharedDashboard {
        &self.board
    }

    pub fn backend(&self) -> &Arc<dyn Backend> {
        &self.backend
    }

    /// One fetch-and-render pass. Never fails past this boundary.
    pub async fn refresh_once(&self) -> RefreshOutcome {
        let _scope = ProfileScope::new("refresh_cycle");
        match self.backend.fetch_stats().await {
            Ok(snapshot) => {
                lock(&self.board).apply(&snapshot);
                RefreshOutcome::Rendered(snapshot.id)
            }
            Err(err) => {
                let message = err.to_string();
                log_fetch_failure(&format!("/{}", STATS_PATH), err.kind(), &message);
                lock(&self.board).record_failure(&message);
                RefreshOutcome::Failed
            }
        }
    }

    /// Poll forever. The first tick fires immediately (initial load). Each
    /// tick runs in its own task so a slow fetch never delays the next tick.
    /// Aborting the returned handle also aborts every cycle still in flight.
    pub fn start(&self, period: Duration) -> JoinHandle<()> {
        let refresher = self.clone();
        log(
            Level::Info,
            Domain::Schedule,
            "refresh_poll_started",
            obj(&[("period_ms", serde_json::json!(period.as_millis() as u64))]),
        );
        tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            let mut in_flight = JoinSet::new();
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        tick_aggregator();
                        let cycle = refresher.clone();
                        in_flight.spawn(async move {
                            if let RefreshOutcome::Rendered(id) = cycle.refresh_once().await {
                                log(
                                    Level::Trace,
                                    Domain::Schedule,
                                    "refresh_tick",
                                    obj(&[("snapshot_id", v_str(id.short()))]),
                                );
                            }
                        });
                    }
                    Some(_) = in_flight.join_next(), if !in_flight.is_empty() => {}
                }
            }
        })
    }
}
