//! Trade-cycle triggers: the manual control and the passive background ping.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::{JoinHandle, JoinSet};
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::backend::{Backend, CycleReport};
use crate::dashboard::{lock, NoticeLevel, SharedDashboard};
use crate::error::FetchError;
use crate::logging::{log, log_trigger, obj, Domain, Level};
use crate::refresh::Refresher;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerOutcome {
    Completed { trades_executed: u64 },
    Failed,
    /// A previous manual trigger is still in flight.
    Busy,
}

/// Re-enables the control when dropped, whatever happened in between.
struct ControlGuard {
    board: SharedDashboard,
}

impl ControlGuard {
    fn acquire(board: &SharedDashboard) -> Option<Self> {
        lock(board).control.try_begin().then(|| ControlGuard {
            board: board.clone(),
        })
    }
}

impl Drop for ControlGuard {
    fn drop(&mut self) {
        lock(&self.board).control.restore();
    }
}

/// Manual trigger. With `silent` set it neither locks the control nor posts
/// notices; it still forces a refresh after a successful cycle.
#[derive(Clone)]
pub struct TriggerHandler {
    refresher: Refresher,
    silent: bool,
}

impl TriggerHandler {
    pub fn new(refresher: Refresher, silent: bool) -> Self {
        Self { refresher, silent }
    }

    pub fn refresher(&self) -> &Refresher {
        &self.refresher
    }

    pub fn is_silent(&self) -> bool {
        self.silent
    }

    pub async fn on_trigger(&self) -> TriggerOutcome {
        let board = self.refresher.board();
        let guard = if self.silent {
            None
        } else {
            match ControlGuard::acquire(board) {
                Some(guard) => Some(guard),
                None => return TriggerOutcome::Busy,
            }
        };

        let result = self.refresher.backend().trigger_cycle().await;
        drop(guard);

        match result {
            Ok(report) => {
                log_trigger("manual", "ok", Some(report.trades_executed), None);
                if !self.silent {
                    lock(board).notify(NoticeLevel::Info, success_notice(&report));
                }
                self.refresher.refresh_once().await;
                TriggerOutcome::Completed {
                    trades_executed: report.trades_executed,
                }
            }
            Err(err) => {
                log_trigger("manual", err.kind(), None, Some(&err.to_string()));
                if !self.silent {
                    lock(board).notify(NoticeLevel::Error, failure_notice(&err));
                }
                TriggerOutcome::Failed
            }
        }
    }
}

fn success_notice(report: &CycleReport) -> String {
    let done = format!(
        "Manual trade cycle complete! Executed {} trades.",
        report.trades_executed
    );
    match report.completed_at() {
        Some(at) => format!("{} Cycle ran at {}.", done, at.time_of_day()),
        None => done,
    }
}

fn failure_notice(err: &FetchError) -> String {
    match err {
        FetchError::Rejected { message } => format!("Trade cycle failed: {}", message),
        _ => "Trade cycle failed. Check the backend and try again.".to_string(),
    }
}

/// One unattended trade-cycle request. Failures are logged and dropped.
pub async fn passive_ping(backend: &dyn Backend) -> Option<CycleReport> {
    match backend.trigger_cycle().await {
        Ok(report) => {
            log_trigger("passive", "ok", Some(report.trades_executed), None);
            Some(report)
        }
        Err(err) => {
            log_trigger("passive", err.kind(), None, Some(&err.to_string()));
            None
        }
    }
}

/// Ping the trigger endpoint every `period`, first after one full period.
/// No refresh is forced; the regular poll picks up the result. Aborting the
/// handle also drops any ping still in flight.
pub fn spawn_passive_trigger(backend: Arc<dyn Backend>, period: Duration) -> JoinHandle<()> {
    log(
        Level::Info,
        Domain::Schedule,
        "passive_trigger_started",
        obj(&[("period_ms", serde_json::json!(period.as_millis() as u64))]),
    );
    tokio::spawn(async move {
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut in_flight = JoinSet::new();
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let backend = backend.clone();
                    in_flight.spawn(async move {
                        passive_ping(backend.as_ref()).await;
                    });
                }
                Some(_) = in_flight.join_next(), if !in_flight.is_empty() => {}
            }
        }
    })
}
