//! In-process backend that plays back canned replies.
//!
//! Used to replay a saved `/api/stats` body offline and to drive the
//! refresh and trigger paths with precise delays and faults.

use std::collections::VecDeque;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;

use crate::backend::{Backend, CycleReport};
use crate::error::FetchError;
use crate::snapshot::Snapshot;

struct Step<T> {
    delay: Duration,
    result: Result<T, FetchError>,
}

#[derive(Default)]
pub struct ScriptedBackend {
    stats: Mutex<VecDeque<Step<Snapshot>>>,
    trades: Mutex<VecDeque<Step<CycleReport>>>,
    /// Served whenever the stats script is empty.
    replay: Option<Snapshot>,
    stats_calls: AtomicUsize,
    trigger_calls: AtomicUsize,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve the same snapshot on every fetch.
    pub fn replay(snapshot: Snapshot) -> Self {
        Self {
            replay: Some(snapshot),
            ..Self::default()
        }
    }

    /// Load a saved `/api/stats` body.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let body = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
        let snapshot = Snapshot::from_body(&body)
            .with_context(|| format!("parsing {} as a stats snapshot", path.display()))?;
        Ok(Self::replay(snapshot))
    }

    pub fn push_stats(&self, result: Result<Snapshot, FetchError>) {
        self.push_stats_after(Duration::ZERO, result);
    }

    pub fn push_stats_after(&self, delay: Duration, result: Result<Snapshot, FetchError>) {
        if let Ok(mut q) = self.stats.lock() {
            q.push_back(Step { delay, result });
        }
    }

    pub fn push_trigger(&self, result: Result<CycleReport, FetchError>) {
        self.push_trigger_after(Duration::ZERO, result);
    }

    pub fn push_trigger_after(&self, delay: Duration, result: Result<CycleReport, FetchError>) {
        if let Ok(mut q) = self.trades.lock() {
            q.push_back(Step { delay, result });
        }
    }

    pub fn stats_calls(&self) -> usize {
        self.stats_calls.load(Ordering::SeqCst)
    }

    pub fn trigger_calls(&self) -> usize {
        self.trigger_calls.load(Ordering::SeqCst)
    }

    fn next_step<T>(queue: &Mutex<VecDeque<Step<T>>>) -> Option<Step<T>> {
        queue.lock().ok().and_then(|mut q| q.pop_front())
    }
}

async fn play<T>(step: Step<T>) -> Result<T, FetchError> {
    if !step.delay.is_zero() {
        tokio::time::sleep(step.delay).await;
    }
    step.result
}

#[async_trait]
impl Backend for ScriptedBackend {
    async fn fetch_stats(&self) -> Result<Snapshot, FetchError> {
        self.stats_calls.fetch_add(1, Ordering::SeqCst);
        match Self::next_step(&self.stats) {
            Some(step) => play(step).await,
            None => match &self.replay {
                Some(snapshot) => Ok(snapshot.clone()),
                None => Err(FetchError::transport("/api/stats", "script exhausted")),
            },
        }
    }

    async fn trigger_cycle(&self) -> Result<CycleReport, FetchError> {
        self.trigger_calls.fetch_add(1, Ordering::SeqCst);
        match Self::next_step(&self.trades) {
            Some(step) => play(step).await,
            None => Err(FetchError::Rejected {
                message: "no trade cycle scripted".to_string(),
            }),
        }
    }
}
