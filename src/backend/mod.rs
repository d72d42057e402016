use async_trait::async_trait;
use serde::Deserialize;

use crate::error::FetchError;
use crate::snapshot::{parse_object, Snapshot, Stamp};

mod http;
mod scripted;

pub use http::HttpBackend;
pub use scripted::ScriptedBackend;

/// The competition backend, consumed as a black box.
#[async_trait]
pub trait Backend: Send + Sync {
    /// `GET /api/stats`. Either a whole snapshot or an error, never a partial result.
    async fn fetch_stats(&self) -> Result<Snapshot, FetchError>;

    /// `GET /api/trade`. Asks the backend to run one trade cycle.
    async fn trigger_cycle(&self) -> Result<CycleReport, FetchError>;
}

/// What the backend reports after a trade cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleReport {
    pub trades_executed: u64,
    pub timestamp: Option<String>,
}

impl CycleReport {
    pub fn new(trades_executed: u64) -> Self {
        Self {
            trades_executed,
            timestamp: None,
        }
    }

    pub fn from_body(endpoint: &str, body: &[u8]) -> Result<Self, FetchError> {
        let raw: RawCycleReport = parse_object(body).map_err(|source| FetchError::Parse {
            endpoint: endpoint.to_string(),
            source,
        })?;

        if raw.status.as_deref().is_some_and(|s| s.eq_ignore_ascii_case("error")) {
            return Err(FetchError::Rejected {
                message: raw.message.unwrap_or_else(|| "unspecified backend error".to_string()),
            });
        }

        let trades_executed = raw
            .trades_executed
            .or_else(|| raw.new_trades.as_ref().map(|t| t.len() as u64))
            .unwrap_or(0);
        Ok(Self {
            trades_executed,
            timestamp: raw.timestamp,
        })
    }

    /// When the backend says the cycle ran. An unreadable stamp is ignored.
    pub fn completed_at(&self) -> Option<Stamp> {
        self.timestamp.as_deref().and_then(Stamp::parse)
    }
}

#[derive(Debug, Deserialize)]
struct RawCycleReport {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    timestamp: Option<String>,
    #[serde(default)]
    trades_executed: Option<u64>,
    #[serde(default)]
    new_trades: Option<Vec<serde_json::Value>>,
    #[serde(default)]
    message: Option<String>,
}
