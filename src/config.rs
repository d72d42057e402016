use std::time::Duration;

use anyhow::{Context, Result};
use url::Url;

pub const STATS_PATH: &str = "api/stats";
pub const TRADE_PATH: &str = "api/trade";

#[derive(Debug, Clone)]
pub struct Config {
    pub backend_url: String,
    pub refresh_secs: u64,
    /// 0 disables the passive trigger.
    pub passive_trigger_secs: u64,
    pub http_timeout_secs: u64,
    pub trigger_silent: bool,
    /// Replay a saved `/api/stats` body instead of talking to a backend.
    pub stats_file: Option<String>,
    pub headless: bool,
    pub frame_ms: u64,
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_flag(key: &str) -> bool {
    matches!(
        std::env::var(key).as_deref(),
        Ok("1") | Ok("true") | Ok("yes") | Ok("on")
    )
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_url: "http://127.0.0.1:5000".to_string(),
            refresh_secs: 5,
            passive_trigger_secs: 10,
            http_timeout_secs: 10,
            trigger_silent: false,
            stats_file: None,
            headless: false,
            frame_ms: 250,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            backend_url: std::env::var("BACKEND_URL").unwrap_or(defaults.backend_url),
            refresh_secs: env_u64("REFRESH_SECS", defaults.refresh_secs).max(1),
            passive_trigger_secs: env_u64("PASSIVE_TRIGGER_SECS", defaults.passive_trigger_secs),
            http_timeout_secs: env_u64("HTTP_TIMEOUT_SECS", defaults.http_timeout_secs).max(1),
            trigger_silent: env_flag("TRIGGER_SILENT"),
            stats_file: std::env::var("STATS_FILE").ok().filter(|p| !p.is_empty()),
            headless: env_flag("DASHBOARD_HEADLESS"),
            frame_ms: env_u64("FRAME_MS", defaults.frame_ms).max(16),
        }
    }

    pub fn refresh_period(&self) -> Duration {
        Duration::from_secs(self.refresh_secs)
    }

    pub fn passive_trigger_period(&self) -> Option<Duration> {
        (self.passive_trigger_secs > 0).then(|| Duration::from_secs(self.passive_trigger_secs))
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_ms)
    }

    pub fn endpoints(&self) -> Result<Endpoints> {
        Endpoints::new(&self.backend_url)
    }
}

/// Absolute URLs of the two backend endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub stats: Url,
    pub trade: Url,
}

impl Endpoints {
    pub fn new(base: &str) -> Result<Self> {
        let mut base = Url::parse(base).with_context(|| format!("invalid BACKEND_URL {:?}", base))?;
        if base.cannot_be_a_base() {
            anyhow::bail!("BACKEND_URL {:?} cannot carry a path", base.as_str());
        }
        // Url::join drops the last path segment unless it ends in '/'.
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self {
            stats: base.join(STATS_PATH)?,
            trade: base.join(TRADE_PATH)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoints_from_root() {
        let ep = Endpoints::new("http://127.0.0.1:5000").unwrap();
        assert_eq!(ep.stats.as_str(), "http://127.0.0.1:5000/api/stats");
        assert_eq!(ep.trade.as_str(), "http://127.0.0.1:5000/api/trade");
    }

    #[test]
    fn test_endpoints_keep_mount_path() {
        let ep = Endpoints::new("https://example.com/competition").unwrap();
        assert_eq!(ep.stats.as_str(), "https://example.com/competition/api/stats");
        let ep = Endpoints::new("https://example.com/competition/").unwrap();
        assert_eq!(ep.trade.as_str(), "https://example.com/competition/api/trade");
    }

    #[test]
    fn test_endpoints_reject_garbage() {
        assert!(Endpoints::new("not a url").is_err());
        assert!(Endpoints::new("mailto:someone@example.com").is_err());
    }

    #[test]
    fn test_default_cadence() {
        let cfg = Config::default();
        assert_eq!(cfg.refresh_period(), Duration::from_secs(5));
        assert_eq!(cfg.passive_trigger_period(), Some(Duration::from_secs(10)));
        let off = Config {
            passive_trigger_secs: 0,
            ..Config::default()
        };
        assert_eq!(off.passive_trigger_period(), None);
        assert_eq!(cfg.frame_interval(), Duration::from_millis(250));
    }
}
