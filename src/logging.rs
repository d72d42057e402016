//! Structured logging for the dashboard.
//!
//! Every record is one JSON line with a run id, a sequence number, a level
//! and a domain. Records go to `LOG_DIR/RUN_ID/events.jsonl` (trace/debug to
//! `trace.jsonl`) and are echoed to stderr unless the terminal UI owns the
//! screen.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::fs::{create_dir_all, File};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::process;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, OnceLock};
use std::time::Instant;

// =============================================================================
// Log Levels
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Trace = 0,
    Debug = 1,
    Info = 2,
    Warn = 3,
    Error = 4,
    Fatal = 5,
}

impl Level {
    pub fn from_env() -> Self {
        match std::env::var("LOG_LEVEL").as_deref() {
            Ok("trace") => Level::Trace,
            Ok("debug") => Level::Debug,
            Ok("info") => Level::Info,
            Ok("warn") => Level::Warn,
            Ok("error") => Level::Error,
            Ok("fatal") => Level::Fatal,
            _ => Level::Info,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Trace => "trace",
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
            Level::Fatal => "fatal",
        }
    }
}

// =============================================================================
// Log Domains
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    Fetch,    // Backend calls, status codes, parse failures
    Render,   // View updates, chart lifecycle
    Trigger,  // Manual and passive trade-cycle triggers
    Schedule, // Timer ticks
    System,   // Startup, shutdown, config
    Profile,  // Timing scopes
}

impl Domain {
    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Fetch => "fetch",
            Domain::Render => "render",
            Domain::Trigger => "trigger",
            Domain::Schedule => "schedule",
            Domain::System => "system",
            Domain::Profile => "profile",
        }
    }

    pub fn is_enabled(&self) -> bool {
        // LOG_DOMAINS: comma-separated list or "all"
        match std::env::var("LOG_DOMAINS").as_deref() {
            Ok("all") | Err(_) => true,
            Ok(domains) => domains.split(',').any(|d| d.trim() == self.as_str()),
        }
    }
}

// =============================================================================
// Run context
// =============================================================================

static LOG_SEQ: AtomicU64 = AtomicU64::new(0);
static PROFILE_SEQ: AtomicU64 = AtomicU64::new(0);
static CONSOLE: AtomicBool = AtomicBool::new(true);
static RUN_CONTEXT: OnceLock<RunContext> = OnceLock::new();

fn next_seq() -> u64 {
    LOG_SEQ.fetch_add(1, Ordering::SeqCst)
}

#[derive(Debug)]
struct RunContext {
    run_id: String,
    events: Option<Mutex<BufWriter<File>>>,
    trace: Option<Mutex<BufWriter<File>>>,
}

fn open_sink(path: PathBuf) -> Option<Mutex<BufWriter<File>>> {
    match File::create(&path) {
        Ok(file) => Some(Mutex::new(BufWriter::new(file))),
        Err(err) => {
            eprintln!("[log] failed to create {}: {}", path.display(), err);
            None
        }
    }
}

fn ensure_run_context() -> &'static RunContext {
    RUN_CONTEXT.get_or_init(|| {
        let run_id = std::env::var("RUN_ID")
            .unwrap_or_else(|_| format!("r-{}-{}", ts_epoch_ms(), process::id()));
        let base = std::env::var("LOG_DIR").unwrap_or_else(|_| "out/runs".to_string());
        let run_dir = PathBuf::from(base).join(&run_id);
        if let Err(err) = create_dir_all(&run_dir) {
            eprintln!("[log] failed to create run dir: {}", err);
        }

        let _ = std::fs::write(
            run_dir.join("manifest.json"),
            json!({
                "run_id": run_id,
                "ts": ts_now(),
                "pid": process::id(),
                "log_dir": run_dir.to_string_lossy(),
            })
            .to_string(),
        );

        RunContext {
            events: open_sink(run_dir.join("events.jsonl")),
            trace: open_sink(run_dir.join("trace.jsonl")),
            run_id,
        }
    })
}

fn sanitize_fields(mut fields: Map<String, Value>) -> Map<String, Value> {
    let redacted = Value::String("[REDACTED]".to_string());
    for key in ["authorization", "Authorization", "cookie", "Cookie"] {
        if fields.contains_key(key) {
            fields.insert(key.to_string(), redacted.clone());
        }
    }
    fields
}

fn split_fields(mut fields: Map<String, Value>) -> (Map<String, Value>, Map<String, Value>) {
    let mut top = Map::new();
    for key in ["snapshot_id", "endpoint", "agent", "msg"] {
        if let Some(value) = fields.remove(key) {
            top.insert(key.to_string(), value);
        }
    }
    (top, fields)
}

fn write_line(writer: &Option<Mutex<BufWriter<File>>>, line: &str) {
    if let Some(writer) = writer {
        if let Ok(mut w) = writer.lock() {
            let _ = writeln!(w, "{}", line);
            let _ = w.flush();
        }
    }
}

/// Turn the stderr echo on or off. The terminal UI turns it off while it
/// holds the alternate screen.
pub fn set_console(enabled: bool) {
    CONSOLE.store(enabled, Ordering::SeqCst);
}

pub fn run_id() -> String {
    ensure_run_context().run_id.clone()
}

// =============================================================================
// Core logging functions
// =============================================================================

/// RFC3339 timestamp with milliseconds
pub fn ts_now() -> String {
    Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

pub fn ts_epoch_ms() -> u64 {
    Utc::now().timestamp_millis() as u64
}

/// Emit a structured log entry
pub fn log(level: Level, domain: Domain, event: &str, fields: Map<String, Value>) {
    let min_level = Level::from_env();
    if level < min_level || !domain.is_enabled() {
        return;
    }
    emit_record(level, domain.as_str(), event, fields);
}

fn build_record(
    run_id: &str,
    level: Level,
    component: &str,
    event: &str,
    fields: Map<String, Value>,
) -> Value {
    let fields = sanitize_fields(fields);
    let (mut top, data) = split_fields(fields);

    let msg = top.remove("msg").unwrap_or(Value::String(String::new()));
    let mut entry = Map::new();
    entry.insert("ts".to_string(), json!(ts_now()));
    entry.insert("run_id".to_string(), json!(run_id));
    entry.insert("seq".to_string(), json!(next_seq()));
    entry.insert("lvl".to_string(), json!(level.as_str().to_uppercase()));
    entry.insert("component".to_string(), json!(component));
    entry.insert("event".to_string(), json!(event));
    entry.insert("msg".to_string(), msg);
    for (k, v) in top {
        entry.insert(k, v);
    }
    entry.insert("data".to_string(), Value::Object(data));
    Value::Object(entry)
}

fn emit_record(level: Level, component: &str, event: &str, fields: Map<String, Value>) {
    let ctx = ensure_run_context();
    let line = build_record(&ctx.run_id, level, component, event, fields).to_string();
    match level {
        Level::Trace | Level::Debug => write_line(&ctx.trace, &line),
        _ => write_line(&ctx.events, &line),
    }
    if CONSOLE.load(Ordering::SeqCst) {
        eprintln!("{}", line);
    }
}

// =============================================================================
// Domain-Specific Logging Helpers
// =============================================================================

pub fn log_fetch_failure(endpoint: &str, kind: &str, error: &str) {
    agg_increment("fetch_failed");
    log(
        Level::Warn,
        Domain::Fetch,
        "fetch_failed",
        obj(&[
            ("endpoint", v_str(endpoint)),
            ("kind", v_str(kind)),
            ("error", v_str(error)),
        ]),
    );
}

pub fn log_refresh(snapshot_id: &str, agents: usize, series: usize, trades: usize) {
    agg_increment("refresh");
    log(
        Level::Debug,
        Domain::Render,
        "refresh_rendered",
        obj(&[
            ("snapshot_id", v_str(snapshot_id)),
            ("agents", json!(agents)),
            ("series", json!(series)),
            ("trades_shown", json!(trades)),
        ]),
    );
}

pub fn log_trigger(source: &str, result: &str, trades_executed: Option<u64>, error: Option<&str>) {
    agg_increment(if error.is_some() { "trigger_failed" } else { "trigger" });
    let level = if error.is_some() { Level::Warn } else { Level::Info };
    log(
        level,
        Domain::Trigger,
        "trade_cycle",
        obj(&[
            ("source", v_str(source)),
            ("result", v_str(result)),
            ("trades_executed", trades_executed.map(|n| json!(n)).unwrap_or(Value::Null)),
            ("error", error.map(v_str).unwrap_or(Value::Null)),
        ]),
    );
}

// =============================================================================
// Field helpers
// =============================================================================

pub fn obj(pairs: &[(&str, Value)]) -> Map<String, Value> {
    let mut map = Map::new();
    for (k, v) in pairs {
        map.insert((*k).to_string(), v.clone());
    }
    map
}

pub fn v_str(s: &str) -> Value {
    Value::String(s.to_string())
}

pub fn v_num(n: f64) -> Value {
    json!(n)
}

// =============================================================================
// Profiling Scope
// =============================================================================

/// Profiling scope that emits structured timing on drop.
pub struct ProfileScope {
    label: &'static str,
    context: Option<Map<String, Value>>,
    started: Instant,
    enabled: bool,
}

impl ProfileScope {
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            context: None,
            started: Instant::now(),
            enabled: Self::should_sample(),
        }
    }

    pub fn with_context(label: &'static str, fields: &[(&str, Value)]) -> Self {
        let enabled = Self::should_sample();
        Self {
            label,
            context: if enabled { Some(obj(fields)) } else { None },
            started: Instant::now(),
            enabled,
        }
    }

    fn should_sample() -> bool {
        std::env::var("PROFILE_SAMPLE")
            .ok()
            .and_then(|v| v.parse::<f64>().ok())
            .map(|p| {
                if p >= 1.0 {
                    true
                } else if p <= 0.0 {
                    false
                } else {
                    let seq = PROFILE_SEQ.fetch_add(1, Ordering::SeqCst);
                    let bucket = (seq % 10_000) as f64 / 10_000.0;
                    bucket < p
                }
            })
            .unwrap_or(true)
    }
}

impl Drop for ProfileScope {
    fn drop(&mut self) {
        if !self.enabled {
            return;
        }
        let elapsed_ms = self.started.elapsed().as_secs_f64() * 1000.0;
        let mut fields = self.context.take().unwrap_or_default();
        fields.insert("label".to_string(), v_str(self.label));
        fields.insert("elapsed_ms".to_string(), v_num(elapsed_ms));
        log(Level::Trace, Domain::Profile, "profile", fields);
    }
}

// =============================================================================
// Log Aggregator for Periodic Summaries
// =============================================================================

static AGGREGATOR: OnceLock<Mutex<LogAggregator>> = OnceLock::new();

fn get_aggregator() -> &'static Mutex<LogAggregator> {
    AGGREGATOR.get_or_init(|| Mutex::new(LogAggregator::new()))
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AggregatedStats {
    pub refreshes: u64,
    pub fetch_failures: u64,
    pub triggers: u64,
    pub trigger_failures: u64,
}

struct LogAggregator {
    stats: AggregatedStats,
    last_flush: Instant,
    flush_interval_secs: u64,
}

impl LogAggregator {
    fn new() -> Self {
        Self {
            stats: AggregatedStats::default(),
            last_flush: Instant::now(),
            flush_interval_secs: std::env::var("LOG_FLUSH_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(300),
        }
    }

    fn increment(&mut self, event: &str) {
        match event {
            "refresh" => self.stats.refreshes += 1,
            "fetch_failed" => self.stats.fetch_failures += 1,
            "trigger" => self.stats.triggers += 1,
            "trigger_failed" => self.stats.trigger_failures += 1,
            _ => {}
        }
    }

    fn maybe_flush(&mut self) -> Option<AggregatedStats> {
        if self.last_flush.elapsed().as_secs() >= self.flush_interval_secs {
            let result = std::mem::take(&mut self.stats);
            self.last_flush = Instant::now();
            Some(result)
        } else {
            None
        }
    }
}

/// Call periodically to emit aggregated stats
pub fn tick_aggregator() {
    if let Ok(mut agg) = get_aggregator().lock() {
        if let Some(stats) = agg.maybe_flush() {
            log(
                Level::Info,
                Domain::System,
                "aggregated_stats",
                obj(&[
                    ("refreshes", json!(stats.refreshes)),
                    ("fetch_failures", json!(stats.fetch_failures)),
                    ("triggers", json!(stats.triggers)),
                    ("trigger_failures", json!(stats.trigger_failures)),
                ]),
            );
        }
    }
}

pub fn agg_increment(event: &str) {
    if let Ok(mut agg) = get_aggregator().lock() {
        agg.increment(event);
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_ordering() {
        assert!(Level::Trace < Level::Debug);
        assert!(Level::Debug < Level::Info);
        assert!(Level::Info < Level::Warn);
        assert!(Level::Warn < Level::Error);
        assert!(Level::Error < Level::Fatal);
    }

    #[test]
    fn test_obj_helper() {
        let m = obj(&[("key", v_str("value")), ("num", v_num(42.0))]);
        assert_eq!(m.get("key").unwrap(), "value");
        assert_eq!(m.get("num").unwrap(), 42.0);
    }

    #[test]
    fn test_seq_increments() {
        let s1 = next_seq();
        let s2 = next_seq();
        assert!(s2 > s1);
    }

    #[test]
    fn test_record_shape() {
        let record = build_record(
            "r-test",
            Level::Warn,
            "fetch",
            "fetch_failed",
            obj(&[
                ("endpoint", v_str("/api/stats")),
                ("msg", v_str("backend down")),
                ("Authorization", v_str("Bearer secret")),
                ("status", json!(502)),
            ]),
        );
        assert_eq!(record["lvl"], "WARN");
        assert_eq!(record["component"], "fetch");
        assert_eq!(record["endpoint"], "/api/stats");
        assert_eq!(record["msg"], "backend down");
        assert_eq!(record["data"]["status"], 502);
        assert_eq!(record["data"]["Authorization"], "[REDACTED]");
    }

    #[test]
    fn test_aggregator_counts_and_resets() {
        let mut agg = LogAggregator::new();
        agg.flush_interval_secs = 0;
        agg.increment("refresh");
        agg.increment("refresh");
        agg.increment("fetch_failed");
        agg.increment("unknown");
        let stats = agg.maybe_flush().unwrap();
        assert_eq!(stats.refreshes, 2);
        assert_eq!(stats.fetch_failures, 1);
        assert_eq!(agg.stats, AggregatedStats::default());
    }
}
