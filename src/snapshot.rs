//! Wire model for one `/api/stats` response.
//!
//! A [`Snapshot`] is created fresh on every successful fetch and dropped once
//! the three views have been rendered from it.

use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use serde::de::{self, DeserializeOwned, Deserializer, MapAccess, Unexpected, Visitor};
use serde::Deserialize;
use serde_json::Value;
use sha2::{Digest, Sha256};

/// Starting portfolio value every agent is measured against.
pub const BASELINE_VALUE: f64 = 10_000.0;

// =============================================================================
// Snapshot identity
// =============================================================================

/// Hex SHA-256 of the raw response body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct SnapshotId(String);

impl SnapshotId {
    pub fn of(body: &[u8]) -> Self {
        SnapshotId(hex::encode(Sha256::digest(body)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First 12 hex chars, enough to tell snapshots apart in logs.
    pub fn short(&self) -> &str {
        &self.0[..self.0.len().min(12)]
    }
}

impl fmt::Display for SnapshotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short())
    }
}

// =============================================================================
// Roster: name-keyed map that keeps wire order
// =============================================================================

/// Name → value map that preserves the order keys appeared in the JSON object.
///
/// A repeated key replaces the earlier value but keeps its original position.
#[derive(Debug, Clone, PartialEq)]
pub struct Roster<V> {
    entries: Vec<(String, V)>,
}

impl<V> Default for Roster<V> {
    fn default() -> Self {
        Self { entries: Vec::new() }
    }
}

impl<V> Roster<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: V) {
        let name = name.into();
        match self.entries.iter_mut().find(|(k, _)| *k == name) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&V> {
        self.entries.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn first(&self) -> Option<(&str, &V)> {
        self.entries.first().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V, K: Into<String>> FromIterator<(K, V)> for Roster<V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut roster = Roster::new();
        for (k, v) in iter {
            roster.insert(k, v);
        }
        roster
    }
}

struct RosterVisitor<V>(PhantomData<V>);

impl<'de, V: Deserialize<'de>> Visitor<'de> for RosterVisitor<V> {
    type Value = Roster<V>;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a JSON object keyed by agent name")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut roster = Roster::new();
        while let Some((name, value)) = access.next_entry::<String, V>()? {
            roster.insert(name, value);
        }
        Ok(roster)
    }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for Roster<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(RosterVisitor(PhantomData))
    }
}

// =============================================================================
// Stamp: backend timestamps
// =============================================================================

/// Wall-clock timestamp in the viewer's local time.
///
/// The backend writes naive local ISO strings; RFC 3339 strings and epoch
/// milliseconds are converted to local time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Stamp(NaiveDateTime);

impl Stamp {
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(Stamp(dt.with_timezone(&Local).naive_local()));
        }
        for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
            if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
                return Some(Stamp(dt));
            }
        }
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(Stamp)
    }

    pub fn from_epoch_ms(ms: i64) -> Option<Self> {
        DateTime::from_timestamp_millis(ms).map(|dt| Stamp(dt.with_timezone(&Local).naive_local()))
    }

    pub fn naive(&self) -> NaiveDateTime {
        self.0
    }

    pub fn date_label(&self) -> String {
        self.0.format("%Y-%m-%d").to_string()
    }

    pub fn date_time_label(&self) -> String {
        self.0.format("%Y-%m-%d %H:%M").to_string()
    }

    pub fn time_of_day(&self) -> String {
        self.0.format("%H:%M:%S").to_string()
    }
}

struct StampVisitor;

impl<'de> Visitor<'de> for StampVisitor {
    type Value = Stamp;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("an ISO-8601 timestamp string or epoch milliseconds")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Stamp, E> {
        Stamp::parse(v).ok_or_else(|| E::custom(format!("unrecognised timestamp {:?}", v)))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Stamp, E> {
        Stamp::from_epoch_ms(v).ok_or_else(|| E::custom(format!("timestamp out of range: {}", v)))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Stamp, E> {
        let ms = i64::try_from(v).map_err(|_| E::custom("timestamp out of range"))?;
        self.visit_i64(ms)
    }
}

impl<'de> Deserialize<'de> for Stamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(StampVisitor)
    }
}

// =============================================================================
// Records
// =============================================================================

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Agent {
    pub portfolio_value: f64,
    pub cash: f64,
    #[serde(default)]
    pub revenue: Option<f64>,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub description: String,
    /// symbol → shares held
    #[serde(default)]
    pub holdings: BTreeMap<String, f64>,
}

impl Agent {
    pub fn open_positions(&self) -> usize {
        self.holdings.values().filter(|shares| **shares != 0.0).count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct HistoryPoint {
    pub date: Stamp,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeAction {
    Buy,
    Sell,
}

impl TradeAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeAction::Buy => "BUY",
            TradeAction::Sell => "SELL",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Trade {
    pub agent: String,
    pub action: TradeAction,
    pub shares: f64,
    pub symbol: String,
    pub price: f64,
    pub date: Stamp,
    #[serde(default)]
    pub total: Option<f64>,
}

/// One self-consistent state of the competition. All three sections are
/// required; a body missing any of them is not a snapshot.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Snapshot {
    #[serde(skip)]
    pub id: SnapshotId,
    pub agents: Roster<Agent>,
    pub history: Roster<Vec<HistoryPoint>>,
    /// Oldest first.
    pub trades: Vec<Trade>,
}

/// Deserialize a response body that must be a JSON object. Derived struct
/// impls also accept a sequence, which no endpoint ever sends.
pub(crate) fn parse_object<T: DeserializeOwned>(body: &[u8]) -> Result<T, serde_json::Error> {
    let value: Value = serde_json::from_slice(body)?;
    let unexpected = match &value {
        Value::Object(_) => return serde_json::from_value(value),
        Value::Null => Unexpected::Unit,
        Value::Bool(b) => Unexpected::Bool(*b),
        Value::Number(_) => Unexpected::Other("number"),
        Value::String(s) => Unexpected::Str(s),
        Value::Array(_) => Unexpected::Seq,
    };
    Err(de::Error::invalid_type(unexpected, &"a JSON object"))
}

impl Snapshot {
    /// Parse a full response body. Either the whole body parses or nothing is returned.
    pub fn from_body(body: &[u8]) -> Result<Self, serde_json::Error> {
        let mut snapshot: Snapshot = parse_object(body)?;
        snapshot.id = SnapshotId::of(body);
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    const BODY: &str = r##"{
        "agents": {
            "ProAgent": {"cash": 2500.5, "portfolio_value": 12000.0, "revenue": 2000.0,
                         "color": "#2ecc71", "description": "RSI + MACD",
                         "holdings": {"AAPL": 10, "MSFT": 0}, "start_value": 10000},
            "BasicAgent": {"cash": 9000.0, "portfolio_value": 9000.0,
                           "color": "#3498db", "description": "SMA crossover"}
        },
        "history": {
            "ProAgent": [{"date": "2024-03-01T14:05:09.123456", "value": 10000.0},
                         {"date": "2024-03-02T14:05:09", "value": 12000.0}],
            "BasicAgent": [{"date": "2024-03-01T14:05:09.123456", "value": 9000.0}]
        },
        "trades": [
            {"date": "2024-03-01T14:05:09.123456", "agent": "ProAgent", "symbol": "AAPL",
             "action": "BUY", "shares": 10, "price": 181.25, "total": 1812.5}
        ]
    }"##;

    #[test]
    fn test_parse_backend_payload() {
        let snap = Snapshot::from_body(BODY.as_bytes()).unwrap();
        assert_eq!(snap.agents.len(), 2);
        let pro = snap.agents.get("ProAgent").unwrap();
        assert_eq!(pro.portfolio_value, 12000.0);
        assert_eq!(pro.revenue, Some(2000.0));
        assert_eq!(pro.open_positions(), 1);
        assert_eq!(snap.agents.get("BasicAgent").unwrap().revenue, None);
        assert_eq!(snap.trades[0].action, TradeAction::Buy);
        assert_eq!(snap.trades[0].total, Some(1812.5));
        assert_eq!(snap.id.as_str().len(), 64);
    }

    #[test]
    fn test_roster_keeps_wire_order() {
        let snap = Snapshot::from_body(BODY.as_bytes()).unwrap();
        let names: Vec<&str> = snap.agents.names().collect();
        assert_eq!(names, vec!["ProAgent", "BasicAgent"]);
        assert_eq!(snap.history.first().unwrap().0, "ProAgent");
    }

    #[test]
    fn test_roster_duplicate_key_keeps_position() {
        let roster: Roster<u32> = serde_json::from_str(r#"{"b": 1, "a": 2, "b": 3}"#).unwrap();
        let pairs: Vec<(&str, u32)> = roster.iter().map(|(k, v)| (k, *v)).collect();
        assert_eq!(pairs, vec![("b", 3), ("a", 2)]);
    }

    #[test]
    fn test_empty_sections_parse() {
        let snap = Snapshot::from_body(br#"{"agents": {}, "history": {}, "trades": []}"#).unwrap();
        assert!(snap.agents.is_empty());
        assert!(snap.history.is_empty());
        assert!(snap.trades.is_empty());
    }

    #[test]
    fn test_body_that_is_not_a_snapshot_is_rejected() {
        assert!(Snapshot::from_body(b"[]").is_err());
        assert!(Snapshot::from_body(b"[{}, {}, []]").is_err());
        assert!(Snapshot::from_body(b"{}").is_err());
        assert!(Snapshot::from_body(b"null").is_err());
        assert!(Snapshot::from_body(br#"{"error": "backend exploded"}"#).is_err());
        assert!(Snapshot::from_body(br#"{"agents": {}, "history": {}}"#).is_err());
    }

    #[test]
    fn test_malformed_body_is_error() {
        assert!(Snapshot::from_body(b"{\"agents\": [1, 2]}").is_err());
        assert!(Snapshot::from_body(b"<html>").is_err());
        let bad_action = r#"{"agents": {}, "history": {}, "trades": [{"agent": "A", "action": "HOLD", "shares": 1,
            "symbol": "X", "price": 1.0, "date": "2024-01-01T00:00:00"}]}"#;
        assert!(Snapshot::from_body(bad_action.as_bytes()).is_err());
    }

    #[test]
    fn test_identical_bodies_share_id() {
        let a = Snapshot::from_body(BODY.as_bytes()).unwrap();
        let b = Snapshot::from_body(BODY.as_bytes()).unwrap();
        let c = Snapshot::from_body(br#"{"agents": {}, "history": {}, "trades": []}"#).unwrap();
        assert_eq!(a.id, b.id);
        assert_ne!(a.id, c.id);
        assert_eq!(a.id.short().len(), 12);
    }

    #[test]
    fn test_stamp_formats() {
        let naive = Stamp::parse("2024-03-01T14:05:09.123456").unwrap();
        assert_eq!(naive.naive().hour(), 14);
        assert_eq!(naive.date_label(), "2024-03-01");
        assert_eq!(naive.time_of_day(), "14:05:09");

        assert!(Stamp::parse("2024-03-01 14:05:09").is_some());
        assert!(Stamp::parse("2024-03-01").is_some());
        assert!(Stamp::parse("2024-03-01T14:05:09Z").is_some());
        assert!(Stamp::parse("yesterday").is_none());

        let from_ms: Stamp = serde_json::from_str("1709301909000").unwrap();
        assert!(from_ms.naive().and_utc().timestamp() != 0);
    }

    #[test]
    fn test_stamp_ordering_follows_time() {
        let early = Stamp::parse("2024-03-01T09:00:00").unwrap();
        let late = Stamp::parse("2024-03-01T17:30:00").unwrap();
        assert!(early < late);
    }
}
