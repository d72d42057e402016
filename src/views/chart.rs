//! Portfolio-value chart and its persistent owner.
//!
//! The chart is mounted once, on the first snapshot that carries any history,
//! and from then on only ever mutated in place: labels and series are swapped
//! and `revision` is bumped. It is never torn down.
//!
//! Series are keyed by date rather than by position. The x axis is the sorted
//! union of every date present in any agent's history, and an agent with no
//! sample at a given date has a gap there.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use crate::logging::{log, obj, v_str, Domain, Level};
use crate::snapshot::{Agent, HistoryPoint, Roster, SnapshotId, Stamp};

/// Used when a history key has no matching agent (or the agent has no colour).
pub const FALLBACK_SERIES_COLOR: &str = "#888888";

#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub name: String,
    pub color: String,
    /// One slot per axis date.
    pub points: Vec<Option<f64>>,
}

impl Series {
    /// `(axis index, value)` pairs, skipping gaps.
    pub fn plotted(&self) -> Vec<(f64, f64)> {
        self.points
            .iter()
            .enumerate()
            .filter_map(|(i, v)| v.map(|v| (i as f64, v)))
            .collect()
    }
}

/// Chart contents derived from one snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartData {
    pub axis: Vec<Stamp>,
    pub labels: Vec<String>,
    pub series: Vec<Series>,
}

pub fn build_chart_data(history: &Roster<Vec<HistoryPoint>>, agents: &Roster<Agent>) -> ChartData {
    let axis: Vec<Stamp> = history
        .iter()
        .flat_map(|(_, points)| points.iter().map(|p| p.date))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let mut days = HashSet::new();
    let same_day_twice = axis.iter().any(|d| !days.insert(d.naive().date()));
    let labels = axis
        .iter()
        .map(|d| {
            if same_day_twice {
                d.date_time_label()
            } else {
                d.date_label()
            }
        })
        .collect();

    let series = history
        .iter()
        .map(|(name, points)| {
            // Later samples for the same date win.
            let by_date: BTreeMap<Stamp, f64> = points.iter().map(|p| (p.date, p.value)).collect();
            Series {
                name: name.to_string(),
                color: series_color(name, agents),
                points: axis.iter().map(|d| by_date.get(d).copied()).collect(),
            }
        })
        .collect();

    ChartData { axis, labels, series }
}

fn series_color(name: &str, agents: &Roster<Agent>) -> String {
    match agents.get(name) {
        Some(agent) if !agent.color.trim().is_empty() => agent.color.clone(),
        found => {
            log(
                Level::Warn,
                Domain::Render,
                "series_color_fallback",
                obj(&[
                    ("agent", v_str(name)),
                    (
                        "reason",
                        v_str(if found.is_some() { "no_color" } else { "unknown_agent" }),
                    ),
                ]),
            );
            FALLBACK_SERIES_COLOR.to_string()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct ChartFrame {
    axis: Vec<Stamp>,
    labels: Vec<String>,
    series: Vec<Series>,
    source: SnapshotId,
    revision: u64,
}

/// Owner of the single chart instance. Callers never see the frame itself.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartState {
    frame: Option<ChartFrame>,
    mounts: u64,
}

impl ChartState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false (and touches nothing) when `history` is empty.
    pub fn render(
        &mut self,
        history: &Roster<Vec<HistoryPoint>>,
        agents: &Roster<Agent>,
        source: &SnapshotId,
    ) -> bool {
        if history.is_empty() {
            return false;
        }
        self.update(build_chart_data(history, agents), source);
        true
    }

    /// Mount on first use, otherwise swap contents in place.
    pub fn update(&mut self, data: ChartData, source: &SnapshotId) {
        match self.frame.as_mut() {
            Some(frame) => {
                frame.axis.clear();
                frame.axis.extend(data.axis);
                frame.labels.clear();
                frame.labels.extend(data.labels);
                frame.series.clear();
                frame.series.extend(data.series);
                frame.source = source.clone();
                frame.revision += 1;
            }
            None => {
                log(
                    Level::Info,
                    Domain::Render,
                    "chart_mounted",
                    obj(&[
                        ("snapshot_id", v_str(source.short())),
                        ("series", serde_json::json!(data.series.len())),
                    ]),
                );
                self.frame = Some(ChartFrame {
                    axis: data.axis,
                    labels: data.labels,
                    series: data.series,
                    source: source.clone(),
                    revision: 0,
                });
                self.mounts += 1;
            }
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.frame.is_some()
    }

    /// How many times the chart was constructed. Never exceeds 1.
    pub fn mounts(&self) -> u64 {
        self.mounts
    }

    /// In-place updates since mounting.
    pub fn revision(&self) -> Option<u64> {
        self.frame.as_ref().map(|f| f.revision)
    }

    pub fn axis(&self) -> &[Stamp] {
        self.frame.as_ref().map(|f| f.axis.as_slice()).unwrap_or(&[])
    }

    pub fn labels(&self) -> &[String] {
        self.frame.as_ref().map(|f| f.labels.as_slice()).unwrap_or(&[])
    }

    pub fn series(&self) -> &[Series] {
        self.frame.as_ref().map(|f| f.series.as_slice()).unwrap_or(&[])
    }

    pub fn source(&self) -> Option<&SnapshotId> {
        self.frame.as_ref().map(|f| &f.source)
    }

    /// Min and max over every plotted value.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        let mut values = self
            .series()
            .iter()
            .flat_map(|s| s.points.iter().flatten().copied());
        let first = values.next()?;
        Some(values.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(date: &str, value: f64) -> HistoryPoint {
        HistoryPoint {
            date: Stamp::parse(date).unwrap(),
            value,
        }
    }

    fn agent(color: &str) -> Agent {
        Agent {
            portfolio_value: 10000.0,
            cash: 10000.0,
            revenue: None,
            color: color.to_string(),
            description: String::new(),
            holdings: Default::default(),
        }
    }

    fn two_agent_history() -> (Roster<Vec<HistoryPoint>>, Roster<Agent>) {
        let history: Roster<Vec<HistoryPoint>> = vec![
            (
                "Pro",
                vec![point("2024-03-01T10:00:00", 10000.0), point("2024-03-02T10:00:00", 10100.0)],
            ),
            (
                "Basic",
                vec![point("2024-03-01T10:00:00", 10000.0), point("2024-03-02T10:00:00", 9900.0)],
            ),
        ]
        .into_iter()
        .collect();
        let agents: Roster<Agent> = vec![("Pro", agent("#2ecc71")), ("Basic", agent("#3498db"))]
            .into_iter()
            .collect();
        (history, agents)
    }

    #[test]
    fn test_first_render_mounts_chart() {
        let (history, agents) = two_agent_history();
        let mut chart = ChartState::new();
        assert!(chart.render(&history, &agents, &SnapshotId::of(b"1")));
        assert!(chart.is_mounted());
        assert_eq!(chart.mounts(), 1);
        assert_eq!(chart.revision(), Some(0));
        assert_eq!(chart.labels(), &["2024-03-01".to_string(), "2024-03-02".to_string()]);
        assert_eq!(chart.series().len(), 2);
        assert_eq!(chart.series()[0].name, "Pro");
        assert_eq!(chart.series()[0].color, "#2ecc71");
        assert_eq!(chart.series()[1].points, vec![Some(10000.0), Some(9900.0)]);
    }

    #[test]
    fn test_later_renders_update_in_place() {
        let (history, agents) = two_agent_history();
        let mut chart = ChartState::new();
        chart.render(&history, &agents, &SnapshotId::of(b"1"));
        chart.render(&history, &agents, &SnapshotId::of(b"2"));
        chart.render(&history, &agents, &SnapshotId::of(b"3"));
        assert_eq!(chart.mounts(), 1);
        assert_eq!(chart.revision(), Some(2));
        assert_eq!(chart.source(), Some(&SnapshotId::of(b"3")));
    }

    #[test]
    fn test_empty_history_leaves_chart_untouched() {
        let (history, agents) = two_agent_history();
        let mut chart = ChartState::new();
        chart.render(&history, &agents, &SnapshotId::of(b"1"));
        let before = chart.clone();

        assert!(!chart.render(&Roster::new(), &agents, &SnapshotId::of(b"2")));
        assert_eq!(chart, before);

        let mut unmounted = ChartState::new();
        assert!(!unmounted.render(&Roster::new(), &agents, &SnapshotId::of(b"3")));
        assert!(!unmounted.is_mounted());
    }

    #[test]
    fn test_stale_series_are_removed() {
        let (history, agents) = two_agent_history();
        let mut chart = ChartState::new();
        chart.render(&history, &agents, &SnapshotId::of(b"1"));

        let only_pro: Roster<Vec<HistoryPoint>> =
            vec![("Pro", vec![point("2024-03-03T10:00:00", 10200.0)])].into_iter().collect();
        chart.render(&only_pro, &agents, &SnapshotId::of(b"2"));
        let names: Vec<&str> = chart.series().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Pro"]);
        assert_eq!(chart.labels().len(), 1);
    }

    #[test]
    fn test_uneven_histories_align_by_date() {
        let history: Roster<Vec<HistoryPoint>> = vec![
            ("Late", vec![point("2024-03-02T10:00:00", 10050.0)]),
            (
                "Early",
                vec![point("2024-03-01T10:00:00", 10000.0), point("2024-03-03T10:00:00", 9800.0)],
            ),
        ]
        .into_iter()
        .collect();
        let agents: Roster<Agent> = vec![("Late", agent("red")), ("Early", agent("blue"))]
            .into_iter()
            .collect();

        let data = build_chart_data(&history, &agents);
        assert_eq!(data.axis.len(), 3);
        assert_eq!(data.series[0].points, vec![None, Some(10050.0), None]);
        assert_eq!(data.series[1].points, vec![Some(10000.0), None, Some(9800.0)]);
        assert_eq!(data.series[1].plotted(), vec![(0.0, 10000.0), (2.0, 9800.0)]);
    }

    #[test]
    fn test_same_day_points_get_time_labels() {
        let history: Roster<Vec<HistoryPoint>> = vec![(
            "Pro",
            vec![point("2024-03-01T10:00:00", 1.0), point("2024-03-01T10:05:00", 2.0)],
        )]
        .into_iter()
        .collect();
        let data = build_chart_data(&history, &Roster::new());
        assert_eq!(data.labels, vec!["2024-03-01 10:00", "2024-03-01 10:05"]);
    }

    #[test]
    fn test_unknown_agent_gets_fallback_color() {
        let history: Roster<Vec<HistoryPoint>> =
            vec![("Ghost", vec![point("2024-03-01T10:00:00", 1.0)])].into_iter().collect();
        let mut chart = ChartState::new();
        assert!(chart.render(&history, &Roster::new(), &SnapshotId::of(b"1")));
        assert_eq!(chart.series()[0].color, FALLBACK_SERIES_COLOR);
    }

    #[test]
    fn test_value_range() {
        let (history, agents) = two_agent_history();
        let mut chart = ChartState::new();
        assert_eq!(chart.value_range(), None);
        chart.render(&history, &agents, &SnapshotId::of(b"1"));
        assert_eq!(chart.value_range(), Some((9900.0, 10100.0)));
    }
}
