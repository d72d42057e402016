//! Live terminal dashboard for a paper-trading agent competition.
//!
//! Polls the backend's `/api/stats` snapshot, fans each snapshot out to the
//! leaderboard, the portfolio chart and the trade feed, and lets the user
//! kick off a trade cycle through `/api/trade`.

pub mod backend;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod logging;
pub mod refresh;
pub mod schedule;
pub mod snapshot;
pub mod trigger;
pub mod ui;
pub mod views;
pub mod widgets;
