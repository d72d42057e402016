//! Fetch one snapshot and print the three views as plain text.
//!
//! Exits 1 when the backend cannot be reached or returns garbage.

use std::process::ExitCode;

use anyhow::Result;

use agentboard::backend::{Backend, HttpBackend};
use agentboard::config::Config;
use agentboard::dashboard::Dashboard;
use agentboard::logging::log_fetch_failure;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cfg = Config::from_env();
    let endpoints = cfg.endpoints()?;
    let backend = HttpBackend::new(endpoints, cfg.http_timeout())?;

    let snapshot = match backend.fetch_stats().await {
        Ok(snapshot) => snapshot,
        Err(err) => {
            log_fetch_failure(backend.endpoints().stats.as_str(), err.kind(), &err.to_string());
            eprintln!("[board_once] {}", err);
            return Ok(ExitCode::from(1));
        }
    };

    let mut board = Dashboard::default();
    board.apply(&snapshot);

    println!("snapshot {}", snapshot.id.short());
    println!();
    println!("{:<5} {:<20} {:>12} {:>9} {:>11} {:>12}", "RANK", "AGENT", "VALUE", "RETURN", "REVENUE", "CASH");
    for row in board.leaderboard.rows() {
        println!(
            "{:<5} {:<20} {:>12} {:>9} {:>11} {:>12}",
            row.rank_display(),
            row.name,
            row.value_display(),
            row.return_display(),
            row.revenue_display(),
            row.cash_display(),
        );
    }

    println!();
    match (board.chart.labels().first(), board.chart.labels().last()) {
        (Some(first), Some(last)) => println!(
            "history: {} series, {} points, {} .. {}",
            board.chart.series().len(),
            board.chart.axis().len(),
            first,
            last
        ),
        _ => println!("history: none"),
    }

    println!();
    for line in board.trade_feed.lines() {
        println!("{} {:<4} {:<20} {}", line.time, line.action.as_str(), line.agent, line.detail());
    }

    Ok(ExitCode::SUCCESS)
}
