use std::sync::Arc;

use anyhow::{Context, Result};

use agentboard::backend::{Backend, HttpBackend, ScriptedBackend};
use agentboard::config::Config;
use agentboard::dashboard::Dashboard;
use agentboard::logging::{log, obj, run_id, v_str, Domain, Level};
use agentboard::refresh::Refresher;
use agentboard::schedule::Schedule;
use agentboard::trigger::TriggerHandler;
use agentboard::ui::{serve_commands, TerminalUi};

/// Live HTTP backend, or an offline replay when `STATS_FILE` is set. Replay
/// has no trade endpoint, so the passive trigger is switched off for it.
fn build_backend(cfg: &Config) -> Result<(Arc<dyn Backend>, String, bool)> {
    match &cfg.stats_file {
        Some(path) => {
            let backend: Arc<dyn Backend> = Arc::new(ScriptedBackend::from_file(path)?);
            Ok((backend, format!("replay: {}", path), false))
        }
        None => {
            let endpoints = cfg.endpoints()?;
            let label = endpoints.stats.to_string();
            let backend: Arc<dyn Backend> = Arc::new(HttpBackend::new(endpoints, cfg.http_timeout())?);
            Ok((backend, label, true))
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cfg = Config::from_env();
    let (backend, label, live) = build_backend(&cfg)?;
    log(
        Level::Info,
        Domain::System,
        "startup",
        obj(&[
            ("run_id", v_str(&run_id())),
            ("backend", v_str(&label)),
            ("refresh_secs", serde_json::json!(cfg.refresh_secs)),
            ("passive_trigger_secs", serde_json::json!(cfg.passive_trigger_secs)),
            ("headless", serde_json::json!(cfg.headless)),
        ]),
    );

    let board = Dashboard::shared();
    let refresher = Refresher::new(backend.clone(), board.clone());
    let trigger = TriggerHandler::new(refresher.clone(), cfg.trigger_silent);
    let passive = cfg.passive_trigger_period().filter(|_| live);
    let schedule = Schedule::start(&refresher, backend, cfg.refresh_period(), passive);

    if cfg.headless {
        tokio::signal::ctrl_c().await.context("waiting for ctrl-c")?;
    } else {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        let ui = TerminalUi::new(board, tx)
            .frame_interval(cfg.frame_interval())
            .backend_label(label);
        let screen = tokio::task::spawn_blocking(move || ui.run());
        serve_commands(rx, trigger).await;
        screen.await.context("terminal thread panicked")??;
    }

    drop(schedule);
    log(Level::Info, Domain::System, "shutdown", obj(&[]));
    Ok(())
}
