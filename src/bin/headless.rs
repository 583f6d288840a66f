//! Headless engine driver emitting schedule updates as NDJSON on stdout.
//!
//! Runs the synchronization engine without any UI: each published event is
//! written to stdout as one JSON line for an embedding shell process to
//! consume. All tracing output goes to stderr (and, when configured, a
//! rolling log file) so that stdout remains a clean protocol channel.
//!
//! Usage: `marquee-headless [config.toml]` — with no argument the default
//! config location is used, falling back to built-in defaults.

use marquee::{EngineEvent, ScheduleEngine, ShellConfig};
use std::io::Write;
use std::path::PathBuf;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = ShellConfig::load(config_path.as_deref())
        .map_err(|e| anyhow::anyhow!("cannot load configuration: {e}"))?;

    // Guard must stay alive for the file writer to flush.
    let _file_guard = init_tracing(&config);

    tracing::info!("marquee-headless starting");

    let (events_tx, mut events_rx) = mpsc::unbounded_channel();
    let engine = ScheduleEngine::new(&config, events_tx).map_err(|e| {
        tracing::error!(error = %e, "cannot start schedule engine");
        anyhow::anyhow!("cannot start schedule engine: {e}")
    })?;
    let cancel = CancellationToken::new();
    let engine_task = engine.run(cancel.clone());

    let stdout = std::io::stdout();
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("shutdown requested");
                cancel.cancel();
                break;
            }
            event = events_rx.recv() => match event {
                Some(event) => {
                    let line = event_to_json(&event);
                    let mut out = stdout.lock();
                    writeln!(out, "{line}")?;
                }
                None => break,
            }
        }
    }

    engine_task
        .await
        .map_err(|e| anyhow::anyhow!("engine task failed: {e}"))?;

    tracing::info!("marquee-headless shut down cleanly");
    Ok(())
}

/// Initialise tracing to stderr, plus a daily-rolling file when configured.
fn init_tracing(config: &ShellConfig) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer);

    match &config.log.directory {
        Some(directory) => {
            let appender = tracing_appender::rolling::daily(directory, &config.log.file_prefix);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(writer)
                        .with_ansi(false),
                )
                .init();
            Some(guard)
        }
        None => {
            registry.init();
            None
        }
    }
}

/// Serialise one engine event as a protocol line.
fn event_to_json(event: &EngineEvent) -> serde_json::Value {
    match event {
        EngineEvent::Updated(update) => serde_json::json!({
            "type": "updated",
            "fetched_at": update.fetched_at.to_rfc3339(),
            "schedule": &*update.snapshot,
            "changes": &update.changes,
        }),
        EngineEvent::FetchFailed { at, stage, message } => serde_json::json!({
            "type": "fetch_failed",
            "at": at.to_rfc3339(),
            "stage": stage,
            "message": message,
        }),
    }
}
