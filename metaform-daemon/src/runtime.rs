//! The long-running reconciliation loop.
//!
//! `run` owns three tasks joined on a broadcast shutdown channel:
//!
//! - refresh: one cycle now, then one per `refresh` interval
//! - log rotation (only with `--logfile`)
//! - signal handler (ctrl-c / SIGTERM)
//!
//! A cycle is blocking work (HTTP fetch, file I/O, shell actions), so it runs
//! on the blocking pool. The declaration set moves into the cycle and comes
//! back out, and the next tick is only awaited once it has, so cycles never
//! overlap.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time::MissedTickBehavior;

use metaform_core::discover;
use metaform_renderer::TemplateEngine;
use metaform_sync::{load_all, CycleReport, DeclarationSet};

use crate::config::DaemonConfig;
use crate::error::{io_err, DaemonError};
use crate::log_rotation::LogRotator;
use crate::report;
use crate::source::{HttpMetadataSource, MetadataSource};

const ROTATION_CHECK_EVERY: Duration = Duration::from_secs(5);

/// Install logging, build a runtime, and block until the daemon exits.
pub fn start_blocking(config: DaemonConfig) -> Result<(), DaemonError> {
    crate::logging::init(&config.log)?;
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| io_err("tokio-runtime", e))?;
    runtime.block_on(run(config))
}

/// Load declarations and reconcile against the metadata service until shutdown.
pub async fn run(config: DaemonConfig) -> Result<(), DaemonError> {
    let set = load_declarations(&config.templates)?;
    let source: Arc<dyn MetadataSource> = Arc::new(HttpMetadataSource::new(&config.metadata));
    tracing::info!(
        declarations = set.len(),
        source = %source.describe(),
        refresh_secs = config.refresh.as_secs(),
        "starting metaform daemon"
    );

    let engine = Arc::new(TemplateEngine::new());
    let (shutdown_tx, _) = broadcast::channel::<()>(4);

    let refresh_handle = {
        let shutdown = shutdown_tx.clone();
        let every = config.refresh;
        let rx = shutdown.subscribe();
        tokio::spawn(async move {
            let result = refresh_task(set, engine, source, every, rx).await;
            let _ = shutdown.send(());
            result
        })
    };

    let rotation_handle = {
        let rotator = config.log.logfile.clone().map(LogRotator::new);
        let rx = shutdown_tx.subscribe();
        tokio::spawn(async move {
            match rotator {
                Some(rotator) => log_rotation_task(rotator, rx).await,
                None => Ok(()),
            }
        })
    };

    let signal_handle = {
        let shutdown = shutdown_tx.clone();
        let mut rx = shutdown.subscribe();
        tokio::spawn(async move {
            tokio::select! {
                _ = rx.recv() => Ok(()),
                signal = shutdown_signal() => {
                    signal.map_err(|e| DaemonError::Task(format!("signal handler failed: {e}")))?;
                    tracing::info!("shutdown signal received, stopping");
                    let _ = shutdown.send(());
                    Ok(())
                }
            }
        })
    };

    let (refresh_result, rotation_result, signal_result) =
        tokio::join!(refresh_handle, rotation_handle, signal_handle);

    handle_join("refresh", refresh_result)?;
    handle_join("log_rotation", rotation_result)?;
    handle_join("signal_handler", signal_result)?;
    tracing::info!("metaform daemon stopped");
    Ok(())
}

/// Discover and load every declaration matched by `pattern`.
///
/// Files that fail to load are logged and skipped. Ending up with nothing to
/// reconcile is fatal.
pub fn load_declarations(pattern: &str) -> Result<DeclarationSet, DaemonError> {
    let paths = discover(pattern)?;
    let loaded = load_all(&paths);
    report::log_load_report(&loaded);
    if loaded.set.is_empty() {
        return Err(DaemonError::NoDeclarations {
            pattern: pattern.to_string(),
        });
    }
    Ok(loaded.set)
}

/// One cycle: fetch a snapshot, apply every declaration, log the result.
///
/// A fetch error is returned before any declaration is touched.
pub fn run_cycle(
    set: &mut DeclarationSet,
    engine: &TemplateEngine,
    source: &dyn MetadataSource,
) -> Result<CycleReport, DaemonError> {
    let data = source.fetch()?;
    let cycle = set.apply_all(engine, &data);
    report::log_cycle(&cycle);
    Ok(cycle)
}

/// Run cycles every `every` until a shutdown message arrives.
pub async fn refresh_task(
    mut set: DeclarationSet,
    engine: Arc<TemplateEngine>,
    source: Arc<dyn MetadataSource>,
    every: Duration,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> Result<(), DaemonError> {
    let mut interval = tokio::time::interval(every.max(Duration::from_secs(1)));
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = shutdown_rx.recv() => break,
            _ = interval.tick() => {
                let cycle_engine = engine.clone();
                let cycle_source = source.clone();
                let (returned, result) = tokio::task::spawn_blocking(move || {
                    let result = run_cycle(&mut set, &cycle_engine, cycle_source.as_ref());
                    (set, result)
                })
                .await
                .map_err(|e| DaemonError::Task(format!("refresh cycle join failure: {e}")))?;
                set = returned;

                if let Err(err) = result {
                    tracing::warn!(
                        source = %source.describe(),
                        error = %err,
                        "metadata fetch failed, skipping cycle"
                    );
                }
            }
        }
    }
    Ok(())
}

async fn log_rotation_task(
    rotator: LogRotator,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> Result<(), DaemonError> {
    let mut interval = tokio::time::interval(ROTATION_CHECK_EVERY);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    interval.tick().await;

    loop {
        tokio::select! {
            _ = shutdown_rx.recv() => break,
            _ = interval.tick() => {
                let rotator = rotator.clone();
                // Failures are logged inside; rotation never stops the daemon.
                tokio::task::spawn_blocking(move || rotator.rotate_and_log())
                    .await
                    .ok();
            }
        }
    }
    Ok(())
}

#[cfg(unix)]
async fn shutdown_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate = signal(SignalKind::terminate())?;
    tokio::select! {
        result = tokio::signal::ctrl_c() => result,
        _ = terminate.recv() => Ok(()),
    }
}

#[cfg(not(unix))]
async fn shutdown_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await
}

fn handle_join(
    task: &str,
    result: Result<Result<(), DaemonError>, tokio::task::JoinError>,
) -> Result<(), DaemonError> {
    match result {
        Ok(inner) => inner,
        Err(err) => Err(DaemonError::Task(format!("{task} task join failure: {err}"))),
    }
}
