//! Operational entry point for the full reindex task.
//!
//! One task, no parameters beyond a verbosity flag: run the whole pipeline
//! to completion or first error, reporting textual progress through
//! `tracing`. CLI argument parsing and task registration belong to the host
//! application; this module is what it calls.

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::engine::SearchSync;
use crate::error::SyncError;
use crate::reindex::ReindexReport;

/// Install a global log subscriber at `info` (or `debug` when verbose).
///
/// Safe to call more than once; later calls are no-ops. Respects an
/// existing `RUST_LOG` over the verbosity flag.
pub fn init_logging(verbose: bool) {
    let fallback = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .try_init();
}

/// Run the full reindex task.
///
/// Surfaces the first error and stops; no retry at this layer.
pub async fn run_reindex(engine: &SearchSync, verbose: bool) -> Result<ReindexReport, SyncError> {
    init_logging(verbose);
    info!("starting full reindex");
    match engine.reindex().await {
        Ok(report) => {
            info!(
                total = report.total,
                indexed = report.indexed,
                pages = report.pages,
                dropped = report.dropped,
                created = report.created,
                "reindex finished"
            );
            Ok(report)
        }
        Err(err) => {
            error!(error = %err, "reindex failed");
            Err(err)
        }
    }
}
