//! End-to-end update run: connect, fetch, stage, promote.

use std::path::PathBuf;
use std::time::Instant;

use log::{info, warn};
use sqlx::{Connection, SqliteConnection};

use crate::config::Config;
use crate::error_handling::UpdateError;
use crate::fetch::fetch_dataset;
use crate::storage::{acquire_connection, load_staging, promote};

/// Summary of one completed update run.
#[derive(Debug, Clone)]
pub struct UpdateReport {
    /// Rows now live in the canonical table.
    pub rows_loaded: usize,
    /// Whether this run created the canonical table for the first time.
    pub bootstrap: bool,
    /// Database the run wrote to.
    pub db_path: PathBuf,
    /// Wall-clock duration of the whole run.
    pub elapsed_seconds: f64,
}

/// Runs one full update: fetch the dataset, load it into staging, promote.
///
/// The run either completes and the canonical table holds the new dataset,
/// or it fails and the canonical table is exactly what it was before. The
/// two transactions (load, promote) are the only write points; everything
/// before them is read-only preparation.
pub async fn run_update(config: &Config) -> Result<UpdateReport, UpdateError> {
    let started = Instant::now();
    info!("Starting update run against {}", config.db_path.display());

    let mut conn = acquire_connection(config).await?;
    let outcome = run_pipeline(&mut conn, config).await;

    // Close on every exit path; a failed pipeline must not leak the handle
    if let Err(err) = conn.close().await {
        warn!("Closing storage connection failed: {}", err);
    }
    let (rows_loaded, bootstrap) = outcome?;

    let elapsed_seconds = started.elapsed().as_secs_f64();
    info!(
        "Update run finished in {:.2}s with {} rows live",
        elapsed_seconds, rows_loaded
    );
    Ok(UpdateReport {
        rows_loaded,
        bootstrap,
        db_path: config.db_path.clone(),
        elapsed_seconds,
    })
}

async fn run_pipeline(
    conn: &mut SqliteConnection,
    config: &Config,
) -> Result<(usize, bool), UpdateError> {
    let raw = fetch_dataset(&config.dataset_url).await?;
    let staged = load_staging(conn, &raw).await?;
    let rows = staged.rows();
    let bootstrap = staged.bootstrap();
    promote(conn, staged).await?;
    Ok((rows, bootstrap))
}
