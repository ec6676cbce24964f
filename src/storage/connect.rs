//! Storage connection acquisition with bounded retry.

use std::future::Future;

use log::{info, warn};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode};
use sqlx::{ConnectOptions, SqliteConnection};

use crate::config::{Config, RetryPolicy};
use crate::error_handling::UpdateError;

/// Retries `connect` until it succeeds or the policy's attempt budget runs
/// out.
///
/// Every failed attempt is logged with its ordinal. The policy delay applies
/// between attempts; the final attempt's failure comes back as
/// [`UpdateError::Connection`] and nothing partial is ever returned.
pub async fn retry_connect<T, F, Fut>(policy: &RetryPolicy, mut connect: F) -> Result<T, UpdateError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, sqlx::Error>>,
{
    let mut attempt = 1u32;
    loop {
        match connect().await {
            Ok(value) => return Ok(value),
            Err(e) => {
                warn!(
                    "Storage connection attempt {}/{} failed: {}",
                    attempt, policy.max_attempts, e
                );
                if attempt >= policy.max_attempts {
                    return Err(UpdateError::Connection {
                        attempts: attempt,
                        source: e,
                    });
                }
                attempt += 1;
                tokio::time::sleep(policy.delay).await;
            }
        }
    }
}

/// Opens the SQLite database at the configured path, retrying per the
/// config's policy.
///
/// The database file is created on first use. WAL journaling is enabled so
/// readers are not blocked while a load transaction is open.
pub async fn acquire_connection(config: &Config) -> Result<SqliteConnection, UpdateError> {
    let options = SqliteConnectOptions::new()
        .filename(&config.db_path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal);

    let conn = retry_connect(&config.connect_retry, || {
        let options = options.clone();
        async move { options.connect().await }
    })
    .await?;

    info!("Connected to storage at {}", config.db_path.display());
    Ok(conn)
}
