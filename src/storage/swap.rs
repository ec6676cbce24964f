//! Atomic promotion of the staging table.
//!
//! Promotion is a second, independent transaction: retire the canonical
//! table, rename staging into its place, drop the retired table, commit.
//! Readers see the previous generation right up to the commit, then the new
//! one; there is no instant at which the canonical name is missing or
//! half-loaded.

use log::info;
use sqlx::{Connection, SqliteConnection};

use crate::config::{CANONICAL_TABLE, RETIRED_TABLE, STAGING_TABLE};
use crate::error_handling::UpdateError;

use super::schema::{self, TableState};
use super::staging::StagingHandle;

/// Promotes the staged table to the canonical name in one transaction.
///
/// The handle is consumed; staging is gone afterwards whether or not the
/// promotion succeeded (on failure it is still staged, but a new run drops
/// and rebuilds it rather than reusing it).
///
/// Tables are always taken canonical first, then staging. Every promoter
/// must keep that order; on engines with table-level locks it is the total
/// lock order that rules out deadlock.
pub async fn promote(
    conn: &mut SqliteConnection,
    staging: StagingHandle,
) -> Result<(), UpdateError> {
    let mut tx = conn.begin().await.map_err(UpdateError::swap)?;

    // A promotion that died between its renames leaves a retired table
    // behind, which would block the rename below on every later run
    schema::drop_table_if_exists(&mut tx, RETIRED_TABLE)
        .await
        .map_err(UpdateError::swap)?;

    match schema::observe_state(&mut tx).await.map_err(UpdateError::swap)? {
        TableState::Staged {
            canonical_exists: true,
        } => {
            rename_table(&mut tx, CANONICAL_TABLE, RETIRED_TABLE).await?;
            rename_table(&mut tx, STAGING_TABLE, CANONICAL_TABLE).await?;
            schema::drop_table_if_exists(&mut tx, RETIRED_TABLE)
                .await
                .map_err(UpdateError::swap)?;
        }
        TableState::Staged {
            canonical_exists: false,
        } => {
            info!("No canonical table yet; promoting staging directly");
            rename_table(&mut tx, STAGING_TABLE, CANONICAL_TABLE).await?;
        }
        state @ (TableState::Absent | TableState::Promoted) => {
            return Err(UpdateError::swap(format!(
                "nothing staged to promote (observed {:?})",
                state
            )));
        }
    }

    tx.commit().await.map_err(UpdateError::swap)?;
    info!(
        "Promoted staging generation {} to {} ({} rows live)",
        staging.generation, CANONICAL_TABLE, staging.rows
    );
    Ok(())
}

async fn rename_table(
    conn: &mut SqliteConnection,
    from: &str,
    to: &str,
) -> Result<(), UpdateError> {
    sqlx::query(&format!("ALTER TABLE {} RENAME TO {}", from, to))
        .execute(conn)
        .await
        .map_err(UpdateError::swap)?;
    Ok(())
}
