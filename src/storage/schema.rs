//! Table and index definitions shared by the canonical and staging tables.
//!
//! Both tables are created with the same shape: ten columns and an inline
//! `CHECK (start_ip <= end_ip)`. SQLite cannot add a constraint to an
//! existing table, so the check rides the CREATE TABLE and aborts the load
//! transaction on the first violating insert.

use std::sync::atomic::{AtomicU64, Ordering};

use sqlx::SqliteConnection;

use crate::config::{CANONICAL_TABLE, STAGING_TABLE};

/// Observable state of the canonical/staging table pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableState {
    /// Neither table exists. Only seen before the first successful run.
    Absent,
    /// A staging table exists and is ready to promote.
    Staged {
        /// Whether a canonical table exists alongside it. False only while
        /// bootstrapping an empty database.
        canonical_exists: bool,
    },
    /// Only the canonical table exists; nothing is staged.
    Promoted,
}

/// Probes `sqlite_master` for the current [`TableState`].
///
/// Run inside a transaction when the answer has to stay true for subsequent
/// statements.
pub async fn observe_state(conn: &mut SqliteConnection) -> Result<TableState, sqlx::Error> {
    let canonical = table_exists(conn, CANONICAL_TABLE).await?;
    let staging = table_exists(conn, STAGING_TABLE).await?;
    Ok(match (canonical, staging) {
        (_, true) => TableState::Staged {
            canonical_exists: canonical,
        },
        (true, false) => TableState::Promoted,
        (false, false) => TableState::Absent,
    })
}

pub(crate) async fn table_exists(
    conn: &mut SqliteConnection,
    table: &str,
) -> Result<bool, sqlx::Error> {
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?")
            .bind(table)
            .fetch_one(conn)
            .await?;
    Ok(count > 0)
}

pub(crate) async fn drop_table_if_exists(
    conn: &mut SqliteConnection,
    table: &str,
) -> Result<(), sqlx::Error> {
    // Dropping a table drops its indexes with it
    sqlx::query(&format!("DROP TABLE IF EXISTS {}", table))
        .execute(conn)
        .await?;
    Ok(())
}

static GENERATION_SEQ: AtomicU64 = AtomicU64::new(0);

/// Returns a process-unique token used to suffix index names.
///
/// SQLite keeps index names in one per-database namespace, and a promoted
/// table keeps the index names its staging build created. Suffixing each
/// build's index names with a fresh token keeps the next build's CREATE INDEX
/// statements from colliding with them.
pub(crate) fn next_generation() -> String {
    let seq = GENERATION_SEQ.fetch_add(1, Ordering::Relaxed);
    format!("{}_{}", chrono::Utc::now().timestamp_millis(), seq)
}

/// Creates `table` with the full column set and the range check.
pub(crate) async fn create_table(
    conn: &mut SqliteConnection,
    table: &str,
) -> Result<(), sqlx::Error> {
    let ddl = format!(
        "CREATE TABLE {} (
            start_ip BLOB NOT NULL,
            end_ip BLOB NOT NULL,
            network_ip BLOB,
            city TEXT,
            region TEXT,
            country TEXT NOT NULL,
            latitude REAL,
            longitude REAL,
            postal_code TEXT,
            timezone TEXT,
            CHECK (start_ip <= end_ip)
        )",
        table
    );
    sqlx::query(&ddl).execute(conn).await?;
    Ok(())
}

/// Creates the three lookup indexes on `table`, names suffixed with
/// `generation`.
///
/// Same shape the readers rely on: start, end, and the composite range, each
/// partial over non-null keys.
pub(crate) async fn create_indexes(
    conn: &mut SqliteConnection,
    table: &str,
    generation: &str,
) -> Result<(), sqlx::Error> {
    let statements = [
        format!(
            "CREATE INDEX idx_{table}_start_{generation} ON {table} (start_ip) \
             WHERE start_ip IS NOT NULL"
        ),
        format!(
            "CREATE INDEX idx_{table}_end_{generation} ON {table} (end_ip) \
             WHERE end_ip IS NOT NULL"
        ),
        format!(
            "CREATE INDEX idx_{table}_range_{generation} ON {table} (start_ip, end_ip) \
             WHERE start_ip IS NOT NULL AND end_ip IS NOT NULL"
        ),
    ];
    for ddl in &statements {
        sqlx::query(ddl).execute(&mut *conn).await?;
    }
    Ok(())
}

/// Creates `table` fully formed: columns, range check, and all three indexes.
///
/// Used for the canonical table on bootstrap so an observer never sees it
/// half-built.
pub(crate) async fn create_table_with_indexes(
    conn: &mut SqliteConnection,
    table: &str,
    generation: &str,
) -> Result<(), sqlx::Error> {
    create_table(&mut *conn, table).await?;
    create_indexes(conn, table, generation).await
}
