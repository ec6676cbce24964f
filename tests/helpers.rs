// Shared test helpers for dataset fixtures and mock dataset servers.
//
// This module provides common utilities used across multiple test files to reduce duplication.

use std::path::Path;
use std::time::Duration;

use httptest::{matchers::request, responders::status_code, Expectation, Server};
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::{ConnectOptions, SqliteConnection};

use ip_location_updater::{Config, RetryPolicy};

/// Header row every fixture dataset starts with.
#[allow(dead_code)] // Used by other test files
pub const DATASET_HEADER: &str =
    "start_ip,end_ip,network_ip,city,region,country,latitude,longitude,postal_code,timezone";

/// A small dataset with an IPv4 range, a quoted city, and an IPv6 range.
#[allow(dead_code)] // Used by other test files
pub fn sample_dataset() -> String {
    format!(
        "{}\n\
         1.0.0.1,1.0.0.255,1.0.0.0,Amsterdam,North Holland,NL,52.37,4.89,1012,Europe/Amsterdam\n\
         8.8.8.0,8.8.8.255,,\"Washington, D.C.\",,US,38.89,-77.03,20001,America/New_York\n\
         2001:db8::1,2001:db8::ffff,,Reykjavik,Capital Region,IS,64.14,-21.94,101,Atlantic/Reykjavik\n",
        DATASET_HEADER
    )
}

/// URL of the mock server's dataset endpoint.
#[allow(dead_code)] // Used by other test files
pub fn dataset_url(server: &Server) -> String {
    format!("http://{}/dataset.csv", server.addr())
}

/// Serves `body` from the mock server's dataset endpoint, `times` fetches expected.
#[allow(dead_code)] // Used by other test files
pub fn serve_dataset(server: &Server, body: String, times: usize) {
    server.expect(
        Expectation::matching(request::method_path("GET", "/dataset.csv"))
            .times(times)
            .respond_with(status_code(200).body(body)),
    );
}

/// Library config pointing at a test database and dataset URL.
///
/// Retries are kept short so connection-failure tests finish quickly.
#[allow(dead_code)] // Used by other test files
pub fn test_config(db_path: &Path, dataset_url: String) -> Config {
    Config {
        db_path: db_path.to_path_buf(),
        dataset_url,
        connect_retry: RetryPolicy {
            max_attempts: 3,
            delay: Duration::ZERO,
        },
        ..Config::default()
    }
}

/// Opens a plain connection to an on-disk test database.
#[allow(dead_code)] // Used by other test files
pub async fn open_db(db_path: &Path) -> SqliteConnection {
    SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .connect()
        .await
        .expect("Failed to open test database")
}

/// Number of rows in `table`.
#[allow(dead_code)] // Used by other test files
pub async fn table_count(conn: &mut SqliteConnection, table: &str) -> i64 {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
        .fetch_one(conn)
        .await
        .expect("Failed to count rows")
}

/// Whether `table` exists in the database.
#[allow(dead_code)] // Used by other test files
pub async fn table_exists(conn: &mut SqliteConnection, table: &str) -> bool {
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?")
            .bind(table)
            .fetch_one(conn)
            .await
            .expect("Failed to probe sqlite_master");
    count > 0
}

/// Number of indexes attached to `table`.
#[allow(dead_code)] // Used by other test files
pub async fn index_count(conn: &mut SqliteConnection, table: &str) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM sqlite_master WHERE type = 'index' AND tbl_name = ?")
        .bind(table)
        .fetch_one(conn)
        .await
        .expect("Failed to count indexes")
}
