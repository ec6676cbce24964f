//! Configuration constants.
//!
//! This module defines the defaults used throughout the application:
//! table names, retry budgets, timeouts, and dataset field limits.

use std::time::Duration;

// Table names
/// Canonical table readers query. Created once, then only ever replaced as a
/// whole by promotion.
pub const CANONICAL_TABLE: &str = "ip_locations";
/// Staging table each run builds. Never visible under the canonical name and
/// safe to discard at any time.
pub const STAGING_TABLE: &str = "ip_locations_new";
/// Name the outgoing canonical table holds briefly during promotion.
pub const RETIRED_TABLE: &str = "ip_locations_old";

// Defaults and their environment overrides
/// Default SQLite database path.
pub const DB_PATH: &str = "./ip_locations.db";
/// Default dataset source URL.
pub const DATASET_URL: &str =
    "https://docs.google.com/uc?export=download&id=1jSFgZC37plw90CkioEsKvunaeMKUv_rq";
/// Environment variable overriding the database path.
pub const ENV_DB_PATH: &str = "IP_LOCATIONS_DB_PATH";
/// Environment variable overriding the dataset URL.
pub const ENV_DATASET_URL: &str = "IP_LOCATIONS_DATASET_URL";

// Connection retry budget
/// Connection attempts before the run fails (including the first).
pub const CONNECT_MAX_ATTEMPTS: u32 = 10;
/// Fixed delay between connection attempts.
pub const CONNECT_RETRY_DELAY: Duration = Duration::from_secs(3);

/// Dataset download timeout.
///
/// Covers the whole request, from connect to the last body byte.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(300);

/// Rows per staging INSERT statement.
///
/// Each row binds ten parameters; 500 rows is 5000 binds, well under
/// SQLite's 32766 bind parameter limit.
pub const INSERT_BATCH_SIZE: usize = 500;

// Daily schedule
/// Default daily update time (UTC), `HH:MM`.
pub const DEFAULT_SCHEDULE_AT: &str = "02:00";
/// How often the scheduling loop checks the wall clock.
pub const SCHEDULE_POLL_INTERVAL: Duration = Duration::from_secs(60);

// Dataset field limits, enforced by the loader before insert
/// Required length of the country code.
pub const COUNTRY_CODE_LEN: usize = 2;
/// Longest accepted city or region name.
pub const MAX_NAME_LEN: usize = 255;
/// Longest accepted postal code.
pub const MAX_POSTAL_CODE_LEN: usize = 10;
/// Longest accepted timezone name.
pub const MAX_TIMEZONE_LEN: usize = 50;
