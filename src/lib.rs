//! ip_location_updater library: transactional IP geolocation reference updates
//!
//! This library downloads a public IP-to-location dataset, loads it into a
//! staging table inside one transaction, and atomically renames the staging
//! table over the canonical `ip_locations` table in a second transaction.
//! Readers always see either the previous complete dataset or the new one,
//! never a partial load.
//!
//! # Example
//!
//! ```no_run
//! use ip_location_updater::{run_update, Config};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config {
//!     db_path: std::path::PathBuf::from("./ip_locations.db"),
//!     ..Config::from_env()
//! };
//!
//! let report = run_update(&config).await?;
//! println!("Loaded {} rows in {:.2}s",
//!          report.rows_loaded, report.elapsed_seconds);
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime. Use `#[tokio::main]` in your
//! application or ensure you're calling library functions within an async
//! context.

#![warn(missing_docs)]

pub mod config;
mod error_handling;
mod fetch;
pub mod initialization;
mod lookup;
mod record;
mod run;
mod scheduler;
mod storage;

// Re-export public API
pub use config::{Config, LogFormat, LogLevel, RetryPolicy};
pub use error_handling::{InitializationError, UpdateError};
pub use fetch::fetch_dataset;
pub use lookup::{lookup_ip, LocationMatch};
pub use record::{ip_key, key_to_ip, parse_dataset, LocationRecord};
pub use run::{run_update, UpdateReport};
pub use scheduler::{
    parse_target_time, FlightPermit, SingleFlight, TriggerOutcome, UpdateScheduler,
};
pub use storage::{
    acquire_connection, load_staging, observe_state, promote, retry_connect, StagingHandle,
    TableState,
};
