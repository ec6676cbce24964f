//! SQLite storage: connection retry, schema probes, staged loading, and
//! atomic promotion.
//!
//! The update pipeline never writes to the canonical table directly. A run
//! builds `ip_locations_new` inside one transaction ([`load_staging`]), then
//! a second transaction renames it over `ip_locations` ([`promote`]). Between
//! runs the database holds at most the canonical table; staging and retired
//! tables are transient and any debris from an interrupted run is dropped on
//! the next one.

mod connect;
mod schema;
mod staging;
mod swap;

pub use connect::{acquire_connection, retry_connect};
pub use schema::{observe_state, TableState};
pub use staging::{load_staging, StagingHandle};
pub use swap::promote;
