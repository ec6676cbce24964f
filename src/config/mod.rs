//! Application configuration and constants.
//!
//! This module provides:
//! - Configuration constants (table names, retry budgets, timeouts)
//! - The library [`Config`] and its environment loading
//! - CLI option value types

mod constants;
mod types;

// Re-export all constants
pub use constants::*;
pub use types::{Config, LogFormat, LogLevel, RetryPolicy};
