//! Error types for the update pipeline and process initialization.

use std::fmt;

use log::SetLoggerError;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),
}

/// Errors an update run can fail with.
///
/// Each variant marks one stage of the pipeline. All of them are fatal to the
/// current run only; the canonical table is left as it was before the run,
/// except that a successful promotion has already replaced it by the time
/// `run_update` returns.
#[derive(Error, Debug)]
pub enum UpdateError {
    /// The storage connection could not be established within the retry
    /// budget. Nothing else was attempted.
    #[error("storage connection failed after {attempts} attempts: {source}")]
    Connection {
        /// Attempts made before giving up.
        attempts: u32,
        /// Failure of the final attempt.
        #[source]
        source: sqlx::Error,
    },

    /// Dataset retrieval failed: transport error, timeout, or a non-success
    /// HTTP status.
    #[error("dataset retrieval failed: {0}")]
    Network(#[from] reqwest::Error),

    /// The dataset could not be loaded into staging. The load transaction
    /// was rolled back; messages name the offending data row where known.
    #[error("dataset load failed: {0}")]
    Data(String),

    /// The promotion transaction failed. The previously active canonical
    /// table is untouched.
    #[error("table swap failed: {0}")]
    Swap(String),
}

impl UpdateError {
    /// A load failure with a free-form message.
    pub(crate) fn data(err: impl fmt::Display) -> Self {
        UpdateError::Data(err.to_string())
    }

    /// A load failure attributed to a 1-based data row.
    pub(crate) fn row(row: usize, err: impl fmt::Display) -> Self {
        UpdateError::Data(format!("row {}: {}", row, err))
    }

    /// A promotion failure with a free-form message.
    pub(crate) fn swap(err: impl fmt::Display) -> Self {
        UpdateError::Swap(err.to_string())
    }
}
