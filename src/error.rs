//! Error types
//!
//! Lane operations themselves never fail; only construction and config
//! loading can.

use thiserror::Error;

/// Errors raised while building a lane.
#[derive(Error, Debug)]
pub enum LaneError {
    /// The OS refused to start the lane's worker thread.
    #[error("failed to start worker for lane {index}")]
    Spawn {
        /// Lane index.
        index: usize,
        /// Underlying spawn error.
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised while loading settings.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Settings file could not be read.
    #[error("failed to read settings: {0}")]
    Io(#[from] std::io::Error),

    /// Settings file is not valid JSON for [`crate::Settings`].
    #[error("failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),

    /// Settings parsed but hold an unusable value.
    #[error("invalid setting `{field}`: {reason}")]
    Invalid {
        /// Offending field name.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}
