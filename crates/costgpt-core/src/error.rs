//! Error types for costgpt
//!
//! This module defines the error types used throughout the costgpt crates.
//! All errors are derived from `thiserror` for convenient error handling
//! and automatic `From` implementations.
//!
//! Only [`CostgptError::Config`] is ever returned to a host from the
//! instrumentation entry points. Transport failures are produced inside the
//! dispatcher and end up in the log or the optional error callback.
//!
//! # Example
//!
//! ```
//! use costgpt_core::error::{CostgptError, Result};
//!
//! fn parse_metadata(raw: &str) -> Result<serde_json::Value> {
//!     // serde_json::Error converts into CostgptError automatically
//!     Ok(serde_json::from_str(raw)?)
//! }
//!
//! assert!(matches!(parse_metadata("{"), Err(CostgptError::Json(_))));
//! ```

use thiserror::Error;

/// Main error type for costgpt operations
#[derive(Error, Debug)]
pub enum CostgptError {
    /// A required provider call site is not available, or the tracker
    /// configuration is unusable
    #[error("Configuration error: {0}")]
    Config(String),

    /// Network error while talking to the collector
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The collector answered with a non-success status
    #[error("Collector rejected request with status {status}")]
    Collector {
        /// HTTP status code returned by the collector
        status: u16,
    },

    /// JSON serialization or parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl CostgptError {
    /// Whether this error came from sending events to the collector
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Collector { .. })
    }
}

/// Convenience type alias for Results in costgpt
///
/// # Example
///
/// ```
/// use costgpt_core::Result;
///
/// fn process_data() -> Result<String> {
///     Ok("Processed successfully".to_string())
/// }
/// ```
pub type Result<T> = std::result::Result<T, CostgptError>;
