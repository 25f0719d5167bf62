//! Error types for the dispatch engine boundary.
//!
//! Dispatch requests never fail with an error: every pipeline stage reports
//! its outcome as a [`DispatchOutcome`](crate::DispatchOutcome) value. The
//! errors below only surface while configuring an engine or loading data.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, DispatchError>;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
