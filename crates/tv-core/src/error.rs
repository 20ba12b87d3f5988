//! # AppError
//!
//! Centralized error handling for threadview.
//! Keeps "nothing there", "bad input" and "backend down" apart so the
//! request layer can answer each one differently.

use thiserror::Error;

/// The primary error type for all tv-core operations.
#[derive(Error, Debug)]
pub enum AppError {
    /// Resource not found (e.g., the root post of a thread)
    #[error("{0} not found with ID {1}")]
    NotFound(String, String),

    /// Malformed request parameters (e.g., page 0, negative page size)
    #[error("validation error: {0}")]
    ValidationError(String),

    /// The store failed or timed out
    #[error("store error: {0}")]
    StoreError(String),
}

impl AppError {
    /// Wraps a store-layer failure, keeping its cause chain in the message.
    pub fn store(err: anyhow::Error) -> Self {
        AppError::StoreError(format!("{err:#}"))
    }
}

/// A specialized Result type for threadview logic.
pub type Result<T> = std::result::Result<T, AppError>;
