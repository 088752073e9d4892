//! # Error Types
//!
//! Core error types shared by the lifecycle crates. All errors use
//! `thiserror` for derive-based `Display` and `Error` implementations.

use thiserror::Error;

/// Top-level error type for core primitives.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Canonicalization failed.
    #[error("canonicalization error: {0}")]
    Canonicalization(#[from] CanonicalizationError),

    /// A value failed validation at construction or parse time.
    #[error("validation error: {0}")]
    Validation(String),

    /// An unrecognised role name was supplied.
    #[error("unknown role: {0:?}")]
    UnknownRole(String),

    /// An unrecognised policy state name was supplied.
    #[error("unknown policy state: {0:?}")]
    UnknownState(String),

    /// An unrecognised policy action name was supplied.
    #[error("unknown policy action: {0:?}")]
    UnknownAction(String),

    /// An unrecognised event name was supplied.
    #[error("unknown event name: {0:?}")]
    UnknownEvent(String),
}

/// Error during canonical serialization.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// Float values are not permitted in canonical representations.
    /// Amounts must be integer minor units.
    #[error("float values are not permitted in canonical representations; use integer minor units: {0}")]
    FloatRejected(f64),

    /// JSON serialization failed.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}
