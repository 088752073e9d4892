//! # Lifecycle Errors
//!
//! Every failure of a lifecycle operation, with a stable machine code for
//! callers that map errors onto a transport.

use thiserror::Error;

use plc_core::PolicyId;
use plc_state::TransitionError;

use crate::store::StoreError;

/// Failure of a lifecycle operation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LifecycleError {
    /// The engine rejected the transition.
    #[error(transparent)]
    Transition(#[from] TransitionError),

    /// No record with this identifier.
    #[error("policy {id} not found")]
    NotFound {
        /// The missing policy.
        id: PolicyId,
    },

    /// Another writer saved the record first.
    #[error("policy {id} was modified concurrently (expected version {expected}, found {found})")]
    ConcurrentModification {
        /// The contended policy.
        id: PolicyId,
        /// Version this writer loaded.
        expected: u64,
        /// Version found at save time.
        found: u64,
    },

    /// A record with this identifier already exists.
    #[error("policy {id} already exists")]
    AlreadyExists {
        /// The duplicated policy.
        id: PolicyId,
    },
}

impl LifecycleError {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Transition(TransitionError::IllegalTransition { .. }) => "ILLEGAL_TRANSITION",
            Self::Transition(TransitionError::MissingReason { .. }) => "MISSING_REASON",
            Self::Transition(TransitionError::Unauthorized { .. }) => "UNAUTHORIZED",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::ConcurrentModification { .. } | Self::AlreadyExists { .. } => "CONFLICT",
        }
    }

    /// Whether reloading and retrying could succeed. Nothing retries
    /// automatically.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ConcurrentModification { .. })
    }
}

impl From<StoreError> for LifecycleError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { id } => Self::NotFound { id },
            StoreError::ConcurrentModification {
                id,
                expected,
                found,
            } => Self::ConcurrentModification {
                id,
                expected,
                found,
            },
            StoreError::AlreadyExists { id } => Self::AlreadyExists { id },
        }
    }
}
