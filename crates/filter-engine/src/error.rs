use std::time::Duration;

use thiserror::Error;

/// Failure of one backend request. Never surfaced as a hard error: catalog
/// lookups demote to the next tier and count requests keep the last snapshot.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    /// The request never produced a response.
    #[error("transport error: {0}")]
    Transport(String),

    /// The backend answered with a non-success status.
    #[error("HTTP {status} from {path}")]
    Status { status: u16, path: String },

    /// The body did not match the expected shape.
    #[error("failed to decode {path}: {message}")]
    Decode { path: String, message: String },

    /// No response within the configured request timeout.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
}

/// Rejected filter mutation. Only raised for programmer errors; user input is
/// coerced instead.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FilterError {
    #[error("unknown facet `{0}`")]
    UnknownFacet(String),

    #[error("facet `{facet}` does not accept {operation}")]
    KindMismatch {
        facet: String,
        operation: &'static str,
    },
}

/// Search executor misconfiguration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExecutorError {
    #[error("search executor needs either a callback or a navigation target")]
    NoTarget,

    #[error("search executor cannot have both a callback and a navigation target")]
    ConflictingTargets,
}
