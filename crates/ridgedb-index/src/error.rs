//! Index maintenance and query errors.

use std::fmt;

use ridgedb_core::{CoreError, SchemaId};
use thiserror::Error;

/// Errors that can occur while planning index updates or translating queries.
#[derive(Debug, Error)]
pub enum IndexError {
    /// Encoding or schema resolution failed.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A key or predicate is not allowed by an index's field mapping.
    #[error("schema violation: {0}")]
    SchemaViolation(String),

    /// No index is registered under this id or name.
    #[error("unknown index: {0}")]
    UnknownIndex(String),

    /// The search or storage backend rejected a request.
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// A query cannot be answered by the targeted index.
    #[error("invalid query: {0}")]
    InvalidQuery(String),
}

impl IndexError {
    /// Create an unknown-index error from an index id.
    #[must_use]
    pub fn unknown_id(id: SchemaId) -> Self {
        Self::UnknownIndex(id.to_string())
    }

    /// Whether the caller may retry the failed operation.
    ///
    /// Only temporary backend errors qualify.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Backend(e) if e.is_temporary())
    }
}

/// How a backend failure should be treated by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendErrorKind {
    /// Malformed request or unrecoverable state.
    Permanent,
    /// Interrupted or transient cluster state.
    Temporary,
}

impl fmt::Display for BackendErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Permanent => f.write_str("permanent"),
            Self::Temporary => f.write_str("temporary"),
        }
    }
}

/// A classified backend failure.
#[derive(Debug, Clone, Error)]
#[error("{kind} backend error: {message}")]
pub struct BackendError {
    /// Classification.
    pub kind: BackendErrorKind,
    /// Backend-provided description.
    pub message: String,
}

impl BackendError {
    /// A failure that will not go away on retry.
    pub fn permanent(message: impl Into<String>) -> Self {
        Self { kind: BackendErrorKind::Permanent, message: message.into() }
    }

    /// A failure worth retrying with backoff.
    pub fn temporary(message: impl Into<String>) -> Self {
        Self { kind: BackendErrorKind::Temporary, message: message.into() }
    }

    /// Whether this failure is a retry candidate.
    #[must_use]
    pub const fn is_temporary(&self) -> bool {
        matches!(self.kind, BackendErrorKind::Temporary)
    }
}

/// Result type for index operations.
pub type IndexResult<T> = Result<T, IndexError>;
