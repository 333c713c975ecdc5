//! Error types for the core crate.

use thiserror::Error;

use crate::types::SchemaId;

/// Maximum length for value display in error messages.
const MAX_VALUE_DISPLAY_LEN: usize = 100;

/// Errors that can occur while encoding or decoding relations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// An encoding or decoding error occurred.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// A value did not match the declared data type of its key.
    #[error(
        "type mismatch: expected {expected}, got {actual}{}",
        value.as_ref().map(|v| format!(" (value: {v})")).unwrap_or_default()
    )]
    TypeMismatch {
        /// The expected type.
        expected: String,
        /// The actual type.
        actual: String,
        /// The value that caused the mismatch (truncated for display).
        value: Option<String>,
    },

    /// A caller supplied arguments that cannot be honored.
    #[error("validation error: {0}")]
    Validation(String),

    /// A type id could not be resolved by the type inspector.
    #[error("unknown relation type: {0}")]
    UnknownType(SchemaId),

    /// Serializer and schema disagree. Never retried.
    #[error("invariant violated: {0}")]
    Invariant(String),
}

impl CoreError {
    /// Creates a type mismatch error without a value.
    #[must_use]
    pub fn type_mismatch(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::TypeMismatch { expected: expected.into(), actual: actual.into(), value: None }
    }

    /// Creates a type mismatch error with a value for debugging.
    ///
    /// The value is truncated to 100 characters for display.
    #[must_use]
    pub fn type_mismatch_with_value(
        expected: impl Into<String>,
        actual: impl Into<String>,
        value: impl std::fmt::Display,
    ) -> Self {
        let value_str = value.to_string();
        let truncated = if value_str.len() > MAX_VALUE_DISPLAY_LEN {
            let mut cut = MAX_VALUE_DISPLAY_LEN;
            while !value_str.is_char_boundary(cut) {
                cut -= 1;
            }
            format!("{}...", &value_str[..cut])
        } else {
            value_str
        };
        Self::TypeMismatch {
            expected: expected.into(),
            actual: actual.into(),
            value: Some(truncated),
        }
    }

    /// Returns `true` for errors that signal a serializer/schema mismatch.
    ///
    /// Fatal errors abort the operation and must not be retried.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Invariant(_) | Self::TypeMismatch { .. } | Self::UnknownType(_))
    }
}

/// Result alias used throughout the core crate.
pub type CoreResult<T> = Result<T, CoreError>;
