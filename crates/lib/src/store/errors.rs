//! Error types for document store operations.

use thiserror::Error;

/// Errors raised by [`DocStore`](super::DocStore) operations.
///
/// None of these leave the in-memory document modified: an operation that
/// fails is discarded before anything is committed or persisted.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum StoreError {
    /// Request body is not parseable as JSON
    #[error("Malformed input")]
    MalformedInput {
        #[source]
        source: serde_json::Error,
    },

    /// A merge needed a mapping on both sides but one side was something else
    #[error("Type mismatch at '{path}': expected {expected}, found {actual}")]
    ShapeMismatch {
        path: String,
        expected: String,
        actual: String,
    },

    /// An intermediate segment is missing or is not a mapping
    #[error("Path not found: {path}")]
    PathNotFound { path: String },

    /// The final segment does not exist in its parent mapping
    #[error("Key not found: {path}")]
    KeyNotFound { path: String },
}

impl StoreError {
    /// Check if this error indicates the addressed entry could not be reached
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            StoreError::PathNotFound { .. } | StoreError::KeyNotFound { .. }
        )
    }

    /// Check if this error was caused by the request payload
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            StoreError::MalformedInput { .. } | StoreError::ShapeMismatch { .. }
        )
    }

    /// Check if this error is related to type mismatches
    pub fn is_type_error(&self) -> bool {
        matches!(self, StoreError::ShapeMismatch { .. })
    }
}

impl From<StoreError> for crate::Error {
    fn from(err: StoreError) -> Self {
        crate::Error::Store(err)
    }
}
