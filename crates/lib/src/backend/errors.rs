//! Error types for the persistence gateway.
//!
//! Only writes can fail from the caller's point of view; a document that
//! cannot be read degrades to an empty one instead of raising an error.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while writing the backing store.
///
/// # Stability
///
/// - New variants may be added in minor versions (enum is `#[non_exhaustive]`)
/// - Helper methods like `is_*()` provide stable APIs
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum BackendError {
    /// Serialization of the document failed.
    #[error("Serialization failed")]
    SerializationFailed {
        /// The underlying serialization error
        #[source]
        source: serde_json::Error,
    },

    /// File I/O error.
    #[error("File I/O error on {}", path.display())]
    FileIo {
        /// The file being read, written or renamed
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The backing store refused the write.
    #[error("Write rejected: {reason}")]
    WriteRejected {
        /// Description of why the write was refused
        reason: String,
    },
}

impl BackendError {
    /// Check if this error means the document was not durably written.
    ///
    /// Every variant currently does; the helper exists so callers do not
    /// have to enumerate them.
    pub fn is_persistence_failure(&self) -> bool {
        matches!(
            self,
            BackendError::SerializationFailed { .. }
                | BackendError::FileIo { .. }
                | BackendError::WriteRejected { .. }
        )
    }
}

impl From<BackendError> for crate::Error {
    fn from(err: BackendError) -> Self {
        crate::Error::Backend(err)
    }
}
