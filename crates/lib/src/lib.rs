//!
//! docstash: a single JSON document, held in a backing file and addressed by path.
//!
//! ## Core Concepts
//!
//! * **Documents (`doc::Doc`)**: The root of the store is always a mapping from string keys to
//!   [`doc::Value`]s; values may nest further mappings and lists.
//! * **Paths (`doc::Path`)**: A non-empty list of mapping keys parsed from a request path such as
//!   `/alice/profile`. Paths address one entry inside the document.
//! * **Gateways (`backend::Gateway`)**: Load and rewrite the whole document. [`backend::JsonFile`]
//!   keeps it in a pretty-printed JSON file; [`backend::InMemory`] keeps it in memory.
//! * **Store (`store::DocStore`)**: Owns the in-memory document, serializes every operation behind
//!   one lock, and persists every mutation before committing it.

pub mod backend;
pub mod doc;
pub mod store;

pub use doc::{Doc, Path, Value};
pub use store::DocStore;

/// Result type used throughout the docstash library.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the docstash library.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The request path had no segments
    #[error(transparent)]
    Path(doc::PathError),

    /// Structured store errors from the store module
    #[error(transparent)]
    Store(store::StoreError),

    /// Structured persistence errors from the backend module
    #[error(transparent)]
    Backend(backend::BackendError),
}

impl Error {
    /// Get the originating module for this error.
    pub fn module(&self) -> &'static str {
        match self {
            Error::Path(_) => "path",
            Error::Store(_) => "store",
            Error::Backend(_) => "backend",
        }
    }

    /// Check if this error indicates the addressed entry was not found.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::Store(store_err) => store_err.is_not_found(),
            _ => false,
        }
    }

    /// Check if this error was caused by the request itself (path or payload).
    pub fn is_invalid_input(&self) -> bool {
        match self {
            Error::Path(_) => true,
            Error::Store(store_err) => store_err.is_invalid_input(),
            _ => false,
        }
    }

    /// Check if this error means a mutation was not durably written.
    pub fn is_persistence_failure(&self) -> bool {
        match self {
            Error::Backend(backend_err) => backend_err.is_persistence_failure(),
            _ => false,
        }
    }

    /// Check if this error is a shape mismatch during a merge.
    pub fn is_type_error(&self) -> bool {
        match self {
            Error::Store(store_err) => store_err.is_type_error(),
            _ => false,
        }
    }
}

impl From<doc::PathError> for Error {
    fn from(err: doc::PathError) -> Self {
        Error::Path(err)
    }
}
