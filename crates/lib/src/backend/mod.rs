//! Persistence gateways for the document store.
//!
//! A [`Gateway`] loads the whole document and rewrites it whole. It never
//! keeps a copy of the document between calls; the in-memory state belongs
//! to [`DocStore`](crate::store::DocStore).
//!
//! Two implementations are provided:
//!
//! - [`JsonFile`] persists to a pretty-printed JSON file, replacing it with a
//!   write-then-rename on every save.
//! - [`InMemory`] keeps the serialized document in memory, for tests and
//!   ephemeral servers.

use async_trait::async_trait;

use crate::{Result, doc::Doc};

mod errors;
mod in_memory;
mod json_file;

pub use errors::BackendError;
pub use in_memory::InMemory;
pub use json_file::JsonFile;

/// Whole-document load/save abstraction.
///
/// Implementations must be `Send` and `Sync` so a single gateway can be
/// shared by every request handler.
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Creates the backing store holding an empty mapping if it does not exist.
    ///
    /// Called once before serving. Failure here is fatal to the process.
    async fn ensure_exists(&self) -> Result<()>;

    /// Loads the stored document.
    ///
    /// A missing, empty, unreadable or malformed store yields an empty
    /// mapping rather than an error.
    async fn load(&self) -> Doc;

    /// Replaces the stored document with `doc`.
    ///
    /// # Errors
    /// Returns a [`BackendError`] if the document was not durably written.
    async fn save(&self, doc: &Doc) -> Result<()>;

    /// Short human-readable description used in logs.
    fn describe(&self) -> String;
}

/// Serializes a document the way every gateway stores it.
pub(crate) fn encode(doc: &Doc) -> Result<String> {
    let mut text = serde_json::to_string_pretty(doc)
        .map_err(|source| BackendError::SerializationFailed { source })?;
    text.push('\n');
    Ok(text)
}

/// Parses stored text, treating blank content as an empty mapping.
pub(crate) fn decode(text: &str) -> std::result::Result<Doc, serde_json::Error> {
    if text.trim().is_empty() {
        return Ok(Doc::new());
    }
    serde_json::from_str(text)
}
