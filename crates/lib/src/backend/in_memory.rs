//! In-memory gateway.
//!
//! Holds the serialized document text instead of a file, which makes it
//! suitable for tests and for servers started without a backing file. Writes
//! can be switched to fail so callers can exercise persistence-failure paths.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{BackendError, Gateway, decode, encode};
use crate::{Result, doc::Doc};

/// A gateway storing the document text in memory.
///
/// The text is stored exactly as [`JsonFile`](super::JsonFile) would write
/// it, so tests can compare stored bytes across operations.
#[derive(Debug, Default)]
pub struct InMemory {
    /// Serialized document; `None` until first created or saved
    stored: RwLock<Option<String>>,
    /// When set, every `save` is rejected
    fail_writes: AtomicBool,
    /// Number of successful saves
    saves: AtomicUsize,
}

impl InMemory {
    /// Creates an empty gateway with nothing stored.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a gateway whose store already holds `text`, valid or not.
    pub fn with_contents(text: impl Into<String>) -> Self {
        Self {
            stored: RwLock::new(Some(text.into())),
            ..Self::default()
        }
    }

    /// Makes subsequent saves fail (or succeed again).
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of saves that have succeeded.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// The stored text, if anything has been stored.
    pub async fn contents(&self) -> Option<String> {
        self.stored.read().await.clone()
    }
}

#[async_trait]
impl Gateway for InMemory {
    async fn ensure_exists(&self) -> Result<()> {
        let mut stored = self.stored.write().await;
        if stored.is_none() {
            *stored = Some(encode(&Doc::new())?);
        }
        Ok(())
    }

    async fn load(&self) -> Doc {
        match self.stored.read().await.as_deref() {
            None => Doc::new(),
            Some(text) => decode(text).unwrap_or_else(|e| {
                tracing::warn!("Stored document is malformed: {e}. Treating it as empty.");
                Doc::new()
            }),
        }
    }

    async fn save(&self, doc: &Doc) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(BackendError::WriteRejected {
                reason: "writes are disabled on this gateway".to_string(),
            }
            .into());
        }

        let text = encode(doc)?;
        *self.stored.write().await = Some(text);
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn describe(&self) -> String {
        "in-memory".to_string()
    }
}
