//! The document store.
//!
//! [`DocStore`] owns the single in-memory [`Doc`] and applies every read and
//! write to it under one lock. Writes follow a fixed cycle:
//!
//! 1. load the document through the [`Gateway`] if this is the first access
//! 2. apply the operation to a working copy
//! 3. save the working copy through the gateway
//! 4. commit the working copy as the in-memory document
//!
//! An operation that fails at step 2 or 3 leaves the committed document
//! exactly as it was, so the in-memory view never runs ahead of the durable
//! one.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::{
    Result,
    backend::Gateway,
    doc::{Doc, Path, Value},
};

mod errors;
mod navigate;

pub use errors::StoreError;

/// Length of keys generated for values written without a target key.
pub const GENERATED_KEY_LEN: usize = 8;

/// How [`DocStore::set_or_merge_at_path`] applied its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateKind {
    /// The terminal key did not exist and was set to the value
    Created,
    /// The value was shallow-merged into an existing mapping
    Merged,
}

/// Confirmation returned by a successful path update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Updated {
    /// The updated path, segments joined with `/`
    pub path: String,
    pub kind: UpdateKind,
}

/// A single JSON document, mutated and queried by path.
///
/// The store is cheap to share behind an `Arc`; all operations take `&self`.
///
/// ```
/// # use std::sync::Arc;
/// # use docstash::{backend::InMemory, doc::{Path, Value}, store::DocStore};
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> docstash::Result<()> {
/// let store = DocStore::open(Arc::new(InMemory::new())).await?;
///
/// let size = store
///     .merge_at_root(Value::from_json_slice(br#"{"alice": {"score": 10}}"#)?)
///     .await?;
/// assert_eq!(size, 1);
///
/// let profile = Path::parse("/alice/profile")?;
/// store
///     .set_or_merge_at_path(&profile, Value::from_json_slice(br#"{"level": 3}"#)?)
///     .await?;
/// assert_eq!(store.get_at_path(&profile).await?.as_doc().unwrap().len(), 1);
///
/// store.delete_at_path(&profile).await?;
/// assert!(store.get_at_path(&profile).await.is_err());
/// # Ok(())
/// # }
/// ```
pub struct DocStore {
    gateway: Arc<dyn Gateway>,
    /// `None` until the first operation loads the document
    doc: Mutex<Option<Doc>>,
}

impl DocStore {
    /// Opens a store over `gateway`, creating the backing store if it is absent.
    ///
    /// The document itself is loaded lazily by the first operation.
    ///
    /// # Errors
    /// Returns a backend error if the backing store cannot be created.
    pub async fn open(gateway: Arc<dyn Gateway>) -> Result<Self> {
        gateway.ensure_exists().await?;
        tracing::info!("Document store opened on {}", gateway.describe());
        Ok(Self {
            gateway,
            doc: Mutex::new(None),
        })
    }

    /// Returns a snapshot of the whole document.
    pub async fn read_all(&self) -> Doc {
        let mut slot = self.doc.lock().await;
        self.ensure_loaded(&mut slot).await.clone()
    }

    /// Number of top-level keys.
    pub async fn len(&self) -> usize {
        let mut slot = self.doc.lock().await;
        self.ensure_loaded(&mut slot).await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Returns a copy of the value at `path`.
    ///
    /// # Errors
    /// - [`StoreError::PathNotFound`] if an intermediate segment is missing or
    ///   is not a mapping
    /// - [`StoreError::KeyNotFound`] if the final segment is missing
    pub async fn get_at_path(&self, path: &Path) -> Result<Value> {
        let mut slot = self.doc.lock().await;
        let doc = self.ensure_loaded(&mut slot).await;
        let parent = navigate::parent(doc, path)?;
        parent.get(path.last()).cloned().ok_or_else(|| {
            StoreError::KeyNotFound {
                path: path.to_string(),
            }
            .into()
        })
    }

    /// Writes a value without a target key.
    ///
    /// A mapping is merged into the root, last write winning on each key. Any
    /// other value is stored under a freshly generated key (see
    /// [`insert`](Self::insert)). Returns the number of top-level keys after
    /// the write.
    pub async fn merge_at_root(&self, value: Value) -> Result<usize> {
        self.mutate("merge_at_root", move |doc| {
            match Doc::try_from(value) {
                Ok(mapping) => {
                    tracing::debug!("Merging {} keys into the root", mapping.len());
                    doc.update(mapping);
                }
                Err(other) => {
                    let key = navigate::insert_with_generated_key(doc, other);
                    tracing::debug!("Stored non-mapping payload under generated key {key}");
                }
            }
            Ok(doc.len())
        })
        .await
    }

    /// Stores `value` under a new random top-level key and returns the key.
    ///
    /// Keys are [`GENERATED_KEY_LEN`] lowercase hex characters and never
    /// collide with an existing top-level key.
    pub async fn insert(&self, value: Value) -> Result<String> {
        self.mutate("insert", move |doc| {
            Ok(navigate::insert_with_generated_key(doc, value))
        })
        .await
    }

    /// Sets or shallow-merges a mapping at `path`.
    ///
    /// Intermediate segments that are missing or hold a non-mapping value are
    /// replaced by empty mappings. At the terminal segment a missing entry is
    /// set to `value`, and an existing mapping has `value`'s keys merged into
    /// it.
    ///
    /// # Errors
    /// [`StoreError::ShapeMismatch`] if `value` is not a mapping or the
    /// existing terminal value is not a mapping. Nothing is modified in that
    /// case, including intermediates that would have been replaced.
    pub async fn set_or_merge_at_path(&self, path: &Path, value: Value) -> Result<Updated> {
        let update = Doc::try_from(value).map_err(|other| StoreError::ShapeMismatch {
            path: path.to_string(),
            expected: "doc".to_string(),
            actual: other.type_name().to_string(),
        })?;

        self.mutate("set_or_merge_at_path", |doc| {
            let parent = navigate::parent_or_create(doc, path);
            let kind = match parent.get_mut(path.last()) {
                None => {
                    parent.set(path.last(), update);
                    UpdateKind::Created
                }
                Some(Value::Doc(existing)) => {
                    existing.update(update);
                    UpdateKind::Merged
                }
                Some(other) => {
                    return Err(StoreError::ShapeMismatch {
                        path: path.to_string(),
                        expected: "doc".to_string(),
                        actual: other.type_name().to_string(),
                    }
                    .into());
                }
            };
            tracing::debug!("Updated {path} ({kind:?})");
            Ok(Updated {
                path: path.to_string(),
                kind,
            })
        })
        .await
    }

    /// Removes the entry at `path` and returns the removed path.
    ///
    /// Only the final key is removed; ancestor mappings are kept even if
    /// they become empty.
    ///
    /// # Errors
    /// - [`StoreError::PathNotFound`] if an intermediate segment is missing or
    ///   is not a mapping
    /// - [`StoreError::KeyNotFound`] if the final segment is missing
    pub async fn delete_at_path(&self, path: &Path) -> Result<String> {
        self.mutate("delete_at_path", |doc| {
            let parent = navigate::parent_mut(doc, path)?;
            match parent.remove(path.last()) {
                Some(_) => {
                    tracing::debug!("Deleted {path}");
                    Ok(path.to_string())
                }
                None => Err(StoreError::KeyNotFound {
                    path: path.to_string(),
                }
                .into()),
            }
        })
        .await
    }

    async fn ensure_loaded<'a>(&self, slot: &'a mut Option<Doc>) -> &'a mut Doc {
        if slot.is_none() {
            let doc = self.gateway.load().await;
            tracing::debug!(
                "Loaded document with {} top-level keys from {}",
                doc.len(),
                self.gateway.describe()
            );
            *slot = Some(doc);
        }
        slot.get_or_insert_with(Doc::new)
    }

    /// Runs one load→mutate→save cycle under the store lock.
    async fn mutate<T, F>(&self, operation: &'static str, f: F) -> Result<T>
    where
        F: FnOnce(&mut Doc) -> Result<T>,
    {
        let mut slot = self.doc.lock().await;
        let mut working = self.ensure_loaded(&mut slot).await.clone();
        let output = f(&mut working)?;

        // Empty while saving: if this future is dropped mid-save, the next
        // operation reloads from the gateway instead of trusting memory.
        let previous = slot.take();
        match self.gateway.save(&working).await {
            Ok(()) => {
                *slot = Some(working);
                Ok(output)
            }
            Err(e) => {
                tracing::error!(
                    "{operation}: failed to persist to {}: {e}",
                    self.gateway.describe()
                );
                *slot = previous;
                Err(e)
            }
        }
    }
}
