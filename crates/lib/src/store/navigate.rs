//! Path navigation over a [`Doc`].
//!
//! Reads and deletes navigate strictly and report where they stopped; writes
//! create (or overwrite) whatever intermediates they need.

use uuid::Uuid;

use super::{GENERATED_KEY_LEN, StoreError};
use crate::{
    Result,
    doc::{Doc, Path, Value},
};

/// Joins the first `depth` segments of `path` for error reporting.
fn prefix(path: &Path, depth: usize) -> String {
    path.segments().take(depth).collect::<Vec<_>>().join("/")
}

/// Returns the mapping that holds the final segment of `path`.
///
/// # Errors
/// [`StoreError::PathNotFound`] naming the first intermediate that is missing
/// or is not a mapping.
pub(super) fn parent<'a>(root: &'a Doc, path: &Path) -> Result<&'a Doc> {
    let mut current = root;
    for (depth, segment) in path.parent_segments().iter().enumerate() {
        current = current
            .get(segment)
            .and_then(Value::as_doc)
            .ok_or_else(|| StoreError::PathNotFound {
                path: prefix(path, depth + 1),
            })?;
    }
    Ok(current)
}

/// Mutable counterpart of [`parent`].
pub(super) fn parent_mut<'a>(root: &'a mut Doc, path: &Path) -> Result<&'a mut Doc> {
    let mut current = root;
    for (depth, segment) in path.parent_segments().iter().enumerate() {
        current = current
            .get_mut(segment)
            .and_then(Value::as_doc_mut)
            .ok_or_else(|| StoreError::PathNotFound {
                path: prefix(path, depth + 1),
            })?;
    }
    Ok(current)
}

/// Returns the mapping that holds the final segment of `path`, creating
/// empty mappings for missing intermediates.
///
/// An intermediate holding a non-mapping value is overwritten with an empty
/// mapping.
pub(super) fn parent_or_create<'a>(root: &'a mut Doc, path: &Path) -> &'a mut Doc {
    let mut current = root;
    for segment in path.parent_segments() {
        if let Some(existing) = current.get(segment)
            && !existing.is_doc()
        {
            tracing::debug!(
                "Overwriting {} at '{segment}' with a mapping while updating {path}",
                existing.type_name()
            );
        }
        current = current.child_doc_mut(segment.as_str());
    }
    current
}

/// Generates a top-level key not already present in `doc`.
pub(super) fn generate_key(doc: &Doc) -> String {
    loop {
        let mut key = Uuid::new_v4().simple().to_string();
        key.truncate(GENERATED_KEY_LEN);
        if !doc.contains_key(&key) {
            return key;
        }
    }
}

/// Stores `value` under a freshly generated top-level key and returns the key.
pub(super) fn insert_with_generated_key(doc: &mut Doc, value: Value) -> String {
    let key = generate_key(doc);
    doc.set(key.clone(), value);
    key
}
