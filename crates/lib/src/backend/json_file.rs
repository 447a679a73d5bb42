//! Backing-file gateway.
//!
//! The file always holds one complete JSON object. Saves write a sibling
//! `<name>.tmp` file, sync it to disk and rename it over the target, so a
//! crash mid-write leaves either the old or the new document, never a torn
//! one.

use std::{
    ffi::OsString,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use super::{BackendError, Gateway, decode, encode};
use crate::{Result, doc::Doc};

/// Gateway persisting the document to a single JSON file.
#[derive(Debug, Clone)]
pub struct JsonFile {
    path: PathBuf,
}

impl JsonFile {
    /// Creates a gateway for the file at `path`. Nothing is touched on disk.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The backing file location.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(OsString::from)
            .unwrap_or_else(|| OsString::from("document"));
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    /// Writes `bytes` to `path` and flushes them to disk before returning.
    async fn write_synced(&self, path: &Path, bytes: &[u8]) -> std::io::Result<()> {
        let mut file = tokio::fs::File::create(path).await?;
        file.write_all(bytes).await?;
        file.sync_all().await
    }

    fn io_error(&self, path: &Path, source: std::io::Error) -> crate::Error {
        BackendError::FileIo {
            path: path.to_path_buf(),
            source,
        }
        .into()
    }
}

#[async_trait]
impl Gateway for JsonFile {
    async fn ensure_exists(&self) -> Result<()> {
        let exists = tokio::fs::try_exists(&self.path)
            .await
            .map_err(|e| self.io_error(&self.path, e))?;
        if exists {
            tracing::debug!("Backing file {} already exists", self.path.display());
            return Ok(());
        }

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| self.io_error(parent, e))?;
        }

        tracing::info!("Creating empty backing file {}", self.path.display());
        self.save(&Doc::new()).await
    }

    async fn load(&self) -> Doc {
        let text = match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("Backing file {} not found", self.path.display());
                return Doc::new();
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to read {}: {e}. Treating the document as empty.",
                    self.path.display()
                );
                return Doc::new();
            }
        };

        match decode(&text) {
            Ok(doc) => {
                tracing::debug!(
                    "Loaded {} top-level keys from {}",
                    doc.len(),
                    self.path.display()
                );
                doc
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to parse {}: {e}. Treating the document as empty.",
                    self.path.display()
                );
                Doc::new()
            }
        }
    }

    async fn save(&self, doc: &Doc) -> Result<()> {
        let json = encode(doc)?;
        let temp = self.temp_path();

        self.write_synced(&temp, json.as_bytes())
            .await
            .map_err(|e| self.io_error(&temp, e))?;

        if let Err(e) = tokio::fs::rename(&temp, &self.path).await {
            // Cleanup failure is ignored; the rename error is reported.
            let _ = tokio::fs::remove_file(&temp).await;
            return Err(self.io_error(&self.path, e));
        }

        tracing::debug!(
            "Saved {} top-level keys to {}",
            doc.len(),
            self.path.display()
        );
        Ok(())
    }

    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }
}
