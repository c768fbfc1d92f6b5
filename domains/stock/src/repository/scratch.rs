//! Scratch-file persistence for generated exports
//!
//! Every export is written to its own file under the scratch directory and
//! owned by a [`TemporaryArtifact`], which removes the file when dropped.

use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use uuid::Uuid;

/// File name prefix for export files
pub const EXPORT_FILE_PREFIX: &str = "stock_export_";

/// File extension for export files
pub const EXPORT_FILE_EXTENSION: &str = "xlsx";

/// Errors from scratch-file persistence
#[derive(Debug, Error)]
pub enum ScratchError {
    #[error("Failed to create scratch directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Directory holding in-flight export files
#[derive(Debug, Clone)]
pub struct ScratchDir {
    root: PathBuf,
}

impl ScratchDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Build a file name that is unique per call
    ///
    /// The second-resolution timestamp keeps names sortable; the random
    /// token separates requests landing in the same second.
    pub fn unique_file_name(now: DateTime<Utc>) -> String {
        format!(
            "{}{}_{}.{}",
            EXPORT_FILE_PREFIX,
            now.format("%Y%m%d%H%M%S"),
            Uuid::new_v4().simple(),
            EXPORT_FILE_EXTENSION
        )
    }

    /// Write bytes to a fresh file and hand back its guard
    ///
    /// The directory is created if missing. The file is opened with
    /// `create_new`, so an existing file is never overwritten or claimed.
    pub async fn persist(&self, bytes: &[u8]) -> Result<TemporaryArtifact, ScratchError> {
        self.persist_with(bytes, |path| async move {
            tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(path)
                .await
        })
        .await
    }

    async fn persist_with<F, Fut, W>(
        &self,
        bytes: &[u8],
        open: F,
    ) -> Result<TemporaryArtifact, ScratchError>
    where
        F: FnOnce(PathBuf) -> Fut,
        Fut: Future<Output = io::Result<W>>,
        W: AsyncWrite + Unpin,
    {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|source| ScratchError::CreateDir {
                path: self.root.clone(),
                source,
            })?;

        let path = self.root.join(Self::unique_file_name(Utc::now()));

        let mut file = open(path.clone())
            .await
            .map_err(|source| ScratchError::Write {
                path: path.clone(),
                source,
            })?;

        // From here on a failed write still removes the partial file
        let artifact = TemporaryArtifact { path };

        let written = async {
            file.write_all(bytes).await?;
            file.flush().await
        }
        .await;

        written.map_err(|source| ScratchError::Write {
            path: artifact.path.clone(),
            source,
        })?;

        tracing::debug!(
            path = %artifact.path.display(),
            bytes = bytes.len(),
            "Persisted export file"
        );

        Ok(artifact)
    }
}

/// A scratch file whose lifetime is bound to this value
///
/// Dropping the artifact deletes the file. Deletion is best-effort: a
/// missing file is ignored and other failures are logged.
#[derive(Debug)]
pub struct TemporaryArtifact {
    path: PathBuf,
}

impl TemporaryArtifact {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file_name(&self) -> Option<&str> {
        self.path.file_name().and_then(|name| name.to_str())
    }
}

impl Drop for TemporaryArtifact {
    fn drop(&mut self) {
        // Drop cannot await; the unlink runs inline so the file is gone
        // before the handler's response is sent.
        match std::fs::remove_file(&self.path) {
            Ok(()) => tracing::debug!(path = %self.path.display(), "Removed export file"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(
                path = %self.path.display(),
                error = %e,
                "Failed to remove export file"
            ),
        }
    }
}
