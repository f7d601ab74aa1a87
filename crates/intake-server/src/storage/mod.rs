//! Local-disk storage for uploaded files
//!
//! The producer-side storage adapter: assigns each upload a unique stored
//! name, writes it durably under the upload root, and reports the metadata
//! the file-ready event is built from. The write is synced before `store`
//! returns, so an event published afterwards always references a readable
//! file.

use std::path::{Path, PathBuf};

use intake_common::checksum::sha256_hex;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tracing::{debug, instrument};
use uuid::Uuid;

/// Result of a completed store operation
#[derive(Debug, Clone)]
pub struct StoredFile {
    /// Unique name assigned to the file (uuid-prefixed original name)
    pub stored_name: String,
    /// Absolute-or-relative path the file was written to
    pub path: PathBuf,
    /// Size of the stored content in bytes
    pub size_bytes: u64,
    /// SHA-256 hex digest of the stored content
    pub checksum: String,
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to create upload directory {dir}: {source}")]
    CreateDir {
        dir: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Local filesystem storage rooted at the upload directory
#[derive(Debug, Clone)]
pub struct Storage {
    upload_dir: PathBuf,
}

impl Storage {
    pub fn new(upload_dir: impl Into<PathBuf>) -> Self {
        Self {
            upload_dir: upload_dir.into(),
        }
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    /// Store one upload durably and return its metadata.
    ///
    /// Creates the upload directory if absent. The stored name is
    /// `<uuid>-<sanitized original name>`; the user-supplied name is never
    /// used as-is for the on-disk file.
    #[instrument(skip(self, content), fields(size = content.len()))]
    pub async fn store(&self, original_name: &str, content: &[u8]) -> Result<StoredFile, StorageError> {
        tokio::fs::create_dir_all(&self.upload_dir)
            .await
            .map_err(|source| StorageError::CreateDir {
                dir: self.upload_dir.clone(),
                source,
            })?;

        let stored_name = format!("{}-{}", Uuid::new_v4(), sanitize_file_name(original_name));
        let path = self.upload_dir.join(&stored_name);

        let write = async {
            let mut file = tokio::fs::File::create(&path).await?;
            file.write_all(content).await?;
            file.flush().await?;
            // The event invariant requires the bytes to be durable before
            // anything is published; sync, don't just flush.
            file.sync_all().await?;
            Ok::<_, std::io::Error>(())
        };

        write.await.map_err(|source| StorageError::Write {
            path: path.clone(),
            source,
        })?;

        let checksum = sha256_hex(content);

        debug!(
            stored_name = %stored_name,
            path = %path.display(),
            checksum = %checksum,
            "Upload written to disk"
        );

        Ok(StoredFile {
            stored_name,
            path,
            size_bytes: content.len() as u64,
            checksum,
        })
    }
}

/// Strip path separators and control characters from a user-supplied name
/// so it can safely be embedded in the stored file name
fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_control() || matches!(c, '/' | '\\') {
                '_'
            } else {
                c
            }
        })
        .collect();

    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned
    }
}
