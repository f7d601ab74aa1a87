//! File-ready event published after every stored upload
//!
//! The event is the only coupling between the upload API and the processor:
//! the producer finishes the durable write, then publishes exactly one event
//! per stored file. Payloads travel as JSON text with camelCase field names.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Notification that a file has been stored and is ready for processing.
///
/// Invariant: `storage_path` is readable by the consumer at the time the
/// event is delivered; the producer writes the file before publishing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileReadyEvent {
    /// Unique name assigned at storage time (not the user-supplied name)
    pub stored_name: String,
    /// User-supplied file name, informational only
    pub original_name: String,
    /// Location the consumer must read bytes from
    pub storage_path: PathBuf,
    /// Declared content type, informational only
    pub content_type: String,
    /// Stored size in bytes, informational only
    pub size_bytes: u64,
    /// Timestamp of storage completion
    pub stored_at: DateTime<Utc>,
}

impl FileReadyEvent {
    /// Serialize for publication on the notification channel
    pub fn to_payload(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse a received payload. Consumers treat failures here as a
    /// non-fatal per-message error.
    pub fn from_payload(payload: &str) -> Result<Self> {
        Ok(serde_json::from_str(payload)?)
    }

    /// Whether the stored file carries the given extension (case-insensitive)
    pub fn has_extension(&self, extension: &str) -> bool {
        Path::new(&self.stored_name)
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case(extension))
            .unwrap_or(false)
    }

    /// Destination file name for processed output.
    ///
    /// `processed-<storedName>` is the only naming contract downstream
    /// readers may rely on.
    pub fn destination_name(&self) -> String {
        format!("processed-{}", self.stored_name)
    }
}
