use std::path::PathBuf;

use chrono::{DateTime, Utc};
use intake_common::event::FileReadyEvent;
use intake_common::notify::NotificationChannel;
use intake_common::IntakeError;
use serde::{Deserialize, Serialize};

use crate::storage::{Storage, StorageError};

/// Fallback content type when the client did not declare one
const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

#[derive(Debug, Clone)]
pub struct StoreFileCommand {
    pub original_name: String,
    pub content_type: Option<String>,
    pub content: Vec<u8>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub stored_name: String,
    pub original_name: String,
    pub storage_path: PathBuf,
    pub content_type: String,
    pub size_bytes: u64,
    pub checksum: String,
    pub stored_at: DateTime<Utc>,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreFileError {
    #[error("No file was sent")]
    FileFieldMissing,
    #[error("File name must not exceed 255 characters")]
    FileNameLength,
    #[error("Uploaded file is empty")]
    ContentRequired,
    #[error("Malformed multipart request: {0}")]
    Multipart(String),
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("Notification error: {0}")]
    Channel(#[from] IntakeError),
}

impl StoreFileCommand {
    pub fn validate(&self) -> Result<(), StoreFileError> {
        if self.original_name.len() > 255 {
            return Err(StoreFileError::FileNameLength);
        }
        if self.content.is_empty() {
            return Err(StoreFileError::ContentRequired);
        }
        Ok(())
    }
}

/// Store the upload durably, then publish exactly one file-ready event.
///
/// The order is load-bearing: the event promises that its `storagePath` is
/// readable when delivered, so nothing may be published before the write
/// completes. A publish failure leaves the stored file in place; storage
/// and notification are deliberately not transactional.
#[tracing::instrument(skip(storage, channel, command), fields(file = %command.original_name))]
pub async fn handle(
    storage: &Storage,
    channel: &dyn NotificationChannel,
    topic: &str,
    command: StoreFileCommand,
) -> Result<UploadResponse, StoreFileError> {
    command.validate()?;

    let stored = storage
        .store(&command.original_name, &command.content)
        .await?;

    let content_type = command
        .content_type
        .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());

    let event = FileReadyEvent {
        stored_name: stored.stored_name,
        original_name: command.original_name,
        storage_path: stored.path,
        content_type,
        size_bytes: stored.size_bytes,
        stored_at: Utc::now(),
    };

    channel.publish(topic, &event).await?;

    tracing::info!(
        topic = %topic,
        stored_name = %event.stored_name,
        size = event.size_bytes,
        "File-ready event published"
    );

    Ok(UploadResponse {
        stored_name: event.stored_name,
        original_name: event.original_name,
        storage_path: event.storage_path,
        content_type: event.content_type,
        size_bytes: event.size_bytes,
        checksum: stored.checksum,
        stored_at: event.stored_at,
    })
}
