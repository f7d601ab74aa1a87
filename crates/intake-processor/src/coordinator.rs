//! Consumer-side orchestration
//!
//! The coordinator subscribes to the notification channel at startup and
//! handles delivered events one at a time, in delivery order. Per-message
//! failures (malformed payloads, unsupported file types, pipeline errors)
//! are logged and contained; they never stop the loop and nothing is
//! retried. Only failing to subscribe in the first place is fatal.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use intake_common::config::IntakeConfig;
use intake_common::event::FileReadyEvent;
use intake_common::notify::{NotificationChannel, Subscription};
use tracing::{error, info, warn};

use crate::pipeline::{self, PipelineError, PipelineSummary};

/// Notification-driven processing loop
pub struct IntakeCoordinator {
    channel: Arc<dyn NotificationChannel>,
    topic: String,
    processed_dir: PathBuf,
    recognized_extension: String,
    timeout: Option<Duration>,
}

impl IntakeCoordinator {
    pub fn new(channel: Arc<dyn NotificationChannel>, config: &IntakeConfig) -> Self {
        Self {
            channel,
            topic: config.channel.topic.clone(),
            processed_dir: config.storage.processed_dir.clone(),
            recognized_extension: config.pipeline.recognized_extension.clone(),
            timeout: config.pipeline.timeout(),
        }
    }

    /// Subscribe and process events until the channel closes.
    ///
    /// A subscription failure here is an infrastructure error and is
    /// returned to the caller; running unsubscribed would be silently
    /// non-functional.
    pub async fn run(&self) -> anyhow::Result<()> {
        let subscription = self
            .channel
            .subscribe(&self.topic)
            .await
            .with_context(|| format!("Failed to subscribe to topic {:?}", self.topic))?;

        self.run_with(subscription).await
    }

    /// Process events from an already-established subscription.
    pub async fn run_with(&self, mut subscription: Subscription) -> anyhow::Result<()> {
        info!(
            topic = %self.topic,
            extension = %self.recognized_extension,
            processed_dir = %self.processed_dir.display(),
            "Listening for file-ready events"
        );

        while let Some(payload) = subscription.recv().await {
            self.handle_message(&payload).await;
        }

        info!("Notification channel closed, stopping");
        Ok(())
    }

    /// Handle one delivered payload. Never fails: every per-message error is
    /// logged here and the message is considered consumed either way.
    pub async fn handle_message(&self, payload: &str) {
        let event = match FileReadyEvent::from_payload(payload) {
            Ok(event) => event,
            Err(err) => {
                warn!(error = %err, "Discarding malformed notification payload");
                return;
            },
        };

        info!(file = %event.stored_name, "Notification received");

        if !event.has_extension(&self.recognized_extension) {
            info!(
                file = %event.stored_name,
                expected = %self.recognized_extension,
                "File skipped, extension not recognized"
            );
            return;
        }

        match self.process(&event).await {
            Ok(summary) => {
                info!(
                    source = %event.stored_name,
                    destination = %event.destination_name(),
                    rows = summary.rows,
                    "File processed"
                );
            },
            Err(err) => {
                // Consumed, not requeued: operators resubmit the file to
                // reprocess it (destination overwrite is safe by naming
                // convention).
                error!(file = %event.stored_name, error = %err, "Failed to process file");
            },
        }
    }

    async fn process(&self, event: &FileReadyEvent) -> Result<PipelineSummary, PipelineError> {
        let destination = self.processed_dir.join(event.destination_name());
        pipeline::process_file(&event.storage_path, &destination, self.timeout).await
    }
}
