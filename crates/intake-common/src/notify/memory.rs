//! In-process channel backend
//!
//! Fan-out over `tokio::sync::broadcast`, with the same delivery contract as
//! the Redis backend: best-effort to subscribers present at publish time,
//! no persistence, no replay. Used by tests and single-process setups.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::{broadcast, mpsc};
use tracing::warn;

use super::{NotificationChannel, Subscription, SUBSCRIPTION_BUFFER};
use crate::error::Result;
use crate::event::FileReadyEvent;

/// In-memory pub/sub channel
pub struct MemoryChannel {
    topics: Mutex<HashMap<String, broadcast::Sender<String>>>,
}

impl MemoryChannel {
    pub fn new() -> Self {
        Self {
            topics: Mutex::new(HashMap::new()),
        }
    }

    fn sender_for(&self, topic: &str) -> broadcast::Sender<String> {
        let mut topics = self.topics.lock().unwrap_or_else(|e| e.into_inner());
        topics
            .entry(topic.to_string())
            .or_insert_with(|| broadcast::channel(SUBSCRIPTION_BUFFER).0)
            .clone()
    }
}

impl Default for MemoryChannel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NotificationChannel for MemoryChannel {
    async fn publish(&self, topic: &str, event: &FileReadyEvent) -> Result<()> {
        let payload = event.to_payload()?;
        // send() errors only when no receiver exists; the event is lost,
        // which is the documented zero-subscriber behavior.
        let _ = self.sender_for(topic).send(payload);
        Ok(())
    }

    async fn subscribe(&self, topic: &str) -> Result<Subscription> {
        let mut source = self.sender_for(topic).subscribe();
        let (tx, rx) = mpsc::channel(SUBSCRIPTION_BUFFER);

        tokio::spawn(async move {
            loop {
                match source.recv().await {
                    Ok(payload) => {
                        if tx.send(payload).await.is_err() {
                            break;
                        }
                    },
                    Err(broadcast::error::RecvError::Lagged(missed)) => {
                        warn!(missed, "Subscriber lagged, notifications dropped");
                    },
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });

        Ok(Subscription::new(rx))
    }
}
