//! Redis channel backend
//!
//! Redis pub/sub is a pure fan-out: messages go to subscribers connected at
//! publish time and are gone afterwards, which is exactly the delivery
//! contract this channel promises. Publishing and subscribing use separate
//! connections; a Redis connection in subscriber mode cannot issue regular
//! commands.

use async_trait::async_trait;
use futures::StreamExt;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::{NotificationChannel, Subscription, SUBSCRIPTION_BUFFER};
use crate::error::Result;
use crate::event::FileReadyEvent;

/// Redis-backed pub/sub channel
pub struct RedisChannel {
    client: redis::Client,
    publisher: MultiplexedConnection,
}

impl RedisChannel {
    /// Connect to Redis at `url` (e.g. `redis://127.0.0.1:6379`).
    ///
    /// Establishes the publish connection eagerly so misconfiguration
    /// surfaces at startup, not on the first upload.
    pub async fn connect(url: &str) -> Result<Self> {
        let client = redis::Client::open(url)?;
        let publisher = client.get_multiplexed_async_connection().await?;
        debug!(url, "Connected to Redis");
        Ok(Self { client, publisher })
    }
}

#[async_trait]
impl NotificationChannel for RedisChannel {
    async fn publish(&self, topic: &str, event: &FileReadyEvent) -> Result<()> {
        let payload = event.to_payload()?;
        let mut conn = self.publisher.clone();
        conn.publish::<_, _, ()>(topic, payload).await?;
        Ok(())
    }

    async fn subscribe(&self, topic: &str) -> Result<Subscription> {
        let mut pubsub = self.client.get_async_pubsub().await?;
        pubsub.subscribe(topic).await?;

        let (tx, rx) = mpsc::channel(SUBSCRIPTION_BUFFER);
        let topic = topic.to_string();

        tokio::spawn(async move {
            let mut messages = pubsub.into_on_message();
            while let Some(message) = messages.next().await {
                match message.get_payload::<String>() {
                    Ok(payload) => {
                        if tx.send(payload).await.is_err() {
                            break;
                        }
                    },
                    Err(err) => {
                        warn!(topic = %topic, error = %err, "Discarding non-text payload");
                    },
                }
            }
            debug!(topic = %topic, "Redis subscription stream ended");
        });

        Ok(Subscription::new(rx))
    }
}
