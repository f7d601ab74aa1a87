//! Notification channel between producer and consumer
//!
//! A named pub/sub topic carries file-ready events from the upload API to
//! the processor. Delivery is at-most-once per subscriber present at publish
//! time: nothing is persisted, nothing is replayed, and publishing with zero
//! subscribers succeeds while the event is simply lost. That trade-off is
//! deliberate; the trait exists so a durable-queue backend could be swapped
//! in later without touching the consumer's orchestration.
//!
//! Subscriptions yield raw payload strings rather than parsed events, so
//! each consumer owns its own policy for unparseable payloads (a non-fatal
//! per-message error, per the error-handling design).

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::Result;
use crate::event::FileReadyEvent;

mod memory;
mod redis;

pub use memory::MemoryChannel;
pub use redis::RedisChannel;

/// In-flight buffer between a backend and a subscriber that is busy
/// processing; messages beyond this are dropped by the backend's own policy.
pub(crate) const SUBSCRIPTION_BUFFER: usize = 64;

/// Consumer half of a subscribed topic
pub struct Subscription {
    rx: mpsc::Receiver<String>,
}

impl Subscription {
    pub(crate) fn new(rx: mpsc::Receiver<String>) -> Self {
        Self { rx }
    }

    /// Receive the next raw payload.
    ///
    /// Returns `None` once the backend connection (or the publishing side,
    /// for in-memory channels) has gone away.
    pub async fn recv(&mut self) -> Option<String> {
        self.rx.recv().await
    }
}

/// Publish/subscribe channel carrying file-ready events
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    /// Publish one event to `topic`.
    ///
    /// Completing without error means the broker accepted the message, not
    /// that anyone received it; with no subscribers the event is lost.
    async fn publish(&self, topic: &str, event: &FileReadyEvent) -> Result<()>;

    /// Subscribe to `topic`, receiving events published from now on.
    ///
    /// Failing here is a startup-infrastructure error; callers should treat
    /// it as fatal rather than run without a subscription.
    async fn subscribe(&self, topic: &str) -> Result<Subscription>;
}
