//! Notification channel trait and subscriptions.

use crate::core::{ChangeMessage, topic_for};
use crate::error::Result;
use async_trait::async_trait;
use tokio::sync::mpsc;

/// A stream of change messages received on one topic.
///
/// Payloads travel as JSON strings and are decoded on receipt, so a
/// malformed payload surfaces as an error item rather than ending the stream.
/// Transport adapters create one from the receiving half of a bounded
/// channel and forward raw payloads into the sending half.
pub struct Subscription {
    topic: String,
    receiver: mpsc::Receiver<String>,
}

impl Subscription {
    /// Wrap the receiving half of a payload channel.
    pub fn new(topic: impl Into<String>, receiver: mpsc::Receiver<String>) -> Self {
        Self {
            topic: topic.into(),
            receiver,
        }
    }

    /// The subscribed topic.
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Wait for the next message. Returns `None` once the channel is closed.
    pub async fn recv(&mut self) -> Option<Result<ChangeMessage>> {
        self.receiver
            .recv()
            .await
            .map(|payload| ChangeMessage::from_json(&payload))
    }
}

/// Publish/subscribe transport carrying change messages between processes.
///
/// Delivery within one subscription is expected to be FIFO.
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    /// Publish `message` on `topic`. Returns the number of subscribers reached.
    async fn publish(&self, topic: &str, message: &ChangeMessage) -> Result<usize>;

    /// Subscribe to `topic`.
    async fn subscribe(&self, topic: &str) -> Result<Subscription>;

    /// Get a human-readable name for this channel (for logging/debugging).
    fn name(&self) -> String;
}

/// Publish a change to every process serving `namespace`.
///
/// This is the writer side; the sync service itself only consumes messages.
///
/// # Examples
///
/// ```rust
/// use dcc_sync::core::ChangeMessage;
/// use dcc_sync::notify::{MemoryChannel, publish_change};
///
/// # async fn example() -> dcc_sync::error::Result<()> {
/// let channel = MemoryChannel::new(16);
/// let reached = publish_change(&channel, "orders", &ChangeMessage::new("retryLimit", "5")).await?;
/// assert_eq!(reached, 0);
/// # Ok(())
/// # }
/// ```
pub async fn publish_change(
    channel: &dyn NotificationChannel,
    namespace: &str,
    message: &ChangeMessage,
) -> Result<usize> {
    let topic = topic_for(namespace);
    let reached = channel.publish(&topic, message).await?;
    tracing::debug!(
        topic = %topic,
        attribute = %message.attribute,
        reached,
        "published attribute change"
    );
    Ok(reached)
}
