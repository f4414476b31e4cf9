//! In-process notification channel.

use super::{NotificationChannel, Subscription};
use crate::core::ChangeMessage;
use crate::error::Result;
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Fan-out channel delivering every published message to every live
/// subscription of the topic.
///
/// Clones share the same topics. Each subscription buffers up to `capacity`
/// messages; a full buffer makes `publish` wait. Closed subscriptions are
/// dropped on the next publish.
#[derive(Clone)]
pub struct MemoryChannel {
    topics: Arc<DashMap<String, Vec<mpsc::Sender<String>>>>,
    capacity: usize,
}

impl MemoryChannel {
    /// Create a channel whose subscriptions buffer `capacity` messages.
    pub fn new(capacity: usize) -> Self {
        Self {
            topics: Arc::new(DashMap::new()),
            capacity: capacity.max(1),
        }
    }

    /// Publish a raw payload, bypassing encoding.
    ///
    /// Lets callers exercise how subscribers cope with foreign payloads.
    pub async fn publish_payload(&self, topic: &str, payload: &str) -> usize {
        // Clone the senders so no shard lock is held across the sends.
        let senders = self
            .topics
            .get(topic)
            .map(|entry| entry.value().clone())
            .unwrap_or_default();

        let mut reached = 0;
        for sender in &senders {
            if sender.send(payload.to_string()).await.is_ok() {
                reached += 1;
            }
        }

        if reached < senders.len() {
            if let Some(mut entry) = self.topics.get_mut(topic) {
                entry.retain(|sender| !sender.is_closed());
            }
        }
        reached
    }

    /// Number of open subscriptions on `topic`.
    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.topics
            .get(topic)
            .map(|entry| entry.iter().filter(|sender| !sender.is_closed()).count())
            .unwrap_or(0)
    }
}

impl Default for MemoryChannel {
    fn default() -> Self {
        Self::new(1024)
    }
}

#[async_trait]
impl NotificationChannel for MemoryChannel {
    async fn publish(&self, topic: &str, message: &ChangeMessage) -> Result<usize> {
        let payload = message.to_json()?;
        Ok(self.publish_payload(topic, &payload).await)
    }

    async fn subscribe(&self, topic: &str) -> Result<Subscription> {
        let (sender, receiver) = mpsc::channel(self.capacity);
        self.topics.entry(topic.to_string()).or_default().push(sender);
        Ok(Subscription::new(topic, receiver))
    }

    fn name(&self) -> String {
        "memory".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fan_out_preserves_order() {
        let channel = MemoryChannel::new(8);
        let mut first = channel.subscribe("t").await.unwrap();
        let mut second = channel.subscribe("t").await.unwrap();

        for value in ["1", "2", "3"] {
            let reached = channel
                .publish("t", &ChangeMessage::new("limit", value))
                .await
                .unwrap();
            assert_eq!(reached, 2);
        }

        for sub in [&mut first, &mut second] {
            for expected in ["1", "2", "3"] {
                let msg = sub.recv().await.unwrap().unwrap();
                assert_eq!(msg.value, expected);
            }
        }
    }

    #[tokio::test]
    async fn test_topics_are_isolated() {
        let channel = MemoryChannel::new(8);
        let _orders = channel.subscribe("orders").await.unwrap();

        let reached = channel
            .publish("payments", &ChangeMessage::new("limit", "1"))
            .await
            .unwrap();
        assert_eq!(reached, 0);
    }

    #[tokio::test]
    async fn test_dropped_subscription_is_pruned() {
        let channel = MemoryChannel::new(8);
        let sub = channel.subscribe("t").await.unwrap();
        assert_eq!(channel.subscriber_count("t"), 1);

        drop(sub);
        let reached = channel
            .publish("t", &ChangeMessage::new("limit", "1"))
            .await
            .unwrap();
        assert_eq!(reached, 0);
        assert_eq!(channel.subscriber_count("t"), 0);
    }

    #[tokio::test]
    async fn test_malformed_payload_is_an_error_item() {
        let channel = MemoryChannel::new(8);
        let mut sub = channel.subscribe("t").await.unwrap();

        channel.publish_payload("t", "not json").await;
        assert!(sub.recv().await.unwrap().is_err());
    }
}
