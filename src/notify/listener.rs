//! Background task feeding a subscription into the sync service.

use super::Subscription;
use crate::core::AttributeSyncService;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Handle for a running change listener.
///
/// Messages are handled one at a time in arrival order. Dropping the handle
/// stops the listener.
pub struct ChangeListener {
    topic: String,
    task: JoinHandle<()>,
}

impl ChangeListener {
    /// Spawn a task that passes every message of `subscription` to
    /// [`AttributeSyncService::on_change`].
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(service: Arc<AttributeSyncService>, mut subscription: Subscription) -> Self {
        let topic = subscription.topic().to_string();
        let task_topic = topic.clone();

        let task = tokio::spawn(async move {
            while let Some(received) = subscription.recv().await {
                match received {
                    Ok(message) => {
                        tracing::info!(
                            topic = %task_topic,
                            attribute = %message.attribute,
                            value = %message.value,
                            "received attribute change"
                        );
                        service.on_change(message).await;
                    }
                    Err(e) => {
                        tracing::error!(
                            topic = %task_topic,
                            error = %e,
                            "dropping undecodable change message"
                        );
                    }
                }
            }
            tracing::debug!(topic = %task_topic, "change subscription closed");
        });

        Self { topic, task }
    }

    /// The topic this listener consumes.
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Whether the listener task is still running.
    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    /// Stop the listener.
    pub fn stop(self) {
        drop(self);
    }
}

impl Drop for ChangeListener {
    fn drop(&mut self) {
        self.task.abort();
    }
}
