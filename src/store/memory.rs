//! In-process store.

use super::StoreClient;
use crate::error::{DccError, Result};
use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

/// A `DashMap`-backed store.
///
/// Clones share the same data, so several services in one process (or one
/// test) can act as independent instances attached to the same store.
/// Availability can be toggled and latency injected to exercise failure paths.
///
/// # Examples
///
/// ```rust
/// use dcc_sync::store::{MemoryStore, StoreClient};
///
/// # async fn example() -> dcc_sync::error::Result<()> {
/// let store = MemoryStore::new();
/// store.set("orders_retryLimit", "3").await?;
/// assert_eq!(store.get("orders_retryLimit").await?.as_deref(), Some("3"));
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct MemoryStore {
    entries: Arc<DashMap<String, String>>,
    available: Arc<AtomicBool>,
    latency: Option<Duration>,
    writes: Arc<AtomicUsize>,
}

impl MemoryStore {
    /// Create an empty, available store.
    pub fn new() -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            available: Arc::new(AtomicBool::new(true)),
            latency: None,
            writes: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Delay every operation by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Make every operation fail with `StoreUnavailable` (or succeed again).
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Read a value without going through the async client API.
    pub fn peek(&self, key: &str) -> Option<String> {
        self.entries.get(key).map(|value| value.value().clone())
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of successful writes since creation.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    async fn ready(&self) -> Result<()> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        if !self.available.load(Ordering::SeqCst) {
            return Err(DccError::StoreUnavailable(
                "memory store is marked unavailable".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StoreClient for MemoryStore {
    async fn exists(&self, key: &str) -> Result<bool> {
        self.ready().await?;
        Ok(self.entries.contains_key(key))
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.ready().await?;
        Ok(self.peek(key))
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.ready().await?;
        self.entries.insert(key.to_string(), value.to_string());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn set_if_absent(&self, key: &str, value: &str) -> Result<bool> {
        self.ready().await?;
        match self.entries.entry(key.to_string()) {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(vacant) => {
                vacant.insert(value.to_string());
                self.writes.fetch_add(1, Ordering::SeqCst);
                Ok(true)
            }
        }
    }

    fn name(&self) -> String {
        "memory".to_string()
    }
}
