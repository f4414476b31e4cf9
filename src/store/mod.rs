//! Shared key-value store contract and implementations.

mod client;
mod memory;

pub use client::StoreClient;
pub use memory::MemoryStore;

use crate::core::StoreKey;
use crate::error::{DccError, Result};
use std::future::Future;
use std::time::Duration;

/// Run a store call, mapping an expired `timeout` to [`DccError::StoreTimeout`].
pub(crate) async fn timed<T, F>(
    operation: &'static str,
    key: &StoreKey,
    timeout: Duration,
    call: F,
) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    tokio::time::timeout(timeout, call)
        .await
        .map_err(|_| DccError::StoreTimeout {
            operation,
            key: key.as_str().to_string(),
            timeout,
        })?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_timed_expires() {
        let store = MemoryStore::new().with_latency(Duration::from_secs(5));
        let key = StoreKey::new("orders", "retryLimit");

        let err = timed("get", &key, Duration::from_millis(100), store.get(key.as_str()))
            .await
            .unwrap_err();

        match err {
            DccError::StoreTimeout { operation, key, .. } => {
                assert_eq!(operation, "get");
                assert_eq!(key, "orders_retryLimit");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_timed_passes_through() {
        let store = MemoryStore::new();
        let key = StoreKey::new("orders", "retryLimit");
        let exists = timed("exists", &key, Duration::from_secs(1), store.exists(key.as_str()))
            .await
            .unwrap();
        assert!(!exists);
    }
}
