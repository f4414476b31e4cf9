//! Store client trait.

use crate::error::Result;
use async_trait::async_trait;

/// Minimal client contract for the shared key-value store.
///
/// Implement this trait over the store your deployment uses (Redis buckets,
/// etcd keys, ...). Unreachable stores should report
/// [`crate::error::DccError::StoreUnavailable`]; the sync service applies its
/// own timeout around every call.
#[async_trait]
pub trait StoreClient: Send + Sync {
    /// Whether `key` holds a value.
    async fn exists(&self, key: &str) -> Result<bool>;

    /// Read the value under `key`.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write `value` under `key`, overwriting any previous value.
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Write `value` only if `key` holds nothing. Returns `true` if written.
    ///
    /// The default implementation is check-then-set and therefore not atomic;
    /// stores with a native set-if-absent primitive should override it.
    async fn set_if_absent(&self, key: &str, value: &str) -> Result<bool> {
        if self.exists(key).await? {
            return Ok(false);
        }
        self.set(key, value).await?;
        Ok(true)
    }

    /// Get a human-readable name for this store (for logging/debugging).
    fn name(&self) -> String;
}
