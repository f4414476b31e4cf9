//! Binding registry: store key → bound targets.

use crate::core::{Configurable, StoreKey};
use dashmap::DashMap;
use std::sync::{Arc, Weak};

/// Concurrent mapping from store key to the targets bound to it.
///
/// The registry holds weak references only; it never keeps a target alive.
/// Entries are sharded, so registrations and lookups for unrelated keys do not
/// contend on a single lock. References to dropped targets are pruned when
/// the key is registered again and by [`BindingRegistry::sweep`].
///
/// Create one per process (or per test) and share it through an `Arc`.
///
/// # Examples
///
/// ```rust
/// use dcc_sync::core::{BindingRegistry, Configurable, DynamicAttributes, StoreKey};
/// use std::sync::Arc;
///
/// let registry = BindingRegistry::new();
/// let key = StoreKey::new("orders", "retryLimit");
/// let target: Arc<dyn Configurable> =
///     Arc::new(DynamicAttributes::builder("t").attribute("retryLimit", "3").build());
///
/// assert!(registry.register(&key, &target));
/// assert!(!registry.register(&key, &target));
/// assert_eq!(registry.targets_for(&key).len(), 1);
/// ```
#[derive(Default)]
pub struct BindingRegistry {
    bindings: DashMap<String, Vec<Weak<dyn Configurable>>>,
}

impl BindingRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            bindings: DashMap::new(),
        }
    }

    /// Bind `target` to `key`.
    ///
    /// Returns `false` if the target was already bound to the key.
    pub fn register(&self, key: &StoreKey, target: &Arc<dyn Configurable>) -> bool {
        let mut entry = self.bindings.entry(key.as_str().to_owned()).or_default();
        entry.retain(|bound| bound.strong_count() > 0);

        let candidate = Arc::downgrade(target);
        if entry.iter().any(|bound| Weak::ptr_eq(bound, &candidate)) {
            return false;
        }

        entry.push(candidate);
        tracing::debug!(key = %key, targets = entry.len(), "registered binding");
        true
    }

    /// Remove the binding of `target` to `key`.
    ///
    /// Returns `true` if the target was bound.
    pub fn deregister(&self, key: &StoreKey, target: &Arc<dyn Configurable>) -> bool {
        let candidate = Arc::downgrade(target);
        let removed = match self.bindings.get_mut(key.as_str()) {
            Some(mut entry) => {
                let before = entry.len();
                entry.retain(|bound| !Weak::ptr_eq(bound, &candidate));
                entry.len() != before
            }
            None => false,
        };
        self.bindings.remove_if(key.as_str(), |_, targets| targets.is_empty());
        removed
    }

    /// Snapshot of the live targets bound to `key`. Empty for unknown keys.
    ///
    /// The snapshot is detached from the registry, so callers may write into
    /// the targets without holding any registry lock.
    pub fn targets_for(&self, key: &StoreKey) -> Vec<Arc<dyn Configurable>> {
        self.bindings
            .get(key.as_str())
            .map(|entry| entry.iter().filter_map(Weak::upgrade).collect())
            .unwrap_or_default()
    }

    /// Whether any live target is bound to `key`.
    pub fn is_bound(&self, key: &StoreKey) -> bool {
        self.bindings
            .get(key.as_str())
            .is_some_and(|entry| entry.iter().any(|bound| bound.strong_count() > 0))
    }

    /// Drop references to targets that no longer exist, and keys left empty.
    ///
    /// Returns the number of references removed.
    pub fn sweep(&self) -> usize {
        let mut removed = 0;
        self.bindings.retain(|_, targets| {
            let before = targets.len();
            targets.retain(|bound| bound.strong_count() > 0);
            removed += before - targets.len();
            !targets.is_empty()
        });
        if removed > 0 {
            tracing::debug!(removed, "swept stale bindings");
        }
        removed
    }

    /// Number of keys with at least one registration (live or not yet swept).
    pub fn key_count(&self) -> usize {
        self.bindings.len()
    }

    /// Whether the registry holds no keys.
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// All registered keys, in no particular order.
    pub fn keys(&self) -> Vec<String> {
        self.bindings.iter().map(|entry| entry.key().clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::DynamicAttributes;

    fn target(name: &str) -> Arc<dyn Configurable> {
        Arc::new(
            DynamicAttributes::builder(name)
                .attribute("retryLimit", "3")
                .build(),
        )
    }

    #[test]
    fn test_unknown_key_is_empty() {
        let registry = BindingRegistry::new();
        assert!(registry.targets_for(&StoreKey::new("orders", "nothing")).is_empty());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_multiple_targets_per_key() {
        let registry = BindingRegistry::new();
        let key = StoreKey::new("orders", "retryLimit");
        let t1 = target("t1");
        let t2 = target("t2");

        assert!(registry.register(&key, &t1));
        assert!(registry.register(&key, &t2));
        assert!(!registry.register(&key, &t1));

        let names: Vec<_> = registry
            .targets_for(&key)
            .iter()
            .map(|t| t.target_name())
            .collect();
        assert_eq!(names, vec!["t1", "t2"]);
    }

    #[test]
    fn test_dropped_targets_are_not_returned() {
        let registry = BindingRegistry::new();
        let key = StoreKey::new("orders", "retryLimit");
        let kept = target("kept");
        let dropped = target("dropped");

        registry.register(&key, &kept);
        registry.register(&key, &dropped);
        drop(dropped);

        assert_eq!(registry.targets_for(&key).len(), 1);
        assert_eq!(registry.sweep(), 1);
        assert_eq!(registry.sweep(), 0);

        drop(kept);
        assert!(!registry.is_bound(&key));
        assert_eq!(registry.sweep(), 1);
        assert_eq!(registry.key_count(), 0);
    }

    #[test]
    fn test_deregister() {
        let registry = BindingRegistry::new();
        let key = StoreKey::new("orders", "retryLimit");
        let t = target("t");

        registry.register(&key, &t);
        assert!(registry.deregister(&key, &t));
        assert!(!registry.deregister(&key, &t));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_concurrent_registration() {
        let registry = Arc::new(BindingRegistry::new());
        let targets: Vec<_> = (0..8).map(|i| target(&format!("t{i}"))).collect();

        std::thread::scope(|scope| {
            for (i, t) in targets.iter().enumerate() {
                let registry = Arc::clone(&registry);
                scope.spawn(move || {
                    registry.register(&StoreKey::new("orders", "shared"), t);
                    registry.register(&StoreKey::new("orders", format!("own{i}")), t);
                });
            }
        });

        assert_eq!(registry.targets_for(&StoreKey::new("orders", "shared")).len(), 8);
        assert_eq!(registry.key_count(), 9);
    }
}
