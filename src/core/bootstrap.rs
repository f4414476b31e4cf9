//! Bootstrap resolution of attribute values.

use crate::core::{AttributeDescriptor, BindingRegistry, Configurable, StoreKey};
use crate::error::Result;
use crate::store::{StoreClient, timed};
use std::sync::Arc;
use std::time::Duration;

/// The value an attribute was bound to at bootstrap, and where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EffectiveValue {
    /// The store already held a value.
    FromStore(String),
    /// The store was empty; the declared default was written to it.
    Defaulted(String),
    /// The declared default was bound locally without the store, either
    /// because the store failed or because synchronization is disabled.
    Fallback(String),
}

impl EffectiveValue {
    /// The bound value.
    pub fn value(&self) -> &str {
        match self {
            Self::FromStore(v) | Self::Defaulted(v) | Self::Fallback(v) => v,
        }
    }

    /// Whether the value is a locally bound default.
    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback(_))
    }
}

/// Resolves the effective value of a declared attribute and performs the
/// initial bind.
///
/// The store is the source of truth: an existing value always wins over the
/// declared default, and the default is written only when the key is absent.
pub struct BootstrapResolver {
    store: Arc<dyn StoreClient>,
    registry: Arc<BindingRegistry>,
    timeout: Duration,
    atomic_first_write: bool,
}

impl BootstrapResolver {
    /// Create a resolver.
    ///
    /// With `atomic_first_write`, the default is written through the store's
    /// set-if-absent primitive, so concurrent first bootstraps from several
    /// processes agree on one value. Without it, existence is checked first
    /// and the last concurrent writer wins.
    pub fn new(
        store: Arc<dyn StoreClient>,
        registry: Arc<BindingRegistry>,
        timeout: Duration,
        atomic_first_write: bool,
    ) -> Self {
        Self {
            store,
            registry,
            timeout,
            atomic_first_write,
        }
    }

    /// Resolve `descriptor` for `target` within `namespace`.
    ///
    /// On success the target slot holds the effective value and the target is
    /// bound to the attribute's key.
    ///
    /// # Errors
    ///
    /// - [`crate::error::DccError::ConfigDeclaration`] if no default is declared
    ///   (nothing is written anywhere)
    /// - [`crate::error::DccError::StoreUnavailable`] /
    ///   [`crate::error::DccError::StoreTimeout`] if the store fails (the target
    ///   is left untouched)
    /// - [`crate::error::DccError::TargetBinding`] if the target rejects the value
    pub async fn resolve(
        &self,
        namespace: &str,
        descriptor: &AttributeDescriptor,
        target: &Arc<dyn Configurable>,
    ) -> Result<EffectiveValue> {
        let default_value = descriptor.require_default()?;
        let key = StoreKey::new(namespace, descriptor.name());

        let effective = self.resolve_value(&key, default_value).await?;
        target.set_slot(descriptor.name(), effective.value())?;
        self.registry.register(&key, target);

        tracing::info!(
            key = %key,
            target_name = %target.target_name(),
            value = effective.value(),
            "bootstrapped attribute"
        );
        Ok(effective)
    }

    /// Bind the declared default without consulting the store.
    ///
    /// Used after a store failure so the target still starts with a defined
    /// value, and stays registered for later changes.
    ///
    /// # Errors
    ///
    /// Returns a declaration error if there is no default, or a binding error
    /// if the target rejects it.
    pub fn fallback(
        &self,
        namespace: &str,
        descriptor: &AttributeDescriptor,
        target: &Arc<dyn Configurable>,
    ) -> Result<EffectiveValue> {
        let default_value = descriptor.require_default()?;
        let key = StoreKey::new(namespace, descriptor.name());

        target.set_slot(descriptor.name(), default_value)?;
        self.registry.register(&key, target);
        Ok(EffectiveValue::Fallback(default_value.to_string()))
    }

    async fn resolve_value(&self, key: &StoreKey, default_value: &str) -> Result<EffectiveValue> {
        let store = &self.store;

        if self.atomic_first_write {
            let written = timed(
                "set_if_absent",
                key,
                self.timeout,
                store.set_if_absent(key.as_str(), default_value),
            )
            .await?;
            if written {
                return Ok(EffectiveValue::Defaulted(default_value.to_string()));
            }
        } else {
            let exists = timed("exists", key, self.timeout, store.exists(key.as_str())).await?;
            if !exists {
                timed("set", key, self.timeout, store.set(key.as_str(), default_value)).await?;
                return Ok(EffectiveValue::Defaulted(default_value.to_string()));
            }
        }

        match timed("get", key, self.timeout, store.get(key.as_str())).await? {
            Some(value) => Ok(EffectiveValue::FromStore(value)),
            None => {
                // Deleted between the existence check and the read.
                timed("set", key, self.timeout, store.set(key.as_str(), default_value)).await?;
                Ok(EffectiveValue::Defaulted(default_value.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::DynamicAttributes;
    use crate::error::DccError;
    use crate::store::MemoryStore;

    fn setup(atomic: bool) -> (MemoryStore, Arc<BindingRegistry>, BootstrapResolver) {
        let store = MemoryStore::new();
        let registry = Arc::new(BindingRegistry::new());
        let resolver = BootstrapResolver::new(
            Arc::new(store.clone()),
            Arc::clone(&registry),
            Duration::from_secs(1),
            atomic,
        );
        (store, registry, resolver)
    }

    fn target() -> Arc<DynamicAttributes> {
        Arc::new(
            DynamicAttributes::builder("OrderService")
                .attribute("retryLimit", "3")
                .build(),
        )
    }

    #[tokio::test]
    async fn test_empty_store_writes_default() {
        for atomic in [false, true] {
            let (store, registry, resolver) = setup(atomic);
            let t = target();
            let dyn_t: Arc<dyn Configurable> = t.clone();
            let descriptor = AttributeDescriptor::new("retryLimit", "3");

            let effective = resolver.resolve("orders", &descriptor, &dyn_t).await.unwrap();

            assert_eq!(effective, EffectiveValue::Defaulted("3".into()));
            assert_eq!(store.peek("orders_retryLimit").as_deref(), Some("3"));
            assert_eq!(t.get("retryLimit").unwrap().as_str(), "3");
            assert!(registry.is_bound(&StoreKey::new("orders", "retryLimit")));
        }
    }

    #[tokio::test]
    async fn test_existing_value_wins() {
        for atomic in [false, true] {
            let (store, _registry, resolver) = setup(atomic);
            store.set("orders_retryLimit", "9").await.unwrap();
            let t = target();
            let dyn_t: Arc<dyn Configurable> = t.clone();

            let effective = resolver
                .resolve("orders", &AttributeDescriptor::new("retryLimit", "3"), &dyn_t)
                .await
                .unwrap();

            assert_eq!(effective, EffectiveValue::FromStore("9".into()));
            assert_eq!(store.peek("orders_retryLimit").as_deref(), Some("9"));
            assert_eq!(t.get("retryLimit").unwrap().as_str(), "9");
        }
    }

    #[tokio::test]
    async fn test_missing_default_touches_nothing() {
        let (store, registry, resolver) = setup(false);
        let t = target();
        let dyn_t: Arc<dyn Configurable> = t.clone();

        let err = resolver
            .resolve("orders", &AttributeDescriptor::without_default("retryLimit"), &dyn_t)
            .await
            .unwrap_err();

        assert!(err.is_declaration_error());
        assert!(store.is_empty());
        assert!(registry.is_empty());
        assert!(t.get("retryLimit").is_none());
    }

    #[tokio::test]
    async fn test_store_down_leaves_target_unbound() {
        let (store, registry, resolver) = setup(false);
        store.set_available(false);
        let t = target();
        let dyn_t: Arc<dyn Configurable> = t.clone();
        let descriptor = AttributeDescriptor::new("retryLimit", "3");

        let err = resolver.resolve("orders", &descriptor, &dyn_t).await.unwrap_err();
        assert!(matches!(err, DccError::StoreUnavailable(_)));
        assert!(t.get("retryLimit").is_none());

        let effective = resolver.fallback("orders", &descriptor, &dyn_t).unwrap();
        assert!(effective.is_fallback());
        assert_eq!(t.get("retryLimit").unwrap().as_str(), "3");
        assert!(registry.is_bound(&StoreKey::new("orders", "retryLimit")));
    }

    #[tokio::test]
    async fn test_missing_slot_is_binding_error() {
        let (store, _registry, resolver) = setup(false);
        let t = target();
        let dyn_t: Arc<dyn Configurable> = t.clone();

        let err = resolver
            .resolve("orders", &AttributeDescriptor::new("timeout", "500"), &dyn_t)
            .await
            .unwrap_err();

        assert!(matches!(err, DccError::TargetBinding { .. }));
        // The store default is still established for other instances.
        assert_eq!(store.peek("orders_timeout").as_deref(), Some("500"));
    }
}
