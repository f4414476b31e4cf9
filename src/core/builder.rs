//! Builder for constructing AttributeSyncService instances.

use crate::core::{AttributeSyncService, BindingRegistry, BootstrapResolver, ChangePropagator};
use crate::error::{Result, ValidationError};
use crate::settings::DccSettings;
use crate::store::{MemoryStore, StoreClient};
use std::sync::Arc;
use std::time::Duration;

#[cfg(feature = "metrics")]
use crate::metrics::SyncMetrics;

/// Builder for constructing an [`AttributeSyncService`].
///
/// # Examples
///
/// ```rust,no_run
/// use dcc_sync::prelude::*;
/// use dcc_sync::settings::SettingsLoader;
/// use std::sync::Arc;
///
/// # fn example() -> Result<()> {
/// let settings = SettingsLoader::new()
///     .with_file("config/dcc.yaml")
///     .with_env_overrides("DCC", "__")
///     .load()?;
///
/// let service = AttributeSyncService::builder()
///     .with_settings(&settings)
///     .with_store(Arc::new(MemoryStore::new()))
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct AttributeSyncServiceBuilder {
    namespace: Option<String>,
    store: Option<Arc<dyn StoreClient>>,
    registry: Option<Arc<BindingRegistry>>,
    store_timeout: Duration,
    atomic_first_write: bool,
    enabled: bool,
    #[cfg(feature = "metrics")]
    metrics: Option<SyncMetrics>,
}

impl AttributeSyncServiceBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        let defaults = DccSettings::default();
        Self {
            namespace: None,
            store: None,
            registry: None,
            store_timeout: defaults.store_timeout(),
            atomic_first_write: defaults.atomic_first_write,
            enabled: defaults.enabled,
            #[cfg(feature = "metrics")]
            metrics: None,
        }
    }

    /// Apply loaded settings: namespace, enablement, timeout and first-write mode.
    pub fn with_settings(mut self, settings: &DccSettings) -> Self {
        self.namespace = Some(settings.system.clone());
        self.enabled = settings.enabled;
        self.store_timeout = settings.store_timeout();
        self.atomic_first_write = settings.atomic_first_write;
        self
    }

    /// Set the namespace (system name) that prefixes keys and names the topic.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Set the shared store.
    pub fn with_store(mut self, store: Arc<dyn StoreClient>) -> Self {
        self.store = Some(store);
        self
    }

    /// Use an existing binding registry instead of a fresh one.
    pub fn with_registry(mut self, registry: Arc<BindingRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Set the timeout applied to every store call.
    ///
    /// Default is 3 seconds.
    pub fn with_store_timeout(mut self, timeout: Duration) -> Self {
        self.store_timeout = timeout;
        self
    }

    /// Write first-time defaults with the store's set-if-absent primitive.
    ///
    /// Concurrent first bootstraps from several processes then agree on the
    /// first written default instead of the last.
    pub fn with_atomic_first_write(mut self, atomic: bool) -> Self {
        self.atomic_first_write = atomic;
        self
    }

    /// Enable or disable synchronization.
    ///
    /// A disabled service binds declared defaults without touching the store
    /// and ignores change messages.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Record OpenTelemetry metrics with `meter`.
    #[cfg(feature = "metrics")]
    pub fn with_metrics(mut self, meter: opentelemetry::metrics::Meter) -> Self {
        self.metrics = Some(SyncMetrics::new(meter));
        self
    }

    /// Build the service.
    ///
    /// # Errors
    ///
    /// Returns a validation error if:
    /// - No namespace is set, or it is blank
    /// - Synchronization is enabled but no store is set
    /// - The store timeout is zero
    pub fn build(self) -> Result<AttributeSyncService> {
        let namespace = self
            .namespace
            .filter(|ns| !ns.trim().is_empty())
            .ok_or_else(|| ValidationError::invalid_field("namespace", "must not be blank"))?;

        if self.store_timeout.is_zero() {
            return Err(ValidationError::invalid_field("store_timeout", "must be greater than 0").into());
        }

        let store: Arc<dyn StoreClient> = match (self.store, self.enabled) {
            (Some(store), _) => store,
            // A disabled service never calls the store.
            (None, false) => Arc::new(MemoryStore::new()),
            (None, true) => {
                return Err(ValidationError::invalid_field("store", "a store is required").into());
            }
        };

        let registry = self
            .registry
            .unwrap_or_else(|| Arc::new(BindingRegistry::new()));

        let resolver = BootstrapResolver::new(
            Arc::clone(&store),
            Arc::clone(&registry),
            self.store_timeout,
            self.atomic_first_write,
        );
        let propagator = ChangePropagator::new(store, Arc::clone(&registry), self.store_timeout);

        tracing::debug!(
            namespace = %namespace,
            enabled = self.enabled,
            atomic_first_write = self.atomic_first_write,
            "built attribute sync service"
        );

        let service =
            AttributeSyncService::from_parts(namespace, self.enabled, registry, resolver, propagator);

        #[cfg(feature = "metrics")]
        let service = service.with_sync_metrics(self.metrics);

        Ok(service)
    }
}

impl Default for AttributeSyncServiceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DccError;

    #[test]
    fn test_namespace_required() {
        let err = AttributeSyncServiceBuilder::new()
            .with_store(Arc::new(MemoryStore::new()))
            .build()
            .err()
            .unwrap();
        assert!(matches!(err, DccError::ValidationError(_)));

        assert!(
            AttributeSyncServiceBuilder::new()
                .with_namespace("  ")
                .with_store(Arc::new(MemoryStore::new()))
                .build()
                .is_err()
        );
    }

    #[test]
    fn test_store_required_when_enabled() {
        assert!(AttributeSyncServiceBuilder::new().with_namespace("orders").build().is_err());
        assert!(
            AttributeSyncServiceBuilder::new()
                .with_namespace("orders")
                .with_enabled(false)
                .build()
                .is_ok()
        );
    }

    #[test]
    fn test_with_settings() {
        let settings = DccSettings {
            system: "payments".into(),
            enabled: false,
            ..Default::default()
        };
        let service = AttributeSyncServiceBuilder::new()
            .with_settings(&settings)
            .build()
            .unwrap();

        assert_eq!(service.namespace(), "payments");
        assert_eq!(service.topic(), "DYNAMIC_CONFIG_CENTER_REDIS_TOPIC_payments");
        assert!(!service.is_enabled());
    }

    #[test]
    fn test_shared_registry() {
        let registry = Arc::new(BindingRegistry::new());
        let service = AttributeSyncServiceBuilder::new()
            .with_namespace("orders")
            .with_store(Arc::new(MemoryStore::new()))
            .with_registry(Arc::clone(&registry))
            .build()
            .unwrap();
        assert!(Arc::ptr_eq(service.registry(), &registry));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        assert!(
            AttributeSyncServiceBuilder::new()
                .with_namespace("orders")
                .with_store(Arc::new(MemoryStore::new()))
                .with_store_timeout(Duration::ZERO)
                .build()
                .is_err()
        );
    }
}
