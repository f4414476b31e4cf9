//! The attribute sync service: bootstrap targets, apply changes.

use crate::core::{
    AttributeSyncServiceBuilder, BindingRegistry, BootstrapResolver, ChangeMessage,
    ChangePropagator, Configurable, EffectiveValue, PropagationOutcome, render_key, topic_for,
};
use crate::error::{DccError, Result};
use crate::notify::{ChangeListener, NotificationChannel};
use std::sync::Arc;

#[cfg(feature = "metrics")]
use crate::metrics::SyncMetrics;

/// Result of bootstrapping one target.
#[derive(Debug)]
pub struct BootstrapReport {
    target: String,
    resolved: Vec<(String, EffectiveValue)>,
    failures: Vec<(String, DccError)>,
}

impl BootstrapReport {
    fn new(target: String) -> Self {
        Self {
            target,
            resolved: Vec::new(),
            failures: Vec::new(),
        }
    }

    /// Name of the bootstrapped target.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Attributes that were bound, with their effective values.
    pub fn resolved(&self) -> &[(String, EffectiveValue)] {
        &self.resolved
    }

    /// Attributes that could not be bound.
    pub fn failures(&self) -> &[(String, DccError)] {
        &self.failures
    }

    /// The effective value of one attribute.
    pub fn value(&self, attribute: &str) -> Option<&EffectiveValue> {
        self.resolved
            .iter()
            .find(|(name, _)| name == attribute)
            .map(|(_, value)| value)
    }

    /// Whether every declared attribute was bound.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Number of attributes bound to their local default after a store failure.
    pub fn fallback_count(&self) -> usize {
        self.resolved.iter().filter(|(_, v)| v.is_fallback()).count()
    }
}

/// Keeps declared attributes of in-process targets in sync with the shared store.
///
/// Exposes two entry points: [`bootstrap`](Self::bootstrap), called once per
/// target when it is created, and [`on_change`](Self::on_change), called once
/// per inbound change message (usually through [`listen`](Self::listen)).
///
/// # Examples
///
/// ```rust
/// use dcc_sync::prelude::*;
/// use std::sync::Arc;
///
/// # async fn example() -> Result<()> {
/// let service = AttributeSyncService::builder()
///     .with_namespace("orders")
///     .with_store(Arc::new(MemoryStore::new()))
///     .build()?;
///
/// let target = Arc::new(
///     DynamicAttributes::builder("OrderService")
///         .attribute("retryLimit", "3")
///         .build(),
/// );
/// service.bootstrap(target.clone()).await?;
/// assert_eq!(target.get("retryLimit").unwrap().as_str(), "3");
///
/// service.on_change(ChangeMessage::new("retryLimit", "5")).await;
/// assert_eq!(target.get("retryLimit").unwrap().as_str(), "5");
/// # Ok(())
/// # }
/// ```
pub struct AttributeSyncService {
    namespace: String,
    enabled: bool,
    registry: Arc<BindingRegistry>,
    resolver: BootstrapResolver,
    propagator: ChangePropagator,
    #[cfg(feature = "metrics")]
    metrics: Option<SyncMetrics>,
}

impl AttributeSyncService {
    /// Create a new builder for constructing a service.
    pub fn builder() -> AttributeSyncServiceBuilder {
        AttributeSyncServiceBuilder::new()
    }

    pub(crate) fn from_parts(
        namespace: String,
        enabled: bool,
        registry: Arc<BindingRegistry>,
        resolver: BootstrapResolver,
        propagator: ChangePropagator,
    ) -> Self {
        Self {
            namespace,
            enabled,
            registry,
            resolver,
            propagator,
            #[cfg(feature = "metrics")]
            metrics: None,
        }
    }

    #[cfg(feature = "metrics")]
    pub(crate) fn with_sync_metrics(mut self, metrics: Option<SyncMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    /// The namespace (system name) of this service.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// The notification topic this service consumes.
    pub fn topic(&self) -> String {
        topic_for(&self.namespace)
    }

    /// Whether synchronization is enabled.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// The binding registry.
    pub fn registry(&self) -> &Arc<BindingRegistry> {
        &self.registry
    }

    /// Resolve and bind every attribute `target` declares.
    ///
    /// All declarations are checked before anything is written. After that,
    /// each attribute is bootstrapped independently: a store failure binds
    /// the declared default locally (and keeps the binding, so later changes
    /// still arrive), a rejected slot write is recorded in the report.
    ///
    /// # Errors
    ///
    /// Returns [`DccError::ConfigDeclaration`] if any attribute lacks a name
    /// or default. Nothing is written to the store or the target in that case.
    pub async fn bootstrap(&self, target: Arc<dyn Configurable>) -> Result<BootstrapReport> {
        let declared = target.declared_attributes();
        for descriptor in &declared {
            descriptor.require_default()?;
        }

        let mut report = BootstrapReport::new(target.target_name());

        for descriptor in &declared {
            let outcome = if self.enabled {
                match self.resolver.resolve(&self.namespace, descriptor, &target).await {
                    Err(e) if e.is_store_failure() => {
                        tracing::warn!(
                            target_name = %report.target,
                            attribute = descriptor.name(),
                            error = %e,
                            "store unavailable at bootstrap, using declared default"
                        );
                        self.resolver.fallback(&self.namespace, descriptor, &target)
                    }
                    other => other,
                }
            } else {
                self.bind_detached(descriptor.name(), descriptor.default_value(), &target)
            };

            match outcome {
                Ok(value) => {
                    #[cfg(feature = "metrics")]
                    if let Some(metrics) = &self.metrics {
                        metrics.record_bootstrap(value.is_fallback());
                    }
                    report.resolved.push((descriptor.name().to_string(), value));
                }
                Err(e) => {
                    tracing::warn!(
                        target_name = %report.target,
                        attribute = descriptor.name(),
                        error = %e,
                        "failed to bootstrap attribute"
                    );
                    #[cfg(feature = "metrics")]
                    if let Some(metrics) = &self.metrics {
                        metrics.record_bootstrap_failure();
                    }
                    report.failures.push((descriptor.name().to_string(), e));
                }
            }
        }

        #[cfg(feature = "metrics")]
        if let Some(metrics) = &self.metrics {
            metrics.update_bound_keys(self.registry.key_count());
        }

        Ok(report)
    }

    /// Apply one change message.
    ///
    /// Never fails: store errors and rejected target writes are logged and
    /// returned in the outcome, and the previous values stay in effect.
    pub async fn on_change(&self, message: ChangeMessage) -> PropagationOutcome {
        if !self.enabled || message.attribute.trim().is_empty() {
            tracing::debug!(
                attribute = %message.attribute,
                enabled = self.enabled,
                "ignoring change message"
            );
            return PropagationOutcome::Ignored {
                key: format!("{}_{}", self.namespace, message.attribute),
            };
        }

        #[cfg(feature = "metrics")]
        let timer = std::time::Instant::now();

        match self.propagator.propagate(&self.namespace, &message).await {
            Ok(outcome) => {
                #[cfg(feature = "metrics")]
                if let Some(metrics) = &self.metrics {
                    match &outcome {
                        PropagationOutcome::Applied { failures, .. } => {
                            metrics.record_propagation_applied(timer, failures.len())
                        }
                        _ => metrics.record_propagation_ignored(),
                    }
                }
                outcome
            }
            Err(error) => {
                let key = render_key(&self.namespace, &message.attribute);
                tracing::error!(
                    key = %key,
                    value = %message.value,
                    error = %error,
                    "failed to propagate attribute change, keeping previous value"
                );
                #[cfg(feature = "metrics")]
                if let Some(metrics) = &self.metrics {
                    metrics.record_propagation_failure(timer);
                }
                PropagationOutcome::Failed { key, error }
            }
        }
    }

    /// Subscribe to this service's topic on `channel` and apply every
    /// received change in a background task.
    ///
    /// # Errors
    ///
    /// Returns an error if the subscription cannot be created.
    pub async fn listen(self: &Arc<Self>, channel: &dyn NotificationChannel) -> Result<ChangeListener> {
        let topic = self.topic();
        let subscription = channel.subscribe(&topic).await?;
        tracing::info!(topic = %topic, channel = %channel.name(), "listening for attribute changes");
        Ok(ChangeListener::spawn(Arc::clone(self), subscription))
    }

    fn bind_detached(
        &self,
        attribute: &str,
        default_value: Option<&str>,
        target: &Arc<dyn Configurable>,
    ) -> Result<EffectiveValue> {
        let value = default_value.unwrap_or_default();
        target.set_slot(attribute, value)?;
        Ok(EffectiveValue::Fallback(value.to_string()))
    }
}
