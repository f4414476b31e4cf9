//! Change propagation: store write, then rebind every bound target.

use crate::core::{BindingRegistry, ChangeMessage, StoreKey};
use crate::error::{DccError, Result};
use crate::store::{StoreClient, timed};
use std::sync::Arc;
use std::time::Duration;

/// What happened to one change message.
#[derive(Debug)]
pub enum PropagationOutcome {
    /// The key was never bootstrapped anywhere; nothing changed.
    Ignored {
        /// The rendered store key
        key: String,
    },
    /// The store was updated and the bound targets were rebound.
    Applied {
        /// The rendered store key
        key: String,
        /// Number of targets updated in this process
        updated: usize,
        /// Per-target binding failures; these targets keep their old value
        failures: Vec<DccError>,
    },
    /// The store could not be read or written; no target was touched.
    Failed {
        /// The rendered store key
        key: String,
        /// The store error
        error: DccError,
    },
}

impl PropagationOutcome {
    /// The rendered store key the message addressed.
    pub fn key(&self) -> &str {
        match self {
            Self::Ignored { key } | Self::Applied { key, .. } | Self::Failed { key, .. } => key,
        }
    }

    /// Number of targets updated.
    pub fn updated(&self) -> usize {
        match self {
            Self::Applied { updated, .. } => *updated,
            _ => 0,
        }
    }

    /// Whether the change reached the store.
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }
}

/// Applies change messages to the store and to every bound target.
pub struct ChangePropagator {
    store: Arc<dyn StoreClient>,
    registry: Arc<BindingRegistry>,
    timeout: Duration,
}

impl ChangePropagator {
    /// Create a propagator.
    pub fn new(store: Arc<dyn StoreClient>, registry: Arc<BindingRegistry>, timeout: Duration) -> Self {
        Self {
            store,
            registry,
            timeout,
        }
    }

    /// Apply `message` within `namespace`.
    ///
    /// Changes to keys absent from the store are ignored. Otherwise the new
    /// value overwrites the store (last writer wins) and is then written into
    /// every target bound in this process. A target that rejects the value is
    /// reported in the outcome and does not stop the others.
    ///
    /// # Errors
    ///
    /// Returns a store error if the existence check or the write fails; in
    /// that case no target is rebound.
    pub async fn propagate(&self, namespace: &str, message: &ChangeMessage) -> Result<PropagationOutcome> {
        let key = StoreKey::new(namespace, message.attribute.as_str());
        let store = &self.store;

        if !timed("exists", &key, self.timeout, store.exists(key.as_str())).await? {
            tracing::debug!(key = %key, "ignoring change for unknown attribute");
            return Ok(PropagationOutcome::Ignored {
                key: key.as_str().to_string(),
            });
        }

        timed("set", &key, self.timeout, store.set(key.as_str(), &message.value)).await?;

        let mut updated = 0;
        let mut failures = Vec::new();
        for target in self.registry.targets_for(&key) {
            match target.set_slot(&message.attribute, &message.value) {
                Ok(()) => {
                    updated += 1;
                    tracing::info!(
                        key = %key,
                        target_name = %target.target_name(),
                        value = %message.value,
                        "applied attribute change"
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        key = %key,
                        target_name = %target.target_name(),
                        error = %e,
                        "failed to apply attribute change to target"
                    );
                    failures.push(e);
                }
            }
        }

        Ok(PropagationOutcome::Applied {
            key: key.as_str().to_string(),
            updated,
            failures,
        })
    }
}
