//! Service settings and their loading.

mod loader;
mod validation;

pub use loader::SettingsLoader;
pub use validation::Validate;

use crate::core::{render_key, topic_for};
use crate::error::ValidationError;
use serde::Deserialize;
use std::time::Duration;

/// Settings of the attribute sync service.
///
/// Every field has a default, so partial files and environment overrides
/// are fine.
///
/// | Field                | Default            | Env override (`DCC`, `__`) |
/// |----------------------|--------------------|----------------------------|
/// | `system`             | `"default-system"` | `DCC_SYSTEM`               |
/// | `enabled`            | `true`             | `DCC_ENABLED`              |
/// | `store_timeout_ms`   | `3000`             | `DCC_STORE_TIMEOUT_MS`     |
/// | `atomic_first_write` | `false`            | `DCC_ATOMIC_FIRST_WRITE`   |
/// | `channel_capacity`   | `1024`             | `DCC_CHANNEL_CAPACITY`     |
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DccSettings {
    /// Namespace of this deployment; prefixes store keys and names the topic
    pub system: String,
    /// When false, targets get their declared defaults and nothing is synchronized
    pub enabled: bool,
    /// Timeout applied to every store call, in milliseconds
    pub store_timeout_ms: u64,
    /// Write first-time defaults with set-if-absent instead of check-then-set
    pub atomic_first_write: bool,
    /// Buffered messages per in-process channel subscription
    pub channel_capacity: usize,
}

impl DccSettings {
    /// The store timeout as a `Duration`.
    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }

    /// The notification topic of this system.
    pub fn topic(&self) -> String {
        topic_for(&self.system)
    }

    /// The store key of `attribute` in this system.
    pub fn key(&self, attribute: &str) -> String {
        render_key(&self.system, attribute)
    }
}

impl Default for DccSettings {
    fn default() -> Self {
        Self {
            system: "default-system".to_string(),
            enabled: true,
            store_timeout_ms: 3000,
            atomic_first_write: false,
            channel_capacity: 1024,
        }
    }
}

impl Validate for DccSettings {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = Vec::new();

        if self.system.trim().is_empty() {
            errors.push(ValidationError::invalid_field("system", "must not be blank"));
        }
        if self.store_timeout_ms == 0 {
            errors.push(ValidationError::invalid_field(
                "store_timeout_ms",
                "must be greater than 0",
            ));
        }
        if self.channel_capacity == 0 {
            errors.push(ValidationError::invalid_field(
                "channel_capacity",
                "must be greater than 0",
            ));
        }

        match errors.len() {
            0 => Ok(()),
            1 => Err(errors.remove(0)),
            _ => Err(ValidationError::Multiple(errors)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let settings = DccSettings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.store_timeout(), Duration::from_secs(3));
    }

    #[test]
    fn test_naming() {
        let settings = DccSettings {
            system: "orders".into(),
            ..Default::default()
        };
        assert_eq!(settings.key("retryLimit"), "orders_retryLimit");
        assert_eq!(settings.topic(), "DYNAMIC_CONFIG_CENTER_REDIS_TOPIC_orders");
    }

    #[test]
    fn test_collects_all_errors() {
        let settings = DccSettings {
            system: String::new(),
            store_timeout_ms: 0,
            ..Default::default()
        };
        match settings.validate() {
            Err(ValidationError::Multiple(errors)) => assert_eq!(errors.len(), 2),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
