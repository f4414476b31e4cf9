//! Store key and topic naming.
//!
//! The rendered forms are shared with every other process attached to the same
//! store and channel, so they must not change.

use std::fmt;
use std::hash::{Hash, Hasher};

/// Prefix of the change notification topic for a namespace.
pub const TOPIC_PREFIX: &str = "DYNAMIC_CONFIG_CENTER_REDIS_TOPIC_";

/// Render the store key for an attribute: `"{namespace}_{name}"`.
///
/// Empty inputs are a programming error and trip a debug assertion.
pub fn render_key(namespace: &str, name: &str) -> String {
    debug_assert!(!namespace.is_empty(), "namespace must not be empty");
    debug_assert!(!name.is_empty(), "attribute name must not be empty");
    format!("{namespace}_{name}")
}

/// Render the notification topic for a namespace.
///
/// # Examples
///
/// ```rust
/// use dcc_sync::core::topic_for;
///
/// assert_eq!(topic_for("orders"), "DYNAMIC_CONFIG_CENTER_REDIS_TOPIC_orders");
/// ```
pub fn topic_for(namespace: &str) -> String {
    format!("{TOPIC_PREFIX}{namespace}")
}

/// Fully-qualified key of an attribute in the shared store.
///
/// Equality and hashing use the rendered string only, which is what the
/// store and the binding registry address by.
///
/// # Examples
///
/// ```rust
/// use dcc_sync::core::StoreKey;
///
/// let key = StoreKey::new("orders", "retryLimit");
/// assert_eq!(key.as_str(), "orders_retryLimit");
/// ```
#[derive(Debug, Clone)]
pub struct StoreKey {
    namespace: String,
    name: String,
    rendered: String,
}

impl StoreKey {
    /// Derive the key for `name` within `namespace`.
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        let namespace = namespace.into();
        let name = name.into();
        let rendered = render_key(&namespace, &name);
        Self {
            namespace,
            name,
            rendered,
        }
    }

    /// The namespace part.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// The attribute name part.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The rendered key.
    pub fn as_str(&self) -> &str {
        &self.rendered
    }
}

impl PartialEq for StoreKey {
    fn eq(&self, other: &Self) -> bool {
        self.rendered == other.rendered
    }
}

impl Eq for StoreKey {}

impl Hash for StoreKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rendered.hash(state);
    }
}

impl fmt::Display for StoreKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.rendered)
    }
}

impl AsRef<str> for StoreKey {
    fn as_ref(&self) -> &str {
        &self.rendered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_render_key() {
        assert_eq!(render_key("orders", "retryLimit"), "orders_retryLimit");
        assert_eq!(StoreKey::new("orders", "retryLimit").to_string(), "orders_retryLimit");
    }

    #[test]
    fn test_topic() {
        assert_eq!(
            topic_for("user-service"),
            "DYNAMIC_CONFIG_CENTER_REDIS_TOPIC_user-service"
        );
    }

    #[test]
    fn test_equality_uses_rendered_form() {
        // Different splits of the same rendered string address the same store entry.
        let a = StoreKey::new("a_b", "c");
        let b = StoreKey::new("a", "b_c");
        assert_eq!(a, b);
    }

    proptest! {
        #[test]
        fn prop_key_is_deterministic(ns in "[a-z][a-z0-9-]{0,12}", name in "[a-zA-Z][a-zA-Z0-9]{0,12}") {
            let first = StoreKey::new(ns.clone(), name.clone());
            let second = StoreKey::new(ns.clone(), name.clone());
            prop_assert_eq!(first.as_str(), second.as_str());
            prop_assert!(first.as_str().starts_with(&ns));
            prop_assert!(first.as_str().ends_with(&name));
            prop_assert_eq!(first.as_str().len(), ns.len() + name.len() + 1);
        }
    }
}
