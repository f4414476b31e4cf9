//! Bindable targets.
//!
//! A target is any in-process object holding configurable slots. Instead of
//! discovering fields at runtime, each target publishes an explicit table of
//! its attributes through [`Configurable`].

use crate::core::AttributeDescriptor;
use crate::error::{DccError, Result};
use arc_swap::ArcSwapOption;
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

/// An object whose named slots can be read and written by the sync service.
///
/// Implementations must use interior mutability: slots are written through
/// `&self` from bootstrap and from notification delivery tasks.
pub trait Configurable: Send + Sync {
    /// A human-readable name for logging.
    fn target_name(&self) -> String;

    /// The attributes this target declares, with their defaults.
    fn declared_attributes(&self) -> Vec<AttributeDescriptor>;

    /// Read the current value of a slot, or `None` if there is no such slot
    /// or it has not been bound yet.
    fn get_slot(&self, name: &str) -> Option<String>;

    /// Write a value into a slot.
    ///
    /// # Errors
    ///
    /// Returns [`DccError::TargetBinding`] if the slot does not exist or the
    /// value is rejected.
    fn set_slot(&self, name: &str, value: &str) -> Result<()>;
}

struct Slot {
    descriptor: AttributeDescriptor,
    value: ArcSwapOption<String>,
}

/// A named table of string slots.
///
/// Reads are lock-free (`arc-swap`), so hot paths can poll a slot on every
/// request while changes are applied concurrently.
///
/// # Examples
///
/// ```rust
/// use dcc_sync::core::{Configurable, DynamicAttributes};
///
/// let target = DynamicAttributes::builder("OrderService")
///     .attribute("retryLimit", "3")
///     .build();
///
/// assert!(target.get("retryLimit").is_none());
/// target.set_slot("retryLimit", "5").unwrap();
/// assert_eq!(target.get("retryLimit").unwrap().as_str(), "5");
/// ```
pub struct DynamicAttributes {
    name: String,
    slots: Vec<Slot>,
}

impl DynamicAttributes {
    /// Start building a slot table for a target called `name`.
    pub fn builder(name: impl Into<String>) -> DynamicAttributesBuilder {
        DynamicAttributesBuilder {
            name: name.into(),
            descriptors: Vec::new(),
        }
    }

    /// The current value of a slot.
    pub fn get(&self, name: &str) -> Option<Arc<String>> {
        self.slot(name).and_then(|slot| slot.value.load_full())
    }

    /// Names of all declared slots, in declaration order.
    pub fn slot_names(&self) -> impl Iterator<Item = &str> {
        self.slots.iter().map(|slot| slot.descriptor.name())
    }

    fn slot(&self, name: &str) -> Option<&Slot> {
        self.slots.iter().find(|slot| slot.descriptor.name() == name)
    }
}

impl Configurable for DynamicAttributes {
    fn target_name(&self) -> String {
        self.name.clone()
    }

    fn declared_attributes(&self) -> Vec<AttributeDescriptor> {
        self.slots.iter().map(|slot| slot.descriptor.clone()).collect()
    }

    fn get_slot(&self, name: &str) -> Option<String> {
        self.get(name).map(|value| value.as_ref().clone())
    }

    fn set_slot(&self, name: &str, value: &str) -> Result<()> {
        let slot = self.slot(name).ok_or_else(|| {
            DccError::binding(name, format!("target '{}' has no slot named '{}'", self.name, name))
        })?;
        slot.value.store(Some(Arc::new(value.to_string())));
        Ok(())
    }
}

impl fmt::Debug for DynamicAttributes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for slot in &self.slots {
            map.entry(&slot.descriptor.name(), &slot.value.load_full());
        }
        map.finish()
    }
}

/// Builder for [`DynamicAttributes`].
pub struct DynamicAttributesBuilder {
    name: String,
    descriptors: Vec<AttributeDescriptor>,
}

impl DynamicAttributesBuilder {
    /// Declare a slot with a default value.
    pub fn attribute(self, name: impl Into<String>, default_value: impl Into<String>) -> Self {
        self.declared(AttributeDescriptor::new(name, default_value))
    }

    /// Declare a slot from a `"name:default"` string.
    ///
    /// # Errors
    ///
    /// Returns [`DccError::ConfigDeclaration`] if the declaration is blank or
    /// has no name.
    pub fn declaration(self, declaration: &str) -> Result<Self> {
        Ok(self.declared(AttributeDescriptor::parse(declaration)?))
    }

    /// Declare a slot from a descriptor. A later declaration of the same name
    /// replaces the earlier one.
    pub fn declared(mut self, descriptor: AttributeDescriptor) -> Self {
        self.descriptors.retain(|d| d.name() != descriptor.name());
        self.descriptors.push(descriptor);
        self
    }

    /// Build the slot table. All slots start unbound.
    pub fn build(self) -> DynamicAttributes {
        DynamicAttributes {
            name: self.name,
            slots: self
                .descriptors
                .into_iter()
                .map(|descriptor| Slot {
                    descriptor,
                    value: ArcSwapOption::empty(),
                })
                .collect(),
        }
    }
}

type Getter<T> = Box<dyn Fn(&T) -> String + Send + Sync>;
type Setter<T> = Box<dyn Fn(&T, &str) -> std::result::Result<(), String> + Send + Sync>;

struct Accessor<T> {
    descriptor: AttributeDescriptor,
    get: Getter<T>,
    set: Setter<T>,
}

/// A user value exposed through an explicit table of getter/setter pairs.
///
/// Useful when slots are typed fields (atomics, `ArcSwap`s, ...) rather than
/// strings. A setter returning `Err` is reported as a binding failure.
///
/// # Examples
///
/// ```rust
/// use dcc_sync::core::{AccessorTarget, AttributeDescriptor, Configurable};
/// use std::sync::atomic::{AtomicU32, Ordering};
///
/// struct Limits {
///     retry_limit: AtomicU32,
/// }
///
/// let target = AccessorTarget::builder("Limits", Limits { retry_limit: AtomicU32::new(0) })
///     .accessor(
///         AttributeDescriptor::new("retryLimit", "3"),
///         |l: &Limits| l.retry_limit.load(Ordering::Relaxed).to_string(),
///         |l: &Limits, v: &str| {
///             let parsed = v.parse().map_err(|e| format!("not a u32: {e}"))?;
///             l.retry_limit.store(parsed, Ordering::Relaxed);
///             Ok(())
///         },
///     )
///     .build();
///
/// target.set_slot("retryLimit", "7").unwrap();
/// assert_eq!(target.retry_limit.load(Ordering::Relaxed), 7);
/// assert!(target.set_slot("retryLimit", "seven").is_err());
/// ```
pub struct AccessorTarget<T> {
    name: String,
    inner: T,
    accessors: Vec<Accessor<T>>,
}

impl<T> AccessorTarget<T> {
    /// Start building an accessor table around `inner`.
    pub fn builder(name: impl Into<String>, inner: T) -> AccessorTargetBuilder<T> {
        AccessorTargetBuilder {
            name: name.into(),
            inner,
            accessors: Vec::new(),
        }
    }

    /// The wrapped value.
    pub fn inner(&self) -> &T {
        &self.inner
    }

    fn accessor(&self, name: &str) -> Option<&Accessor<T>> {
        self.accessors.iter().find(|a| a.descriptor.name() == name)
    }
}

impl<T> Deref for AccessorTarget<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.inner
    }
}

impl<T: Send + Sync> Configurable for AccessorTarget<T> {
    fn target_name(&self) -> String {
        self.name.clone()
    }

    fn declared_attributes(&self) -> Vec<AttributeDescriptor> {
        self.accessors.iter().map(|a| a.descriptor.clone()).collect()
    }

    fn get_slot(&self, name: &str) -> Option<String> {
        self.accessor(name).map(|a| (a.get)(&self.inner))
    }

    fn set_slot(&self, name: &str, value: &str) -> Result<()> {
        let accessor = self.accessor(name).ok_or_else(|| {
            DccError::binding(name, format!("target '{}' has no slot named '{}'", self.name, name))
        })?;
        (accessor.set)(&self.inner, value).map_err(|reason| DccError::binding(name, reason))
    }
}

/// Builder for [`AccessorTarget`].
pub struct AccessorTargetBuilder<T> {
    name: String,
    inner: T,
    accessors: Vec<Accessor<T>>,
}

impl<T> AccessorTargetBuilder<T> {
    /// Register a getter/setter pair for a declared attribute.
    pub fn accessor<G, S>(mut self, descriptor: AttributeDescriptor, get: G, set: S) -> Self
    where
        G: Fn(&T) -> String + Send + Sync + 'static,
        S: Fn(&T, &str) -> std::result::Result<(), String> + Send + Sync + 'static,
    {
        self.accessors.retain(|a| a.descriptor.name() != descriptor.name());
        self.accessors.push(Accessor {
            descriptor,
            get: Box::new(get),
            set: Box::new(set),
        });
        self
    }

    /// Build the target.
    pub fn build(self) -> AccessorTarget<T> {
        AccessorTarget {
            name: self.name,
            inner: self.inner,
            accessors: self.accessors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declared_attributes_keep_order() {
        let target = DynamicAttributes::builder("RateLimiter")
            .attribute("isSwitch", "true")
            .declaration("limit:100")
            .unwrap()
            .build();

        let names: Vec<_> = target.slot_names().collect();
        assert_eq!(names, vec!["isSwitch", "limit"]);
        assert_eq!(target.declared_attributes()[1].default_value(), Some("100"));
    }

    #[test]
    fn test_redeclaration_replaces() {
        let target = DynamicAttributes::builder("t")
            .attribute("limit", "1")
            .attribute("limit", "2")
            .build();
        let declared = target.declared_attributes();
        assert_eq!(declared.len(), 1);
        assert_eq!(declared[0].default_value(), Some("2"));
    }

    #[test]
    fn test_unknown_slot_is_binding_error() {
        let target = DynamicAttributes::builder("t").attribute("limit", "1").build();
        let err = target.set_slot("missing", "x").unwrap_err();
        assert!(matches!(err, DccError::TargetBinding { .. }));
        assert_eq!(target.get_slot("missing"), None);
    }

    #[test]
    fn test_accessor_target_get_slot() {
        let target = AccessorTarget::builder("Label", label_cell::Cell::default())
            .accessor(
                AttributeDescriptor::new("label", "none"),
                |c: &label_cell::Cell| c.get(),
                |c: &label_cell::Cell, v: &str| {
                    c.set(v);
                    Ok(())
                },
            )
            .build();

        target.set_slot("label", "blue").unwrap();
        assert_eq!(target.get_slot("label").as_deref(), Some("blue"));
        assert_eq!(target.inner().get(), "blue");
    }

    mod label_cell {
        use std::sync::Mutex;

        #[derive(Default)]
        pub struct Cell(Mutex<String>);

        impl Cell {
            pub fn get(&self) -> String {
                self.0.lock().unwrap().clone()
            }

            pub fn set(&self, v: &str) {
                *self.0.lock().unwrap() = v.to_string();
            }
        }
    }
}
