//! Core attribute synchronization types.

mod bootstrap;
mod builder;
mod descriptor;
mod key;
mod message;
mod propagator;
mod registry;
mod service;
mod target;

pub use bootstrap::{BootstrapResolver, EffectiveValue};
pub use builder::AttributeSyncServiceBuilder;
pub use descriptor::{AttributeDescriptor, DECLARATION_SEPARATOR};
pub use key::{StoreKey, TOPIC_PREFIX, render_key, topic_for};
pub use message::ChangeMessage;
pub use propagator::{ChangePropagator, PropagationOutcome};
pub use registry::BindingRegistry;
pub use service::{AttributeSyncService, BootstrapReport};
pub use target::{
    AccessorTarget, AccessorTargetBuilder, Configurable, DynamicAttributes,
    DynamicAttributesBuilder,
};
