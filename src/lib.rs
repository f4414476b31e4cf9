//! # dcc-sync
//!
//! Dynamic configuration attributes kept in sync with a shared key-value
//! store, with live updates delivered over a publish/subscribe channel.
//!
//! ## Overview
//!
//! A component declares named attributes with defaults. At startup
//! [`AttributeSyncService::bootstrap`](core::AttributeSyncService::bootstrap)
//! resolves each attribute against the store (the store wins over the
//! default, and a missing key is seeded with the default). Afterwards every
//! change message published to the namespace topic updates the store and
//! rewrites the attribute on every bound component in the process.
//!
//! - Store keys are `"{namespace}_{attribute}"`
//! - The topic is `DYNAMIC_CONFIG_CENTER_REDIS_TOPIC_{namespace}`
//! - Change messages are JSON `{"attribute": "...", "value": "..."}`
//! - Attribute reads are lock-free using `arc-swap`
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use dcc_sync::prelude::*;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<()> {
//! let store = MemoryStore::new();
//! let channel = MemoryChannel::default();
//!
//! let service = Arc::new(
//!     AttributeSyncService::builder()
//!         .with_namespace("orders")
//!         .with_store(Arc::new(store.clone()))
//!         .build()?,
//! );
//! let _listener = service.listen(&channel).await?;
//!
//! let target = Arc::new(
//!     DynamicAttributes::builder("OrderService")
//!         .attribute("retryLimit", "3")
//!         .build(),
//! );
//! service.bootstrap(target.clone()).await?;
//! println!("retry limit: {}", target.get("retryLimit").unwrap());
//!
//! // Any process can publish a change.
//! publish_change(&channel, "orders", &ChangeMessage::new("retryLimit", "5")).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Feature Flags
//!
//! - `metrics`: OpenTelemetry counters and histograms for bootstrap and propagation

#![warn(missing_docs, rust_2024_compatibility)]
#![deny(unsafe_code)]

pub mod core;
pub mod error;
pub mod notify;
pub mod settings;
pub mod store;

#[cfg(feature = "metrics")]
pub mod metrics;

/// Convenient re-exports for common usage patterns.
pub mod prelude {
    pub use crate::core::{
        AccessorTarget, AttributeDescriptor, AttributeSyncService, AttributeSyncServiceBuilder,
        BindingRegistry, BootstrapReport, ChangeMessage, Configurable, DynamicAttributes,
        EffectiveValue, PropagationOutcome,
    };
    pub use crate::error::{DccError, Result, ValidationError};
    pub use crate::notify::{ChangeListener, MemoryChannel, NotificationChannel, publish_change};
    pub use crate::settings::{DccSettings, SettingsLoader};
    pub use crate::store::{MemoryStore, StoreClient};
}
