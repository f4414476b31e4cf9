//! Built-in metrics for bootstrap and propagation.
//!
//! Provides OpenTelemetry metrics tracking:
//! - Bootstrap attempts, fallbacks and failures
//! - Applied, ignored and failed changes
//! - Rejected target writes
//! - Propagation duration
//! - Bound keys and time since the last change
//!
//! # Examples
//!
//! ```rust,no_run
//! use dcc_sync::prelude::*;
//! use opentelemetry::global;
//! use std::sync::Arc;
//!
//! # fn example() -> Result<()> {
//! let service = AttributeSyncService::builder()
//!     .with_namespace("orders")
//!     .with_store(Arc::new(MemoryStore::new()))
//!     .with_metrics(global::meter("my-app"))
//!     .build()?;
//! # Ok(())
//! # }
//! ```

mod sync_metrics;

pub use sync_metrics::SyncMetrics;
