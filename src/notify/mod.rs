//! Change notification transport.
//!
//! Provides the channel contract, an in-process channel, and the listener
//! task that feeds received changes into the sync service.

mod channel;
mod listener;
mod memory;

pub use channel::{NotificationChannel, Subscription, publish_change};
pub use listener::ChangeListener;
pub use memory::MemoryChannel;
