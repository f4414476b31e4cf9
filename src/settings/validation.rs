//! Settings validation support.

use crate::error::ValidationError;

/// Trait for settings validation.
///
/// Implemented by [`super::DccSettings`]; loading through
/// [`super::SettingsLoader`] rejects settings that fail it.
///
/// # Examples
///
/// ```rust
/// use dcc_sync::settings::{DccSettings, Validate};
///
/// let mut settings = DccSettings::default();
/// assert!(settings.validate().is_ok());
///
/// settings.system = "  ".to_string();
/// assert!(settings.validate().is_err());
/// ```
pub trait Validate {
    /// Validate the settings.
    ///
    /// # Errors
    ///
    /// Should return a `ValidationError` describing what validation failed.
    fn validate(&self) -> Result<(), ValidationError>;
}
