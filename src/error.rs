//! Error types for dcc-sync.

use std::fmt;
use std::time::Duration;

/// Result type alias for dcc-sync operations.
pub type Result<T> = std::result::Result<T, DccError>;

/// Errors that can occur while bootstrapping or propagating attributes.
#[derive(Debug, thiserror::Error)]
pub enum DccError {
    /// An attribute was declared without a usable name or default value.
    ///
    /// This is a programming error: the owning component should fail fast.
    #[error("Attribute '{attribute}' is not declared correctly: {reason}")]
    ConfigDeclaration {
        /// The attribute name (or the raw declaration when no name could be parsed)
        attribute: String,
        /// Why the declaration was rejected
        reason: String,
    },

    /// The shared store could not be reached.
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// A store call did not complete within the configured timeout.
    #[error("Store operation '{operation}' on key '{key}' timed out after {timeout:?}")]
    StoreTimeout {
        /// The store operation that timed out (`exists`, `get`, `set`, ...)
        operation: &'static str,
        /// The rendered store key
        key: String,
        /// The timeout that expired
        timeout: Duration,
    },

    /// A target does not expose the slot or rejected the value.
    #[error("Failed to bind attribute '{attribute}': {reason}")]
    TargetBinding {
        /// The attribute name
        attribute: String,
        /// Why the write was rejected
        reason: String,
    },

    /// The notification channel failed to publish or subscribe.
    #[error("Notification channel error: {0}")]
    Channel(String),

    /// A channel payload could not be decoded into a change message.
    #[error("Failed to decode change message: {0}")]
    Decode(String),

    /// Settings could not be loaded or deserialized.
    #[error("Failed to load settings: {0}")]
    Settings(String),

    /// Settings validation failed.
    #[error("Settings validation failed: {0}")]
    ValidationError(String),
}

impl DccError {
    /// Create a declaration error.
    pub fn declaration(attribute: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ConfigDeclaration {
            attribute: attribute.into(),
            reason: reason.into(),
        }
    }

    /// Create a target binding error.
    pub fn binding(attribute: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::TargetBinding {
            attribute: attribute.into(),
            reason: reason.into(),
        }
    }

    /// Whether this is a transient store failure (unavailable or timed out).
    pub fn is_store_failure(&self) -> bool {
        matches!(self, Self::StoreUnavailable(_) | Self::StoreTimeout { .. })
    }

    /// Whether this is a declaration error.
    pub fn is_declaration_error(&self) -> bool {
        matches!(self, Self::ConfigDeclaration { .. })
    }
}

impl From<serde_json::Error> for DccError {
    fn from(err: serde_json::Error) -> Self {
        DccError::Decode(err.to_string())
    }
}

/// Validation error for settings validation.
#[derive(Debug)]
pub enum ValidationError {
    /// Custom validation error with a message.
    Custom(String),

    /// A specific field has an invalid value.
    InvalidField {
        /// The field name
        field: String,
        /// The reason why it's invalid
        reason: String,
    },

    /// Multiple validation errors occurred.
    Multiple(Vec<ValidationError>),
}

impl ValidationError {
    /// Create a custom validation error.
    pub fn custom(msg: impl Into<String>) -> Self {
        Self::Custom(msg.into())
    }

    /// Create an invalid field error.
    pub fn invalid_field(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Custom(msg) => write!(f, "{}", msg),
            Self::InvalidField { field, reason } => {
                write!(f, "Field '{}' is invalid: {}", field, reason)
            }
            Self::Multiple(errors) => {
                writeln!(f, "Multiple validation errors:")?;
                for (i, err) in errors.iter().enumerate() {
                    writeln!(f, "  {}. {}", i + 1, err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ValidationError {}

impl From<ValidationError> for DccError {
    fn from(err: ValidationError) -> Self {
        DccError::ValidationError(err.to_string())
    }
}
