//! Change notification payload.

use crate::error::Result;
use serde::{Deserialize, Serialize};

/// A request to change one attribute, as carried by the notification channel.
///
/// On the wire this is the JSON object `{"attribute": "...", "value": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeMessage {
    /// The attribute name, without namespace
    pub attribute: String,
    /// The new value
    pub value: String,
}

impl ChangeMessage {
    /// Create a change message.
    pub fn new(attribute: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            attribute: attribute.into(),
            value: value.into(),
        }
    }

    /// Encode as the JSON wire payload.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode a JSON wire payload.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::DccError::Decode`] if the payload is not a
    /// change message object.
    pub fn from_json(payload: &str) -> Result<Self> {
        Ok(serde_json::from_str(payload)?)
    }
}
