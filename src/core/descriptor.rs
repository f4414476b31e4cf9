//! Attribute declarations.

use crate::error::{DccError, Result};

/// Separator between name and default in a declaration string.
pub const DECLARATION_SEPARATOR: char = ':';

/// A declared configurable attribute: its name and the fallback default.
///
/// Descriptors are immutable. A descriptor may be constructed without a
/// default, but bootstrapping it fails with [`DccError::ConfigDeclaration`].
///
/// # Examples
///
/// ```rust
/// use dcc_sync::core::AttributeDescriptor;
///
/// let descriptor = AttributeDescriptor::parse("retryLimit:3").unwrap();
/// assert_eq!(descriptor.name(), "retryLimit");
/// assert_eq!(descriptor.default_value(), Some("3"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeDescriptor {
    name: String,
    default_value: Option<String>,
}

impl AttributeDescriptor {
    /// Declare an attribute with a default value.
    pub fn new(name: impl Into<String>, default_value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default_value: Some(default_value.into()),
        }
    }

    /// Declare an attribute with no default. It cannot be bootstrapped.
    pub fn without_default(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default_value: None,
        }
    }

    /// Parse a `"name:default"` declaration.
    ///
    /// The name is trimmed. Everything after the first separator is the
    /// default, kept verbatim. `"name"` alone yields a descriptor without a
    /// default.
    ///
    /// # Errors
    ///
    /// Returns [`DccError::ConfigDeclaration`] when the declaration is blank or
    /// the name part is empty.
    pub fn parse(declaration: &str) -> Result<Self> {
        if declaration.trim().is_empty() {
            return Err(DccError::declaration(
                declaration,
                "declaration is blank, expected 'name' or 'name:default'",
            ));
        }

        let (name, default_value) = match declaration.split_once(DECLARATION_SEPARATOR) {
            Some((name, default)) => (name.trim(), Some(default.to_string())),
            None => (declaration.trim(), None),
        };

        if name.is_empty() {
            return Err(DccError::declaration(declaration, "attribute name is empty"));
        }

        Ok(Self {
            name: name.to_string(),
            default_value,
        })
    }

    /// The attribute name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The declared default, if any.
    pub fn default_value(&self) -> Option<&str> {
        self.default_value.as_deref()
    }

    /// The default value, rejecting missing or blank defaults.
    ///
    /// # Errors
    ///
    /// Returns [`DccError::ConfigDeclaration`] if the name is empty or the
    /// default is absent or blank.
    pub fn require_default(&self) -> Result<&str> {
        if self.name.trim().is_empty() {
            return Err(DccError::declaration(&self.name, "attribute name is empty"));
        }
        match self.default_value.as_deref() {
            Some(value) if !value.trim().is_empty() => Ok(value),
            _ => Err(DccError::declaration(
                &self.name,
                "no default value declared, use 'name:default'",
            )),
        }
    }
}
