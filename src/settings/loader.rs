//! Settings loader that merges files and environment variables.

use super::{DccSettings, Validate};
use crate::error::{DccError, Result};
use config::{Config, Environment, File, FileFormat};
use std::path::{Path, PathBuf};

/// Loads [`DccSettings`] from files and environment variables.
///
/// Files are merged in the order they are added (later files override
/// earlier ones); environment variables override all files. The result is
/// validated before it is returned.
///
/// # Examples
///
/// ```rust,no_run
/// use dcc_sync::settings::SettingsLoader;
///
/// # fn example() -> dcc_sync::error::Result<()> {
/// // DCC_SYSTEM=orders -> system = "orders"
/// let settings = SettingsLoader::new()
///     .with_file("config/dcc.yaml")
///     .with_env_overrides("DCC", "__")
///     .load()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct SettingsLoader {
    file_paths: Vec<PathBuf>,
    env_prefix: Option<String>,
    env_separator: Option<String>,
}

impl SettingsLoader {
    /// Create a loader with no sources; loading it yields the defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a settings file.
    ///
    /// Supported formats: YAML (.yaml, .yml), TOML (.toml), JSON (.json)
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file_paths.push(path.into());
        self
    }

    /// Add environment variable overrides.
    ///
    /// # Arguments
    ///
    /// * `prefix` - Prefix for environment variables (e.g., "DCC")
    /// * `separator` - Separator for nested keys (e.g., "__")
    pub fn with_env_overrides(mut self, prefix: &str, separator: &str) -> Self {
        self.env_prefix = Some(prefix.to_string());
        self.env_separator = Some(separator.to_string());
        self
    }

    /// Load, merge and validate the settings.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - A file has an unsupported extension or cannot be read or parsed
    /// - A value cannot be deserialized into its field
    /// - Validation fails
    pub fn load(&self) -> Result<DccSettings> {
        let mut builder = Config::builder();

        for path in &self.file_paths {
            let format = detect_format(path)?;
            builder = builder.add_source(File::from(path.as_path()).format(format).required(true));
        }

        if let (Some(prefix), Some(separator)) = (&self.env_prefix, &self.env_separator) {
            builder = builder.add_source(
                Environment::with_prefix(prefix)
                    .prefix_separator("_")
                    .separator(separator)
                    .try_parsing(true),
            );
        }

        let settings: DccSettings = builder
            .build()
            .map_err(|e| DccError::Settings(format!("Failed to build settings: {}", e)))?
            .try_deserialize()
            .map_err(|e| DccError::Settings(format!("Failed to deserialize settings: {}", e)))?;

        settings.validate()?;
        Ok(settings)
    }
}

fn detect_format(path: &Path) -> Result<FileFormat> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .ok_or_else(|| DccError::Settings(format!("File has no extension: {}", path.display())))?;

    match extension.to_ascii_lowercase().as_str() {
        "yaml" | "yml" => Ok(FileFormat::Yaml),
        "toml" => Ok(FileFormat::Toml),
        "json" => Ok(FileFormat::Json),
        other => Err(DccError::Settings(format!(
            "Unsupported file extension '{}': {}",
            other,
            path.display()
        ))),
    }
}
