//! Session configuration
//!
//! Loaded from TOML; every field has a default so an empty file is valid.
//!
//! ```toml
//! request_timeout_secs = 10
//! log_filter = "techcard_session=debug"
//!
//! [labels]
//! block = "Блок"
//! param = "Параметр"
//! ```

use crate::catalog::ElementLocator;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use techcard_sync::{DecodeOptions, StandardValuesCache};

/// Labels for synthesized names
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Labels {
    /// Prefix for unnamed blocks
    pub block: String,
    /// Prefix for unnamed parameters
    pub param: String,
}

impl Default for Labels {
    fn default() -> Self {
        let options = DecodeOptions::default();
        Self {
            block: options.block_label,
            param: options.param_label,
        }
    }
}

/// Configuration for one form session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
    /// Optional bound on the standard-values cache
    pub standard_values_capacity: Option<u64>,
    /// Labels for synthesized names
    pub labels: Labels,
    /// Where the element list lives in an elements response
    pub element_locator: ElementLocator,
    /// Default tracing filter for the CLI
    pub log_filter: String,
}

impl SessionConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate TOML text
    ///
    /// # Errors
    /// - `ConfigError::Parse` for malformed TOML
    /// - `ConfigError::Invalid` for unusable values
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    ///
    /// # Errors
    /// - `ConfigError::Io` if the file cannot be read
    /// - Any error of [`SessionConfig::from_toml_str`]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(path = %path.display(), "loaded session config");
        Ok(config)
    }

    /// Check field values
    ///
    /// # Errors
    /// `ConfigError::Invalid` naming the first bad field
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::invalid(
                "request_timeout_secs",
                "must be greater than zero",
            ));
        }
        if self.standard_values_capacity == Some(0) {
            return Err(ConfigError::invalid(
                "standard_values_capacity",
                "must be greater than zero when set",
            ));
        }
        if self.element_locator.block_id.as_str().is_empty() {
            return Err(ConfigError::invalid("element_locator.block_id", "must not be empty"));
        }
        Ok(())
    }

    /// With request timeout
    #[inline]
    #[must_use]
    pub fn with_request_timeout_secs(mut self, secs: u64) -> Self {
        self.request_timeout_secs = secs;
        self
    }

    /// With standard-values cache bound
    #[inline]
    #[must_use]
    pub fn with_standard_values_capacity(mut self, capacity: u64) -> Self {
        self.standard_values_capacity = Some(capacity);
        self
    }

    /// With synthesized-name labels
    #[inline]
    #[must_use]
    pub fn with_labels(mut self, block: impl Into<String>, param: impl Into<String>) -> Self {
        self.labels = Labels {
            block: block.into(),
            param: param.into(),
        };
        self
    }

    /// With element locator
    #[inline]
    #[must_use]
    pub fn with_element_locator(mut self, locator: ElementLocator) -> Self {
        self.element_locator = locator;
        self
    }

    /// With log filter
    #[inline]
    #[must_use]
    pub fn with_log_filter(mut self, filter: impl Into<String>) -> Self {
        self.log_filter = filter.into();
        self
    }

    /// Request timeout as a duration
    #[inline]
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Decode options built from the labels
    #[must_use]
    pub fn decode_options(&self) -> DecodeOptions {
        DecodeOptions::default()
            .with_block_label(self.labels.block.clone())
            .with_param_label(self.labels.param.clone())
    }

    /// Fresh standard-values cache honoring the configured bound
    #[must_use]
    pub fn standard_values_cache(&self) -> StandardValuesCache {
        self.standard_values_capacity
            .map_or_else(StandardValuesCache::new, StandardValuesCache::with_capacity)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 30,
            standard_values_capacity: None,
            labels: Labels::default(),
            element_locator: ElementLocator::default(),
            log_filter: "info".to_string(),
        }
    }
}
