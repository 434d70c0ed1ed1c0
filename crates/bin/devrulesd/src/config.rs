//! Configuration loading: TOML file with environment variable overrides.
//!
//! Looks for `devrules.toml` in the working directory, or the file named by
//! `DEVRULES_CONFIG`. Every field has a sensible default so the file is
//! optional. Environment variables take precedence over file values.

use std::collections::HashSet;

use serde::Deserialize;

use devrules_adapter_virtual::DeviceDefinition;
use devrules_domain::rule::{RuleKind, RuleParams};

const DEFAULT_PATH: &str = "devrules.toml";

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Trigger event bus settings.
    pub bus: BusConfig,
    /// Virtual devices to register at startup.
    pub devices: Vec<DeviceDefinition>,
    /// Rules to load at startup.
    pub rules: Vec<RuleConfig>,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

/// Trigger event bus configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct BusConfig {
    /// Number of fired triggers buffered per subscriber.
    pub capacity: usize,
}

/// One rule: a trigger, conditions that must all hold, and actions.
#[derive(Debug, Deserialize)]
pub struct RuleConfig {
    pub name: String,
    /// Used as the origin label of the commands the rule sends.
    #[serde(default)]
    pub description: String,
    pub trigger: ElementConfig,
    #[serde(default)]
    pub conditions: Vec<ElementConfig>,
    #[serde(default)]
    pub actions: Vec<ElementConfig>,
}

/// A rule element as rule storage describes it.
#[derive(Debug, Deserialize)]
pub struct ElementConfig {
    pub kind: RuleKind,
    #[serde(default)]
    pub params: RuleParams,
}

impl Config {
    /// Load configuration from `DEVRULES_CONFIG` or `devrules.toml` (if
    /// present) then apply environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting configuration is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("DEVRULES_CONFIG").unwrap_or_else(|_| DEFAULT_PATH.to_string());
        let mut config = Self::from_file(&path)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a configuration document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is malformed or invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("DEVRULES_LOG") {
            self.logging.filter = val;
        }
        if let Ok(val) = std::env::var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.bus.capacity == 0 {
            return Err(ConfigError::Validation(
                "bus capacity must be non-zero".to_string(),
            ));
        }
        let mut seen = HashSet::new();
        if let Some(dup) = self.devices.iter().find(|d| !seen.insert(d.id)) {
            return Err(ConfigError::Validation(format!(
                "device {} is declared twice",
                dup.id
            )));
        }
        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "devrulesd=info,devrules_app=info,devrules_adapter_virtual=info".to_string(),
        }
    }
}

impl Default for BusConfig {
    fn default() -> Self {
        Self { capacity: 256 }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
