use crate::error::ConfigError;
use crate::settings::ConfigMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration for the msggen host
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Raw input options, validated later by the input itself
    pub input: ConfigMap,

    /// Output targets configuration
    pub output: OutputConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Read(format!("{}: {}", path.display(), e)))?;
        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }
}

/// General settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Instance name for identification
    pub instance_name: String,

    /// Internal log level: trace, debug, info, warn, error
    pub log_level: String,

    /// Capacity of the channel between the input and the output
    pub buffer_size: usize,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            instance_name: "msggen".to_string(),
            log_level: "warn".to_string(),
            buffer_size: 1024,
        }
    }
}

/// Output targets configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Stdout output
    pub stdout: StdoutConfig,
}

/// Stdout output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StdoutConfig {
    pub enabled: bool,
    /// Format: json, raw
    pub format: String,
}

impl Default for StdoutConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            format: "json".to_string(),
        }
    }
}
