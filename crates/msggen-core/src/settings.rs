use crate::error::ConfigError;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

/// Untyped option name -> value mapping handed to an input at construction
pub type ConfigMap = Map<String, Value>;

/// Runtime type an option value must have
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionKind {
    /// Non-negative integer
    Integer,
    String,
}

impl OptionKind {
    /// Check whether `value` has this kind
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            OptionKind::Integer => value.as_u64().is_some(),
            OptionKind::String => value.is_string(),
        }
    }
}

impl std::fmt::Display for OptionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OptionKind::Integer => write!(f, "integer"),
            OptionKind::String => write!(f, "string"),
        }
    }
}

/// A named, typed configuration option with a default
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfigOption {
    pub name: &'static str,
    pub kind: OptionKind,
    pub default: Value,
}

impl ConfigOption {
    pub fn integer(name: &'static str, default: u64) -> Self {
        Self {
            name,
            kind: OptionKind::Integer,
            default: Value::from(default),
        }
    }

    pub fn string(name: &'static str, default: &str) -> Self {
        Self {
            name,
            kind: OptionKind::String,
            default: Value::from(default),
        }
    }

    /// Resolve this option from `config`, falling back to the default
    ///
    /// Fails if the supplied value is not of the declared kind.
    pub fn resolve<'a>(&'a self, config: &'a ConfigMap) -> Result<&'a Value, ConfigError> {
        match config.get(self.name) {
            None => Ok(&self.default),
            Some(value) if self.kind.accepts(value) => Ok(value),
            Some(value) => Err(ConfigError::InvalidValue {
                option: self.name.to_string(),
                value: display_value(value),
            }),
        }
    }
}

impl std::fmt::Display for ConfigOption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}, default {})", self.name, self.kind, self.default)
    }
}

/// Strings are shown bare, everything else as JSON
fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Name of the option holding the number of records to produce
pub const COUNT_OPTION: &str = "count";

/// Name of the option holding the message prefix
pub const PREFIX_OPTION: &str = "prefix";

pub const DEFAULT_COUNT: u64 = 3;
pub const DEFAULT_PREFIX: &str = "message";

/// The declared options, in the order they are documented
pub fn config_schema() -> Vec<ConfigOption> {
    vec![
        ConfigOption::integer(COUNT_OPTION, DEFAULT_COUNT),
        ConfigOption::string(PREFIX_OPTION, DEFAULT_PREFIX),
    ]
}

/// Validated generator settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub count: u64,
    pub prefix: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            count: DEFAULT_COUNT,
            prefix: DEFAULT_PREFIX.to_string(),
        }
    }
}

impl Settings {
    /// Validate an untyped config map against the declared options
    pub fn from_map(config: &ConfigMap) -> Result<Self, ConfigError> {
        let declared = config_schema();

        for key in config.keys() {
            if !declared.iter().any(|option| option.name == key) {
                debug!(option = %key, "Ignoring undeclared config option");
            }
        }

        let mut settings = Settings::default();
        for option in &declared {
            let value = option.resolve(config)?;
            match option.name {
                COUNT_OPTION => {
                    // resolve() has already checked the kind
                    if let Some(count) = value.as_u64() {
                        settings.count = count;
                    }
                }
                PREFIX_OPTION => {
                    if let Some(prefix) = value.as_str() {
                        settings.prefix = prefix.to_string();
                    }
                }
                _ => {}
            }
        }

        Ok(settings)
    }
}
