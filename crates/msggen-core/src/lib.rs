//! msggen Core
//!
//! Core types, traits, and configuration for the msggen generator input.

pub mod config;
pub mod error;
pub mod record;
pub mod settings;
pub mod traits;

// Re-export commonly used types
pub use config::Config;
pub use error::{ConfigError, IngestionError, MsgGenError, OutputError, Result};
pub use record::{center, Record};
pub use settings::{config_schema, ConfigMap, ConfigOption, OptionKind, Settings};
pub use traits::{Input, Interrupt, Sink};
