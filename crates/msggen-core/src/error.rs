use thiserror::Error;

/// Core error types for msggen
#[derive(Debug, Error)]
pub enum MsgGenError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Ingestion error: {0}")]
    Ingestion(#[from] IngestionError),

    #[error("Output error: {0}")]
    Output(#[from] OutputError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while loading or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A supplied value does not have the type its option declares
    #[error("Invalid value '{value}' for config option {option}")]
    InvalidValue { option: String, value: String },

    #[error("Failed to read config file: {0}")]
    Read(String),

    #[error("Failed to parse config: {0}")]
    Parse(String),
}

impl ConfigError {
    /// Name of the offending option, if this is a validation failure
    pub fn option(&self) -> Option<&str> {
        match self {
            ConfigError::InvalidValue { option, .. } => Some(option.as_str()),
            _ => None,
        }
    }
}

/// Errors raised by an input or the sink it pushes into
#[derive(Debug, Error)]
pub enum IngestionError {
    #[error("Sink push failed: {0}")]
    Sink(String),

    #[error("Channel closed")]
    ChannelClosed,

    #[error("Interrupted while awaiting input stop")]
    Interrupted,

    #[error("Input has already been started")]
    AlreadyStarted,
}

/// Errors specific to record writers
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Stdout write error: {0}")]
    Stdout(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type alias for msggen operations
pub type Result<T> = std::result::Result<T, MsgGenError>;
