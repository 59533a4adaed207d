//! Application layer errors

use thiserror::Error;

/// General bot errors
#[derive(Error, Debug)]
pub enum BotError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Media error: {0}")]
    Media(#[from] MediaError),

    #[error("Reconnect limit reached after {0} attempts")]
    ReconnectLimit(u32),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Session store errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Media resolution errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MediaError {
    /// The resolver answered but did not produce a media URL
    #[error("Media resolution failed: {0}")]
    ResolutionFailed(String),

    /// The resolver could not be reached or answered with an HTTP error
    #[error("Media fetch transport error: {0}")]
    Transport(String),
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Parse error: {0}")]
    Parse(String),
}
