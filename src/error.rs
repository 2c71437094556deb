use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(String),

    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Invalid configuration value: {0}")]
    ValidationError(String),

    #[error("Invalid keyword pattern: {0}")]
    PatternError(#[from] regex::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Errors that can occur while reading the system log
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Failed to open log provider: {0}")]
    ProviderOpen(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Errors that can occur when delivering a notification
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Failed to send notification: {0}")]
    SendFailed(String),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),
}
