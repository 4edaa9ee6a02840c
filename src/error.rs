use thiserror::Error;

use crate::paste::PasteError;
use crate::publish::PublishError;
use crate::secrets::SecretError;

/// Application-wide error types
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Paste error: {0}")]
    Paste(#[from] PasteError),

    #[error("Publish error: {0}")]
    Publish(#[from] PublishError),

    #[error("Secret error: {0}")]
    Secret(#[from] SecretError),

    #[error("Base58 error: {0}")]
    Codec(#[from] pastecrypt_base58::Base58Error),

    #[error("Invalid hex input: {0}")]
    Hex(#[from] hex::FromHexError),

    #[error("Invalid manifest: {0}")]
    Manifest(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl AppError {
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Process exit code for the command line.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => 78,
            Self::Codec(_) | Self::Hex(_) | Self::Manifest(_) | Self::InvalidInput(_) => 65,
            Self::Secret(_) | Self::Io(_) => 74,
            Self::Paste(e) if e.is_retryable() => 75,
            Self::Publish(PublishError::Paste { source, .. }) if source.is_retryable() => 75,
            Self::Paste(_) | Self::Publish(_) => 70,
        }
    }
}

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;
