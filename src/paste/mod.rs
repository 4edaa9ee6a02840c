//! Zero-knowledge paste publishing.
//!
//! Secrets are encrypted client-side and uploaded to a PrivateBin-compatible
//! service, which only ever sees ciphertext. The key needed to read a paste
//! travels in the fragment of the returned URL, and fragments are never sent
//! in HTTP requests.
//!
//! ## Flow
//!
//! - Generate a 32-byte master key, a 12-byte IV and an 8-byte salt
//! - Derive the AES-256 key with PBKDF2-HMAC-SHA256 (100 000 iterations)
//! - Seal `{"paste": message}` with AES-256-GCM, binding the encryption
//!   parameters and paste flags as associated data
//! - POST the version 2 envelope to the service
//! - Rebuild the share URL with `#<base58(master key)>` appended
//!
//! ## Usage
//!
//! ```ignore
//! let client = PasteClient::from_config(&config.paste)?;
//! let response = client
//!     .create_paste("s3cr3t", &config.paste.options(), Duration::from_secs(30))
//!     .await?;
//! println!("{}", response.url);
//! ```

pub mod client;
pub mod crypto;
pub mod protocol;

use std::time::Duration;

use thiserror::Error;

pub use client::PasteClient;
pub use crypto::{seal, AuthenticatedData, EncryptionSpec, MasterKey, PasteEnvelope};
pub use protocol::{PasteOptions, PasteRequest, PasteResponse};

/// Paste publishing errors
#[derive(Debug, Error)]
pub enum PasteError {
    #[error("cannot generate random bytes: {0}")]
    RandomSource(#[from] rand::Error),

    #[error("cannot encrypt paste: {0}")]
    Encryption(String),

    #[error("invalid paste JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("cannot execute http request: {0}")]
    Http(#[from] reqwest::Error),

    #[error("paste service responded with {0} status code")]
    HttpStatus(reqwest::StatusCode),

    #[error("paste service did not respond within {0:?}")]
    Timeout(Duration),

    #[error("paste service rejected the paste (status {status}): {message}")]
    Protocol { status: i64, message: String },

    #[error("invalid paste service url: {0}")]
    InvalidUrl(String),
}

impl PasteError {
    /// Whether retrying the whole paste creation can succeed.
    ///
    /// A retry always starts over with fresh key material.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Http(_) | Self::HttpStatus(_) | Self::Timeout(_) | Self::Protocol { .. }
        )
    }
}

/// Result type for paste operations
pub type PasteResult<T> = Result<T, PasteError>;
