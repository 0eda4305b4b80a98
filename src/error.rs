//! Error types for the steganography engine.

use thiserror::Error;

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while embedding, extracting or analysing images.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Empty or malformed passphrase.
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// The framed payload does not fit in the carrier.
    #[error("Payload too large: need {needed} bytes, image holds {available} bytes")]
    PayloadTooLarge { needed: usize, available: usize },

    /// Header sanity check failed after majority voting.
    #[error("No hidden data found in image")]
    NoHiddenData,

    /// Cipher tag mismatch (wrong passphrase or corrupted carrier).
    #[error("Authentication failed: wrong passphrase or corrupted data")]
    AuthenticationFailed,

    /// Tag passed but the recovered record does not match its digest.
    #[error("Integrity check failed: recovered payload does not match its digest")]
    IntegrityMismatch,

    /// Channel layout or size the engine cannot work with.
    #[error("Unsupported image: {0}")]
    UnsupportedImage(String),

    /// Secret that cannot be framed.
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    /// Configuration rejected by validation.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Key derivation error.
    #[error("Key derivation error: {0}")]
    KeyDerivation(String),

    /// Encryption error.
    #[error("Encryption error: {0}")]
    Encryption(String),

    /// Compression error.
    #[error("Compression error: {0}")]
    Compression(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Image decoding or encoding error.
    #[error("Image error: {0}")]
    Image(String),
}

impl Error {
    /// Stable snake_case identifier of the error kind, for shells that
    /// report errors as data.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Io(_) => "io",
            Error::InvalidKey(_) => "invalid_key",
            Error::PayloadTooLarge { .. } => "payload_too_large",
            Error::NoHiddenData => "no_hidden_data",
            Error::AuthenticationFailed => "authentication_failed",
            Error::IntegrityMismatch => "integrity_mismatch",
            Error::UnsupportedImage(_) => "unsupported_image",
            Error::InvalidPayload(_) => "invalid_payload",
            Error::InvalidConfig(_) => "invalid_config",
            Error::KeyDerivation(_) => "key_derivation",
            Error::Encryption(_) => "encryption",
            Error::Compression(_) => "compression",
            Error::Serialization(_) => "serialization",
            Error::Image(_) => "image",
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<bincode::Error> for Error {
    fn from(e: bincode::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<image::ImageError> for Error {
    fn from(e: image::ImageError) -> Self {
        Error::Image(e.to_string())
    }
}
