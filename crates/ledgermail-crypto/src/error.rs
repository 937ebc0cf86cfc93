//! Error types for the crypto layers.

use thiserror::Error;

use ledgermail_core::FormatError;

/// Errors raised by the cipher, identity, and wrapping layers.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Bad caller input, detected before any key material is touched.
    #[error("validation error: {0}")]
    Validation(String),

    /// Malformed framing or encoding.
    #[error(transparent)]
    Format(#[from] FormatError),

    /// Wrong key, wrong passphrase, or authentication-tag failure.
    #[error("authentication failed")]
    Authentication,

    /// A signature was expected and did not match (or was absent).
    #[error("signature verification failed")]
    Verification,

    /// CBOR serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// AEAD engine failure outside the tag-check path.
    #[error("cipher engine failure: {0}")]
    Engine(String),
}

/// Result type for crypto operations.
pub type Result<T> = std::result::Result<T, CryptoError>;
