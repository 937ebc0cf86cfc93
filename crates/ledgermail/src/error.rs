//! Error types for the channel protocol.

use thiserror::Error;

use ledgermail_core::{ChannelId, FormatError, NameHash};
use ledgermail_crypto::CryptoError;
use ledgermail_ledger::{BlobError, LedgerError};

/// Errors that can occur during protocol operations.
///
/// Ledger rejections (conflicts, permission denials) propagate verbatim
/// inside [`ProtocolError::Ledger`]; crypto failures keep their
/// authentication/verification distinction inside [`ProtocolError::Crypto`].
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Bad caller input, detected before any I/O.
    #[error("validation error: {0}")]
    Validation(String),

    /// Malformed multihash or cipher framing.
    #[error(transparent)]
    Format(#[from] FormatError),

    /// Cipher, identity, or wrapping failure.
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    /// Ledger rejection or transport failure.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Blob store failure.
    #[error(transparent)]
    Blob(#[from] BlobError),

    /// No account is registered under this name hash.
    #[error("no account registered for {0:?}")]
    AccountNotFound(NameHash),

    /// The channel is not held by this session.
    #[error("channel not held: {0:?}")]
    ChannelNotFound(ChannelId),

    /// An invariant the ledger guarantees was observed broken, or a
    /// document in a held channel failed to decrypt.
    #[error("corruption: {0}")]
    Corruption(String),
}

/// Result type for protocol operations.
pub type Result<T> = std::result::Result<T, ProtocolError>;
