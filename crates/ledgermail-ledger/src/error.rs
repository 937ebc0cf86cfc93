//! Error types for the ledger and blob-store seams.

use thiserror::Error;

use ledgermail_core::{ContentPointer, FormatError};

/// A ledger uniqueness violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictKind {
    /// The name hash is already registered.
    ExistsName,
    /// The submitting address already registered a different name.
    ExistsAddress,
    /// The channel id is already registered.
    ExistsChannel,
}

impl std::fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ExistsName => write!(f, "name hash already registered"),
            Self::ExistsAddress => write!(f, "address already holds a name"),
            Self::ExistsChannel => write!(f, "channel id already registered"),
        }
    }
}

/// An ownership or registration violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenialKind {
    /// The submitting address holds no registered account.
    NotExistsAccount,
    /// The submitting address does not own the channel.
    NotChannelOwner,
}

impl std::fmt::Display for DenialKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotExistsAccount => write!(f, "submitting address is not registered"),
            Self::NotChannelOwner => write!(f, "submitting address does not own the channel"),
        }
    }
}

/// Errors from the ledger seam. Rejections propagate verbatim to callers.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Uniqueness constraint violated.
    #[error("conflict: {0}")]
    Conflict(ConflictKind),

    /// Ownership or registration constraint violated.
    #[error("permission denied: {0}")]
    Permission(DenialKind),

    /// The transaction handle is unknown to this ledger.
    #[error("unknown transaction handle")]
    UnknownHandle,

    /// Payload could not be decoded.
    #[error("codec error: {0}")]
    Codec(String),

    /// Transport failure reaching the ledger endpoint.
    #[error("transport error: {0}")]
    Transport(String),
}

/// Errors from the blob-store seam.
#[derive(Debug, Error)]
pub enum BlobError {
    /// No blob is stored under this pointer.
    #[error("blob not found: {0}")]
    NotFound(ContentPointer),

    /// The pointer text is not a valid multihash.
    #[error(transparent)]
    Format(#[from] FormatError),

    /// Transport failure reaching the gateway.
    #[error("transport error: {0}")]
    Transport(String),
}

/// Result type for ledger operations.
pub type Result<T, E = LedgerError> = std::result::Result<T, E>;
