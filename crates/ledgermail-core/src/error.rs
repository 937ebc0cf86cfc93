//! Error types for ledgermail core.

use thiserror::Error;

/// Malformed multihash or cipher framing.
///
/// These errors are raised before any key material is consulted: the input
/// shape itself is wrong, independent of who tries to decrypt it.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("base58 decode failed: {0}")]
    Base58(String),

    #[error("hex decode failed: {0}")]
    Hex(String),

    #[error("digest must carry a 0x prefix")]
    MissingHexPrefix,

    #[error("multihash too short: {0} bytes")]
    MultihashTooShort(usize),

    #[error("multihash length mismatch: header declares {declared}, found {actual}")]
    DigestLength { declared: usize, actual: usize },

    #[error("cipher frame too short: {0} bytes")]
    FrameTooShort(usize),
}
