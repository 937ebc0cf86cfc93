//! # ledgermail core
//!
//! Pure primitives for the ledgermail protocol: typed identifiers, SHA-256
//! hashing, and the base58 multihash codec used for content pointers.
//!
//! This crate contains no I/O, no storage, no networking. It is pure
//! computation over cryptographic data structures.
//!
//! ## Key Types
//!
//! - [`NameHash`] - SHA-256 of a registered account name
//! - [`ChannelId`] - Identifier derived from a channel's symmetric key
//! - [`Address`] - 20-byte submitting address on the ledger
//! - [`ContentPointer`] - base58 multihash text addressing a blob
//! - [`Multihash`] - decoded form of a content pointer

pub mod error;
pub mod hash;
pub mod multihash;
pub mod types;

pub use error::FormatError;
pub use hash::Sha256Hash;
pub use multihash::{
    ContentPointer, Multihash, DEFAULT_DIGEST_SIZE, DEFAULT_HASH_FUNCTION,
};
pub use types::{Address, ChannelId, NameHash, Topic};
