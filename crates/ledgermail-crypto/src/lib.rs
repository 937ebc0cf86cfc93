//! # ledgermail crypto
//!
//! The protocol's three cryptographic layers:
//!
//! - [`cipher`] - symmetric AES-256-GCM with self-describing framing
//! - [`identity`] - Ed25519 + X25519 identity keys, passphrase-protected at rest
//! - [`wrap`] - asymmetric multi-recipient wrapping of small secrets
//!
//! Channel payloads use the symmetric cipher; channel keys travel to
//! recipients inside a [`wrap::WrappedKey`] envelope.

pub mod cipher;
pub mod error;
pub mod identity;
pub mod wrap;

pub use cipher::{SymmetricKey, NONCE_LEN, RESERVED_LEN, TAG_LEN};
pub use error::{CryptoError, Result};
pub use identity::{
    derive_public_key, generate_identity_keys, AgreementPublicKey, IdentityPublicKey,
    IdentitySecret, ProtectedKey, SigningPublicKey,
};
pub use wrap::WrappedKey;
