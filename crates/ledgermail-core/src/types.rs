//! Strong type definitions for the ledgermail protocol.
//!
//! All identifiers are newtypes to prevent misuse at compile time.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::hash::Sha256Hash;

/// A 32-byte hash of a registered account name.
///
/// Name hashes are the ledger's account topic: registration events carry
/// them and recipient lookups filter on them. The hash is SHA-256 of the
/// UTF-8 name.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NameHash(pub [u8; 32]);

impl NameHash {
    /// Hash an account name.
    pub fn of(name: &str) -> Self {
        Self(Sha256Hash::hash(name.as_bytes()).0)
    }

    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for NameHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NameHash({})", &self.to_hex()[..16])
    }
}

impl AsRef<[u8]> for NameHash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 32]> for NameHash {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

/// A 32-byte channel identifier.
///
/// Derived deterministically from the channel's symmetric key, so the party
/// that generated the key can always recompute the id. Unique at
/// registration time (ledger-enforced).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChannelId(pub [u8; 32]);

impl ChannelId {
    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChannelId({})", &self.to_hex()[..16])
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.to_hex()[..16])
    }
}

impl AsRef<[u8]> for ChannelId {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 32]> for ChannelId {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

/// A 20-byte ledger address: the identity that submits transactions.
///
/// Derived as the first 20 bytes of SHA-256 of the identity's Ed25519
/// public key.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Address(pub [u8; 20]);

impl Address {
    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Derive an address from an Ed25519 public key.
    pub fn derive(signing_public: &[u8; 32]) -> Self {
        let digest = Sha256Hash::hash(signing_public);
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&digest.0[..20]);
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from hex string.
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let bytes = hex::decode(s.trim_start_matches("0x"))?;
        if bytes.len() != 20 {
            return Err(hex::FromHexError::InvalidStringLength);
        }
        let mut arr = [0u8; 20];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address(0x{})", self.to_hex())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", self.to_hex())
    }
}

/// A 32-byte event topic.
///
/// Topics index ledger events for filtered queries: account events carry the
/// name hash, channel and document events carry the channel id.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Topic(pub [u8; 32]);

impl Topic {
    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Debug for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Topic({})", &hex::encode(self.0)[..16])
    }
}

impl From<NameHash> for Topic {
    fn from(h: NameHash) -> Self {
        Self(h.0)
    }
}

impl From<ChannelId> for Topic {
    fn from(id: ChannelId) -> Self {
        Self(id.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_hash_deterministic() {
        assert_eq!(NameHash::of("alice"), NameHash::of("alice"));
        assert_ne!(NameHash::of("alice"), NameHash::of("bob"));
    }

    #[test]
    fn test_address_derivation_stable() {
        let pk = [0x42u8; 32];
        let a1 = Address::derive(&pk);
        let a2 = Address::derive(&pk);
        assert_eq!(a1, a2);
        assert_ne!(a1, Address::derive(&[0x43u8; 32]));
    }

    #[test]
    fn test_address_hex_roundtrip() {
        let addr = Address::from_bytes([0xab; 20]);
        let recovered = Address::from_hex(&addr.to_hex()).unwrap();
        assert_eq!(addr, recovered);

        // 0x-prefixed form parses too
        let recovered = Address::from_hex(&format!("0x{}", addr.to_hex())).unwrap();
        assert_eq!(addr, recovered);
    }

    #[test]
    fn test_topic_from_identifiers() {
        let h = NameHash::of("alice");
        let t: Topic = h.into();
        assert_eq!(t.0, h.0);

        let id = ChannelId::from_bytes([7; 32]);
        let t: Topic = id.into();
        assert_eq!(t.0, id.0);
    }
}
