//! Base58 multihash codec for content pointers.
//!
//! A content pointer is the base58 text of `function || size || digest`.
//! The registry only ever emits SHA-256 pointers (function 0x12, 32-byte
//! digest), but the codec carries the header bytes through untouched so
//! foreign pointers round-trip.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::FormatError;
use crate::hash::Sha256Hash;

/// Default hash function byte: SHA-256 in the multihash table.
pub const DEFAULT_HASH_FUNCTION: u8 = 0x12;

/// Default digest size in bytes.
pub const DEFAULT_DIGEST_SIZE: u8 = 0x20;

/// A decoded multihash: the digest plus its self-describing header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Multihash {
    /// Digest as a "0x"-prefixed hex string.
    pub digest: String,
    /// Hash function byte from the multihash table.
    pub hash_function: u8,
    /// Digest length in bytes.
    pub size: u8,
}

impl Multihash {
    /// Wrap a bare "0x"-prefixed digest with the default header.
    pub fn from_digest(digest: &str) -> Result<Self, FormatError> {
        let raw = strip_prefix(digest)?;
        let bytes = decode_hex(raw)?;
        if bytes.len() != DEFAULT_DIGEST_SIZE as usize {
            return Err(FormatError::DigestLength {
                declared: DEFAULT_DIGEST_SIZE as usize,
                actual: bytes.len(),
            });
        }
        Ok(Self {
            digest: digest.to_string(),
            hash_function: DEFAULT_HASH_FUNCTION,
            size: DEFAULT_DIGEST_SIZE,
        })
    }

    /// Build the default-header multihash of a SHA-256 digest.
    pub fn from_sha256(hash: &Sha256Hash) -> Self {
        Self {
            digest: format!("0x{}", hash.to_hex()),
            hash_function: DEFAULT_HASH_FUNCTION,
            size: DEFAULT_DIGEST_SIZE,
        }
    }

    /// Decode base58 multihash text.
    pub fn decode(text: &str) -> Result<Self, FormatError> {
        let bytes = bs58::decode(text)
            .into_vec()
            .map_err(|e| FormatError::Base58(e.to_string()))?;
        if bytes.len() < 2 {
            return Err(FormatError::MultihashTooShort(bytes.len()));
        }
        let hash_function = bytes[0];
        let size = bytes[1];
        let digest = &bytes[2..];
        if digest.len() != size as usize {
            return Err(FormatError::DigestLength {
                declared: size as usize,
                actual: digest.len(),
            });
        }
        Ok(Self {
            digest: format!("0x{}", hex::encode(digest)),
            hash_function,
            size,
        })
    }

    /// Encode to base58 multihash text.
    pub fn encode(&self) -> Result<String, FormatError> {
        let raw = strip_prefix(&self.digest)?;
        let digest = decode_hex(raw)?;
        if digest.len() != self.size as usize {
            return Err(FormatError::DigestLength {
                declared: self.size as usize,
                actual: digest.len(),
            });
        }
        let mut bytes = Vec::with_capacity(2 + digest.len());
        bytes.push(self.hash_function);
        bytes.push(self.size);
        bytes.extend_from_slice(&digest);
        Ok(bs58::encode(bytes).into_string())
    }
}

/// Encode a bare "0x"-prefixed digest with the default header.
pub fn encode_digest(digest: &str) -> Result<String, FormatError> {
    Multihash::from_digest(digest)?.encode()
}

fn strip_prefix(digest: &str) -> Result<&str, FormatError> {
    digest
        .strip_prefix("0x")
        .ok_or(FormatError::MissingHexPrefix)
}

fn decode_hex(s: &str) -> Result<Vec<u8>, FormatError> {
    hex::decode(s).map_err(|e| FormatError::Hex(e.to_string()))
}

/// Base58 multihash text addressing an immutable blob.
///
/// Stored and transmitted as the encoded text; [`ContentPointer::to_multihash`]
/// recovers the header and digest.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentPointer(pub String);

impl ContentPointer {
    /// Wrap already-encoded multihash text, validating it decodes.
    pub fn parse(text: &str) -> Result<Self, FormatError> {
        Multihash::decode(text)?;
        Ok(Self(text.to_string()))
    }

    /// Build the pointer for a blob's SHA-256 digest.
    pub fn from_sha256(hash: &Sha256Hash) -> Self {
        // Infallible: from_sha256 always carries a well-formed digest.
        let text = Multihash::from_sha256(hash)
            .encode()
            .expect("default multihash header is well-formed");
        Self(text)
    }

    /// The base58 text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Decode into digest and header bytes.
    pub fn to_multihash(&self) -> Result<Multihash, FormatError> {
        Multihash::decode(&self.0)
    }
}

impl fmt::Debug for ContentPointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentPointer({})", self.0)
    }
}

impl fmt::Display for ContentPointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // A well-known sha2-256 multihash in the wild (CIDv0 shape)
    const KNOWN: &str = "QmaozNR7DZHQK1ZcU9p7QdrshMvXqWK6gpu5rmrkPdT3L4";

    #[test]
    fn test_decode_known_pointer() {
        let mh = Multihash::decode(KNOWN).unwrap();
        assert_eq!(mh.hash_function, 0x12);
        assert_eq!(mh.size, 0x20);
        assert!(mh.digest.starts_with("0x"));
        assert_eq!(mh.digest.len(), 2 + 64);
    }

    #[test]
    fn test_roundtrip_both_directions() {
        let mh = Multihash::decode(KNOWN).unwrap();
        assert_eq!(mh.encode().unwrap(), KNOWN);

        let again = Multihash::decode(&mh.encode().unwrap()).unwrap();
        assert_eq!(again, mh);
    }

    #[test]
    fn test_bare_digest_defaults() {
        let digest = format!("0x{}", hex::encode([0x5au8; 32]));
        let text = encode_digest(&digest).unwrap();
        let mh = Multihash::decode(&text).unwrap();
        assert_eq!(mh.hash_function, DEFAULT_HASH_FUNCTION);
        assert_eq!(mh.size, DEFAULT_DIGEST_SIZE);
        assert_eq!(mh.digest, digest);
    }

    #[test]
    fn test_reject_missing_prefix() {
        let digest = hex::encode([0u8; 32]);
        assert!(matches!(
            encode_digest(&digest),
            Err(FormatError::MissingHexPrefix)
        ));
    }

    #[test]
    fn test_reject_length_mismatch() {
        // Header declares 32 bytes but only 4 follow
        let mut bytes = vec![0x12, 0x20];
        bytes.extend_from_slice(&[1, 2, 3, 4]);
        let text = bs58::encode(bytes).into_string();
        assert!(matches!(
            Multihash::decode(&text),
            Err(FormatError::DigestLength { declared: 32, actual: 4 })
        ));
    }

    #[test]
    fn test_reject_truncated() {
        let text = bs58::encode([0x12u8]).into_string();
        assert!(matches!(
            Multihash::decode(&text),
            Err(FormatError::MultihashTooShort(1))
        ));
    }

    #[test]
    fn test_reject_bad_base58() {
        // '0' and 'l' are not in the base58 alphabet
        assert!(matches!(
            Multihash::decode("0lII"),
            Err(FormatError::Base58(_))
        ));
    }

    #[test]
    fn test_content_pointer_from_sha256() {
        let hash = Sha256Hash::hash(b"blob bytes");
        let pointer = ContentPointer::from_sha256(&hash);
        let mh = pointer.to_multihash().unwrap();
        assert_eq!(mh.digest, format!("0x{}", hash.to_hex()));
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn roundtrip_any_digest(bytes in proptest::array::uniform32(any::<u8>())) {
                let digest = format!("0x{}", hex::encode(bytes));
                let text = encode_digest(&digest).unwrap();
                let mh = Multihash::decode(&text).unwrap();
                prop_assert_eq!(&mh.digest, &digest);
                prop_assert_eq!(mh.encode().unwrap(), text);
            }
        }
    }
}
