//! Symmetric authenticated encryption for channel payloads.
//!
//! AES-256-GCM with a 16-byte nonce and 128-bit tag. Output framing is
//! `reserved(2) || nonce(16) || ciphertext+tag`, hex-encoded for transport.
//! The reserved bytes are zero today; they leave room for a format version
//! without breaking the frame layout.

use aes::Aes256;
use aes_gcm::{
    aead::{consts::U16, generic_array::GenericArray, Aead, KeyInit},
    AesGcm,
};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fmt;

use ledgermail_core::{ChannelId, FormatError};

use crate::error::{CryptoError, Result};

/// AES-256-GCM parameterized with a 16-byte nonce.
type PayloadCipher = AesGcm<Aes256, U16>;

/// Reserved frame prefix length.
pub const RESERVED_LEN: usize = 2;

/// Nonce length. Fresh random per encryption; must never repeat for a key.
pub const NONCE_LEN: usize = 16;

/// GCM authentication tag length.
pub const TAG_LEN: usize = 16;

/// A 256-bit symmetric channel key.
///
/// Transportable as hex; the channel id is derived from it, so holding the
/// key is sufficient to recompute which channel it opens.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymmetricKey([u8; 32]);

impl SymmetricKey {
    /// Generate a new random key.
    pub fn generate() -> Self {
        let mut bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert to hex string (transport form).
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from hex string.
    pub fn from_hex(s: &str) -> Result<Self> {
        let bytes = hex::decode(s).map_err(|e| FormatError::Hex(e.to_string()))?;
        let arr: [u8; 32] = bytes
            .try_into()
            .map_err(|_| CryptoError::Validation("symmetric key must be 32 bytes".into()))?;
        Ok(Self(arr))
    }

    /// Derive the channel id this key opens.
    pub fn channel_id(&self) -> ChannelId {
        let mut hasher = blake3::Hasher::new_derive_key("ledgermail/channel-id/v1");
        hasher.update(&self.0);
        ChannelId(*hasher.finalize().as_bytes())
    }

    /// Encrypt a payload under this key.
    ///
    /// Draws a fresh random nonce per call; repeated encryptions of the same
    /// plaintext produce different output.
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<String> {
        let cipher = PayloadCipher::new_from_slice(&self.0)
            .map_err(|e| CryptoError::Engine(e.to_string()))?;

        let mut nonce = [0u8; NONCE_LEN];
        rand::thread_rng().fill_bytes(&mut nonce);

        let sealed = cipher
            .encrypt(GenericArray::from_slice(&nonce), plaintext)
            .map_err(|e| CryptoError::Engine(e.to_string()))?;

        let mut frame = Vec::with_capacity(RESERVED_LEN + NONCE_LEN + sealed.len());
        frame.extend_from_slice(&[0u8; RESERVED_LEN]);
        frame.extend_from_slice(&nonce);
        frame.extend_from_slice(&sealed);
        Ok(hex::encode(frame))
    }

    /// Decrypt a framed payload.
    ///
    /// Returns `FormatError` for malformed framing and `Authentication` when
    /// the tag check fails (wrong key or tampered ciphertext).
    pub fn decrypt(&self, framed: &str) -> Result<Vec<u8>> {
        let frame = hex::decode(framed).map_err(|e| FormatError::Hex(e.to_string()))?;
        if frame.len() < RESERVED_LEN + NONCE_LEN + TAG_LEN {
            return Err(FormatError::FrameTooShort(frame.len()).into());
        }

        let nonce = &frame[RESERVED_LEN..RESERVED_LEN + NONCE_LEN];
        let sealed = &frame[RESERVED_LEN + NONCE_LEN..];

        let cipher = PayloadCipher::new_from_slice(&self.0)
            .map_err(|e| CryptoError::Engine(e.to_string()))?;

        cipher
            .decrypt(GenericArray::from_slice(nonce), sealed)
            .map_err(|_| CryptoError::Authentication)
    }
}

impl fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never print key material
        write!(f, "SymmetricKey({:?})", self.channel_id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encrypt_decrypt_roundtrip() {
        let key = SymmetricKey::generate();
        let framed = key.encrypt(b"hello, channel!").unwrap();
        let plaintext = key.decrypt(&framed).unwrap();
        assert_eq!(plaintext, b"hello, channel!");
    }

    #[test]
    fn test_encryption_nondeterministic() {
        let key = SymmetricKey::generate();
        let a = key.encrypt(b"same plaintext").unwrap();
        let b = key.encrypt(b"same plaintext").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_wrong_key_fails_authentication() {
        let key = SymmetricKey::generate();
        let other = SymmetricKey::generate();
        let framed = key.encrypt(b"secret").unwrap();
        assert!(matches!(
            other.decrypt(&framed),
            Err(CryptoError::Authentication)
        ));
    }

    #[test]
    fn test_tampered_ciphertext_fails_authentication() {
        let key = SymmetricKey::generate();
        let framed = key.encrypt(b"secret").unwrap();

        let mut bytes = hex::decode(&framed).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0x01;
        let tampered = hex::encode(bytes);

        assert!(matches!(
            key.decrypt(&tampered),
            Err(CryptoError::Authentication)
        ));
    }

    #[test]
    fn test_short_frame_is_format_error() {
        let key = SymmetricKey::generate();
        assert!(matches!(
            key.decrypt("0000aabb"),
            Err(CryptoError::Format(FormatError::FrameTooShort(_)))
        ));
    }

    #[test]
    fn test_non_hex_frame_is_format_error() {
        let key = SymmetricKey::generate();
        assert!(matches!(
            key.decrypt("not hex at all"),
            Err(CryptoError::Format(FormatError::Hex(_)))
        ));
    }

    #[test]
    fn test_frame_layout() {
        let key = SymmetricKey::generate();
        let framed = key.encrypt(b"x").unwrap();
        let bytes = hex::decode(&framed).unwrap();

        assert_eq!(&bytes[..RESERVED_LEN], &[0, 0]);
        assert_eq!(bytes.len(), RESERVED_LEN + NONCE_LEN + 1 + TAG_LEN);
    }

    #[test]
    fn test_key_hex_roundtrip() {
        let key = SymmetricKey::generate();
        let recovered = SymmetricKey::from_hex(&key.to_hex()).unwrap();
        assert_eq!(key, recovered);
    }

    #[test]
    fn test_channel_id_deterministic() {
        let key = SymmetricKey::generate();
        assert_eq!(key.channel_id(), key.channel_id());
        assert_ne!(key.channel_id(), SymmetricKey::generate().channel_id());
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn roundtrip_any_plaintext(
                seed in proptest::array::uniform32(any::<u8>()),
                plaintext in proptest::collection::vec(any::<u8>(), 0..512),
            ) {
                let key = SymmetricKey::from_bytes(seed);
                let framed = key.encrypt(&plaintext).unwrap();
                prop_assert_eq!(key.decrypt(&framed).unwrap(), plaintext);
            }
        }
    }
}
