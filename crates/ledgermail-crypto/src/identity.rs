//! Identity keys: Ed25519 signing plus X25519 key agreement.
//!
//! One 32-byte seed yields both halves. The signing key is the seed itself;
//! the agreement secret is a Blake3 domain-separated derivation, so the two
//! keys never share raw material on the wire.
//!
//! At rest the seed is sealed under a passphrase: Argon2id stretches the
//! passphrase into a ChaCha20-Poly1305 key over a random salt.

use chacha20poly1305::{
    aead::{Aead, KeyInit},
    ChaCha20Poly1305, Nonce,
};
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fmt;
use x25519_dalek::{PublicKey, StaticSecret};

use ledgermail_core::Address;

use crate::error::{CryptoError, Result};

const X25519_DERIVE_CONTEXT: &str = "ledgermail/x25519/v1";
const SALT_LEN: usize = 16;
const NONCE_LEN: usize = 12;

/// A 32-byte Ed25519 public key.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SigningPublicKey(pub [u8; 32]);

impl SigningPublicKey {
    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Verify a detached signature over a message.
    ///
    /// Fails with `Verification`: a present-but-wrong signature is a
    /// different condition from a failed decryption.
    pub fn verify(&self, message: &[u8], signature: &[u8; 64]) -> Result<()> {
        let key = VerifyingKey::from_bytes(&self.0).map_err(|_| CryptoError::Verification)?;
        let sig = Signature::from_bytes(signature);
        key.verify(message, &sig)
            .map_err(|_| CryptoError::Verification)
    }
}

impl fmt::Debug for SigningPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SigningPub({})", &hex::encode(self.0)[..16])
    }
}

/// A 32-byte X25519 public key.
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgreementPublicKey(pub [u8; 32]);

impl AgreementPublicKey {
    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert to x25519-dalek PublicKey.
    pub fn to_dalek(&self) -> PublicKey {
        PublicKey::from(self.0)
    }
}

impl From<PublicKey> for AgreementPublicKey {
    fn from(pk: PublicKey) -> Self {
        Self(*pk.as_bytes())
    }
}

impl fmt::Debug for AgreementPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AgreementPub({})", &hex::encode(self.0)[..16])
    }
}

/// The public half of an identity: the bundle published to the blob store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityPublicKey {
    /// Ed25519 verification key.
    pub signing: SigningPublicKey,
    /// X25519 agreement key.
    pub agreement: AgreementPublicKey,
}

impl IdentityPublicKey {
    /// The ledger address registered for this identity.
    pub fn address(&self) -> Address {
        Address::derive(&self.signing.0)
    }

    /// Serialize to CBOR bytes (the blob-store representation).
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        ciborium::into_writer(self, &mut buf).expect("CBOR serialization failed");
        buf
    }

    /// Deserialize from CBOR bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        ciborium::from_reader(bytes).map_err(|e| CryptoError::Serialization(e.to_string()))
    }
}

/// An unlocked identity: the seed and everything derivable from it.
///
/// Held in memory for the lifetime of a session; the at-rest form is
/// [`ProtectedKey`].
#[derive(Clone)]
pub struct IdentitySecret {
    seed: [u8; 32],
}

impl IdentitySecret {
    /// Create from a raw seed. Prefer [`generate_identity_keys`] /
    /// [`ProtectedKey::unlock`] outside of tests.
    pub fn from_seed(seed: [u8; 32]) -> Self {
        Self { seed }
    }

    fn signing_key(&self) -> SigningKey {
        SigningKey::from_bytes(&self.seed)
    }

    /// The X25519 static secret for key agreement.
    pub fn agreement_secret(&self) -> StaticSecret {
        let mut hasher = blake3::Hasher::new_derive_key(X25519_DERIVE_CONTEXT);
        hasher.update(&self.seed);
        StaticSecret::from(*hasher.finalize().as_bytes())
    }

    /// The public half.
    pub fn public(&self) -> IdentityPublicKey {
        IdentityPublicKey {
            signing: SigningPublicKey(self.signing_key().verifying_key().to_bytes()),
            agreement: AgreementPublicKey::from(PublicKey::from(&self.agreement_secret())),
        }
    }

    /// Sign a message.
    pub fn sign(&self, message: &[u8]) -> [u8; 64] {
        self.signing_key().sign(message).to_bytes()
    }
}

impl fmt::Debug for IdentitySecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IdentitySecret({:?})", self.public().signing)
    }
}

/// A passphrase-protected identity key, safe to persist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtectedKey {
    /// The account name this key was generated for.
    pub user_id: String,
    /// Argon2id salt.
    pub salt: [u8; SALT_LEN],
    /// AEAD nonce.
    pub nonce: [u8; NONCE_LEN],
    /// Sealed 32-byte seed plus tag.
    pub ciphertext: Vec<u8>,
}

impl ProtectedKey {
    /// Unlock with the passphrase.
    ///
    /// A wrong passphrase fails the authentication tag, never yields a
    /// garbage seed.
    pub fn unlock(&self, passphrase: &str) -> Result<IdentitySecret> {
        let key = stretch_passphrase(passphrase, &self.salt)?;
        let cipher = ChaCha20Poly1305::new_from_slice(&key)
            .map_err(|e| CryptoError::Engine(e.to_string()))?;

        let seed_bytes = cipher
            .decrypt(Nonce::from_slice(&self.nonce), self.ciphertext.as_ref())
            .map_err(|_| CryptoError::Authentication)?;

        let seed: [u8; 32] = seed_bytes
            .try_into()
            .map_err(|_| CryptoError::Authentication)?;
        Ok(IdentitySecret { seed })
    }

    /// Serialize to CBOR bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        ciborium::into_writer(self, &mut buf).expect("CBOR serialization failed");
        buf
    }

    /// Deserialize from CBOR bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        ciborium::from_reader(bytes).map_err(|e| CryptoError::Serialization(e.to_string()))
    }
}

/// Generate a fresh identity keypair sealed under a passphrase.
///
/// Fails with `Validation` before touching the RNG when either argument is
/// empty or whitespace-only.
pub fn generate_identity_keys(
    name: &str,
    passphrase: &str,
) -> Result<(ProtectedKey, IdentityPublicKey)> {
    if name.trim().is_empty() {
        return Err(CryptoError::Validation("name must be non-empty".into()));
    }
    if passphrase.trim().is_empty() {
        return Err(CryptoError::Validation(
            "passphrase must be non-empty".into(),
        ));
    }

    let mut rng = rand::thread_rng();
    let mut seed = [0u8; 32];
    rng.fill_bytes(&mut seed);
    let mut salt = [0u8; SALT_LEN];
    rng.fill_bytes(&mut salt);
    let mut nonce = [0u8; NONCE_LEN];
    rng.fill_bytes(&mut nonce);

    let key = stretch_passphrase(passphrase, &salt)?;
    let cipher =
        ChaCha20Poly1305::new_from_slice(&key).map_err(|e| CryptoError::Engine(e.to_string()))?;
    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce), seed.as_ref())
        .map_err(|e| CryptoError::Engine(e.to_string()))?;

    let secret = IdentitySecret { seed };
    let protected = ProtectedKey {
        user_id: name.to_string(),
        salt,
        nonce,
        ciphertext,
    };
    Ok((protected, secret.public()))
}

/// Recover the public half from a protected key.
///
/// Fails with `Authentication` on a wrong passphrase.
pub fn derive_public_key(protected: &ProtectedKey, passphrase: &str) -> Result<IdentityPublicKey> {
    Ok(protected.unlock(passphrase)?.public())
}

fn stretch_passphrase(passphrase: &str, salt: &[u8; SALT_LEN]) -> Result<[u8; 32]> {
    let mut key = [0u8; 32];
    argon2::Argon2::default()
        .hash_password_into(passphrase.as_bytes(), salt, &mut key)
        .map_err(|e| CryptoError::Engine(e.to_string()))?;
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_rejects_empty_input() {
        assert!(matches!(
            generate_identity_keys("", "hunter2"),
            Err(CryptoError::Validation(_))
        ));
        assert!(matches!(
            generate_identity_keys("alice", "   "),
            Err(CryptoError::Validation(_))
        ));
    }

    #[test]
    fn test_unlock_roundtrip() {
        let (protected, public) = generate_identity_keys("alice", "hunter2").unwrap();
        let secret = protected.unlock("hunter2").unwrap();
        assert_eq!(secret.public(), public);
    }

    #[test]
    fn test_wrong_passphrase_is_authentication_error() {
        let (protected, _) = generate_identity_keys("alice", "hunter2").unwrap();
        assert!(matches!(
            protected.unlock("hunter3"),
            Err(CryptoError::Authentication)
        ));
        assert!(matches!(
            derive_public_key(&protected, "hunter3"),
            Err(CryptoError::Authentication)
        ));
    }

    #[test]
    fn test_derive_public_key_matches_generation() {
        let (protected, public) = generate_identity_keys("bob", "swordfish").unwrap();
        assert_eq!(derive_public_key(&protected, "swordfish").unwrap(), public);
    }

    #[test]
    fn test_sign_verify() {
        let secret = IdentitySecret::from_seed([0x42; 32]);
        let sig = secret.sign(b"message");
        secret.public().signing.verify(b"message", &sig).unwrap();
        assert!(matches!(
            secret.public().signing.verify(b"messagE", &sig),
            Err(CryptoError::Verification)
        ));
    }

    #[test]
    fn test_signing_and_agreement_keys_differ() {
        let secret = IdentitySecret::from_seed([0x42; 32]);
        let public = secret.public();
        assert_ne!(public.signing.0, public.agreement.0);
    }

    #[test]
    fn test_public_bundle_cbor_roundtrip() {
        let public = IdentitySecret::from_seed([7; 32]).public();
        let recovered = IdentityPublicKey::from_bytes(&public.to_bytes()).unwrap();
        assert_eq!(public, recovered);
    }

    #[test]
    fn test_protected_key_cbor_roundtrip() {
        let (protected, _) = generate_identity_keys("carol", "pw").unwrap();
        let recovered = ProtectedKey::from_bytes(&protected.to_bytes()).unwrap();
        assert_eq!(protected, recovered);
        assert_eq!(recovered.user_id, "carol");
    }
}
