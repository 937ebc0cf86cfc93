//! Multi-recipient key wrapping.
//!
//! A [`WrappedKey`] carries a small secret (a channel key plus the owner's
//! name) to N independent recipients. Each recipient slot wraps one random
//! session key via ephemeral X25519 ECDH; the session key seals the letter
//! itself. When a signer is supplied the letter embeds an Ed25519 signature
//! over the message, checked decrypt-then-verify on open.

use chacha20poly1305::{
    aead::{Aead, KeyInit},
    ChaCha20Poly1305, Nonce,
};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use x25519_dalek::{EphemeralSecret, PublicKey};

use crate::error::{CryptoError, Result};
use crate::identity::{AgreementPublicKey, IdentityPublicKey, IdentitySecret};

const WRAP_DERIVE_CONTEXT: &str = "ledgermail/wrap-key/v1";
const SIGN_DOMAIN: &[u8] = b"ledgermail/wrap-sig/v1";
const NONCE_LEN: usize = 12;
const SESSION_KEY_LEN: usize = 32;

/// One recipient's wrapped copy of the session key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct RecipientSlot {
    /// Sender's ephemeral X25519 public key for this slot.
    ephemeral: AgreementPublicKey,
    /// AEAD nonce for the wrapped session key.
    nonce: [u8; NONCE_LEN],
    /// Session key sealed under the derived wrap key.
    sealed_session: Vec<u8>,
}

/// The sealed letter: message plus optional detached signature (64 bytes).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct Letter {
    message: Vec<u8>,
    signature: Option<Vec<u8>>,
}

/// An asymmetric multi-recipient envelope around a small secret.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WrappedKey {
    /// One slot per recipient, order carries no meaning.
    slots: Vec<RecipientSlot>,
    /// AEAD nonce for the letter body.
    nonce: [u8; NONCE_LEN],
    /// CBOR letter sealed under the session key.
    body: Vec<u8>,
}

impl WrappedKey {
    /// Seal a message for every recipient, optionally signing it.
    pub fn seal(
        message: &[u8],
        recipients: &[IdentityPublicKey],
        signer: Option<&IdentitySecret>,
    ) -> Result<Self> {
        if recipients.is_empty() {
            return Err(CryptoError::Validation(
                "at least one recipient is required".into(),
            ));
        }

        let mut rng = rand::thread_rng();
        let mut session = [0u8; SESSION_KEY_LEN];
        rng.fill_bytes(&mut session);

        let signature = signer.map(|s| s.sign(&sign_message(message)).to_vec());
        let letter = Letter {
            message: message.to_vec(),
            signature,
        };
        let mut letter_bytes = Vec::new();
        ciborium::into_writer(&letter, &mut letter_bytes)
            .map_err(|e| CryptoError::Serialization(e.to_string()))?;

        let mut nonce = [0u8; NONCE_LEN];
        rng.fill_bytes(&mut nonce);
        let body_cipher = ChaCha20Poly1305::new_from_slice(&session)
            .map_err(|e| CryptoError::Engine(e.to_string()))?;
        let body = body_cipher
            .encrypt(Nonce::from_slice(&nonce), letter_bytes.as_ref())
            .map_err(|e| CryptoError::Engine(e.to_string()))?;

        let mut slots = Vec::with_capacity(recipients.len());
        for recipient in recipients {
            let ephemeral = EphemeralSecret::random_from_rng(rand::thread_rng());
            let ephemeral_public = AgreementPublicKey::from(PublicKey::from(&ephemeral));
            let shared = ephemeral.diffie_hellman(&recipient.agreement.to_dalek());
            let wrap_key = derive_wrap_key(shared.as_bytes(), &ephemeral_public);

            let mut slot_nonce = [0u8; NONCE_LEN];
            rand::thread_rng().fill_bytes(&mut slot_nonce);
            let slot_cipher = ChaCha20Poly1305::new_from_slice(&wrap_key)
                .map_err(|e| CryptoError::Engine(e.to_string()))?;
            let sealed_session = slot_cipher
                .encrypt(Nonce::from_slice(&slot_nonce), session.as_ref())
                .map_err(|e| CryptoError::Engine(e.to_string()))?;

            slots.push(RecipientSlot {
                ephemeral: ephemeral_public,
                nonce: slot_nonce,
                sealed_session,
            });
        }

        Ok(Self { slots, nonce, body })
    }

    /// Open the envelope with a recipient's identity.
    ///
    /// Tries every slot; if none yields the session key the caller was not
    /// a recipient and the result is `Authentication`. With `sender`
    /// supplied, the embedded signature must exist and verify: a ciphertext
    /// that decrypts but is unsigned or mis-signed is rejected with
    /// `Verification`.
    pub fn open(
        &self,
        recipient: &IdentitySecret,
        sender: Option<&IdentityPublicKey>,
    ) -> Result<Vec<u8>> {
        let agreement = recipient.agreement_secret();

        let mut session: Option<[u8; SESSION_KEY_LEN]> = None;
        for slot in &self.slots {
            let shared = agreement.diffie_hellman(&slot.ephemeral.to_dalek());
            let wrap_key = derive_wrap_key(shared.as_bytes(), &slot.ephemeral);
            let slot_cipher = ChaCha20Poly1305::new_from_slice(&wrap_key)
                .map_err(|e| CryptoError::Engine(e.to_string()))?;

            if let Ok(bytes) =
                slot_cipher.decrypt(Nonce::from_slice(&slot.nonce), slot.sealed_session.as_ref())
            {
                if let Ok(arr) = <[u8; SESSION_KEY_LEN]>::try_from(bytes.as_slice()) {
                    session = Some(arr);
                    break;
                }
            }
        }
        let session = session.ok_or(CryptoError::Authentication)?;

        let body_cipher = ChaCha20Poly1305::new_from_slice(&session)
            .map_err(|e| CryptoError::Engine(e.to_string()))?;
        let letter_bytes = body_cipher
            .decrypt(Nonce::from_slice(&self.nonce), self.body.as_ref())
            .map_err(|_| CryptoError::Authentication)?;
        let letter: Letter = ciborium::from_reader(letter_bytes.as_slice())
            .map_err(|e| CryptoError::Serialization(e.to_string()))?;

        if let Some(sender) = sender {
            let bytes = letter.signature.ok_or(CryptoError::Verification)?;
            let signature: [u8; 64] = bytes
                .as_slice()
                .try_into()
                .map_err(|_| CryptoError::Verification)?;
            sender
                .signing
                .verify(&sign_message(&letter.message), &signature)?;
        }

        Ok(letter.message)
    }

    /// Serialize to CBOR bytes (the ledger representation).
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        ciborium::into_writer(self, &mut buf).expect("CBOR serialization failed");
        buf
    }

    /// Deserialize from CBOR bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        ciborium::from_reader(bytes).map_err(|e| CryptoError::Serialization(e.to_string()))
    }

    /// Number of recipient slots.
    pub fn recipient_count(&self) -> usize {
        self.slots.len()
    }
}

fn sign_message(message: &[u8]) -> Vec<u8> {
    let mut signed = Vec::with_capacity(SIGN_DOMAIN.len() + message.len());
    signed.extend_from_slice(SIGN_DOMAIN);
    signed.extend_from_slice(message);
    signed
}

fn derive_wrap_key(shared: &[u8; 32], ephemeral: &AgreementPublicKey) -> [u8; 32] {
    let mut hasher = blake3::Hasher::new_derive_key(WRAP_DERIVE_CONTEXT);
    hasher.update(shared);
    hasher.update(ephemeral.as_bytes());
    *hasher.finalize().as_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(seed: u8) -> IdentitySecret {
        IdentitySecret::from_seed([seed; 32])
    }

    #[test]
    fn test_single_recipient_roundtrip() {
        let bob = identity(1);
        let wrapped = WrappedKey::seal(b"the secret", &[bob.public()], None).unwrap();
        assert_eq!(wrapped.open(&bob, None).unwrap(), b"the secret");
    }

    #[test]
    fn test_each_recipient_unwraps_independently() {
        let bob = identity(1);
        let carol = identity(2);
        let wrapped =
            WrappedKey::seal(b"shared secret", &[bob.public(), carol.public()], None).unwrap();

        assert_eq!(wrapped.open(&bob, None).unwrap(), b"shared secret");
        assert_eq!(wrapped.open(&carol, None).unwrap(), b"shared secret");
        assert_eq!(wrapped.recipient_count(), 2);
    }

    #[test]
    fn test_stranger_fails_authentication() {
        let bob = identity(1);
        let mallory = identity(9);
        let wrapped = WrappedKey::seal(b"secret", &[bob.public()], None).unwrap();
        assert!(matches!(
            wrapped.open(&mallory, None),
            Err(CryptoError::Authentication)
        ));
    }

    #[test]
    fn test_no_recipients_is_validation_error() {
        assert!(matches!(
            WrappedKey::seal(b"secret", &[], None),
            Err(CryptoError::Validation(_))
        ));
    }

    #[test]
    fn test_signed_seal_verifies_with_sender_key() {
        let alice = identity(3);
        let bob = identity(1);
        let wrapped = WrappedKey::seal(b"from alice", &[bob.public()], Some(&alice)).unwrap();

        let opened = wrapped.open(&bob, Some(&alice.public())).unwrap();
        assert_eq!(opened, b"from alice");
    }

    #[test]
    fn test_mismatched_signer_is_verification_error() {
        let alice = identity(3);
        let eve = identity(4);
        let bob = identity(1);
        let wrapped = WrappedKey::seal(b"from alice", &[bob.public()], Some(&alice)).unwrap();

        // Decryption succeeds, the signature check must still reject
        assert!(matches!(
            wrapped.open(&bob, Some(&eve.public())),
            Err(CryptoError::Verification)
        ));
    }

    #[test]
    fn test_unsigned_envelope_rejected_when_sender_expected() {
        let alice = identity(3);
        let bob = identity(1);
        let wrapped = WrappedKey::seal(b"anonymous", &[bob.public()], None).unwrap();
        assert!(matches!(
            wrapped.open(&bob, Some(&alice.public())),
            Err(CryptoError::Verification)
        ));
    }

    #[test]
    fn test_signature_optional_on_open() {
        let alice = identity(3);
        let bob = identity(1);
        let wrapped = WrappedKey::seal(b"from alice", &[bob.public()], Some(&alice)).unwrap();

        // Without a sender key the signature is simply not checked
        assert_eq!(wrapped.open(&bob, None).unwrap(), b"from alice");
    }

    #[test]
    fn test_cbor_roundtrip() {
        let bob = identity(1);
        let wrapped = WrappedKey::seal(b"secret", &[bob.public()], None).unwrap();
        let recovered = WrappedKey::from_bytes(&wrapped.to_bytes()).unwrap();
        assert_eq!(wrapped, recovered);
        assert_eq!(recovered.open(&bob, None).unwrap(), b"secret");
    }
}
