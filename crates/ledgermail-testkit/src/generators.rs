//! Proptest generators for property-based testing.

use proptest::prelude::*;

use ledgermail_core::{Address, ChannelId, ContentPointer, NameHash, Sha256Hash};
use ledgermail_crypto::{IdentityPublicKey, IdentitySecret, SymmetricKey};

/// Generate an account name.
pub fn account_name() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9-]{0,31}".prop_map(String::from)
}

/// Generate a random NameHash.
pub fn name_hash() -> impl Strategy<Value = NameHash> {
    account_name().prop_map(|name| NameHash::of(&name))
}

/// Generate a random ChannelId.
pub fn channel_id() -> impl Strategy<Value = ChannelId> {
    any::<[u8; 32]>().prop_map(ChannelId::from_bytes)
}

/// Generate a random Address.
pub fn address() -> impl Strategy<Value = Address> {
    any::<[u8; 20]>().prop_map(Address::from_bytes)
}

/// Generate a random symmetric channel key.
pub fn symmetric_key() -> impl Strategy<Value = SymmetricKey> {
    any::<[u8; 32]>().prop_map(SymmetricKey::from_bytes)
}

/// Generate an identity secret from a random seed.
pub fn identity_secret() -> impl Strategy<Value = IdentitySecret> {
    any::<[u8; 32]>().prop_map(IdentitySecret::from_seed)
}

/// Generate a public-key bundle.
pub fn identity_public_key() -> impl Strategy<Value = IdentityPublicKey> {
    identity_secret().prop_map(|s| s.public())
}

/// Generate a content pointer addressing arbitrary bytes.
pub fn content_pointer() -> impl Strategy<Value = ContentPointer> {
    payload(64).prop_map(|bytes| ContentPointer::from_sha256(&Sha256Hash::hash(&bytes)))
}

/// Generate payload bytes of specified max length.
pub fn payload(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..=max_len)
}
