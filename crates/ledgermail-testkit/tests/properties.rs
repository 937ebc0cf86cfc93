//! Property tests over the core protocol primitives.

use proptest::prelude::*;

use ledgermail_crypto::WrappedKey;
use ledgermail_testkit::generators::{
    content_pointer, identity_public_key, identity_secret, payload, symmetric_key,
};

proptest! {
    #[test]
    fn channel_id_is_a_pure_function_of_the_key(key in symmetric_key()) {
        prop_assert_eq!(key.channel_id(), key.channel_id());
    }

    #[test]
    fn distinct_keys_yield_distinct_channel_ids(a in symmetric_key(), b in symmetric_key()) {
        prop_assume!(a != b);
        prop_assert_ne!(a.channel_id(), b.channel_id());
    }

    #[test]
    fn symmetric_roundtrip(key in symmetric_key(), plaintext in payload(256)) {
        let framed = key.encrypt(&plaintext).unwrap();
        prop_assert_eq!(key.decrypt(&framed).unwrap(), plaintext);
    }

    #[test]
    fn key_hex_roundtrip(key in symmetric_key()) {
        let recovered = ledgermail_crypto::SymmetricKey::from_hex(&key.to_hex()).unwrap();
        prop_assert_eq!(recovered, key);
    }

    #[test]
    fn content_pointer_multihash_roundtrip(pointer in content_pointer()) {
        let multihash = pointer.to_multihash().unwrap();
        prop_assert_eq!(multihash.encode().unwrap(), pointer.as_str());
    }

    #[test]
    fn wrap_roundtrip_for_any_recipient(
        secret in identity_secret(),
        message in payload(128),
    ) {
        let wrapped = WrappedKey::seal(&message, &[secret.public()], Some(&secret)).unwrap();
        let opened = wrapped.open(&secret, Some(&secret.public())).unwrap();
        prop_assert_eq!(opened, message);
    }

    #[test]
    fn wrap_excludes_strangers(
        recipient in identity_secret(),
        stranger in identity_secret(),
        message in payload(128),
    ) {
        prop_assume!(recipient.public() != stranger.public());
        let wrapped = WrappedKey::seal(&message, &[recipient.public()], None).unwrap();
        prop_assert!(wrapped.open(&stranger, None).is_err());
    }

    #[test]
    fn address_is_stable_per_identity(public in identity_public_key()) {
        prop_assert_eq!(public.address(), public.address());
    }
}
