//! Typed ledger events and their CBOR payload records.
//!
//! The ledger emits one event per successful registration or send. Events
//! are immutable and globally ordered by position; application state is a
//! deterministic fold over them.

use serde::{Deserialize, Serialize};

use ledgermail_core::{ChannelId, ContentPointer, NameHash, Topic};

use crate::error::{LedgerError, Result};

/// Discriminator for event payload interpretation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    /// An account was registered: payload is an [`AccountRecord`].
    AccountRegistered,
    /// A channel was registered: payload is a [`ChannelRecord`].
    ChannelRegistered,
    /// A document was submitted: payload is a [`DocumentRecord`].
    DocumentSubmitted,
}

/// An immutable, ordered ledger record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEvent {
    /// Strictly increasing global position.
    pub position: u64,
    /// Payload discriminator.
    pub kind: EventKind,
    /// Indexed topics for filtered queries.
    pub topics: Vec<Topic>,
    /// CBOR-encoded payload record.
    pub payload: Vec<u8>,
}

impl LedgerEvent {
    /// Decode the payload as an [`AccountRecord`].
    pub fn account_record(&self) -> Result<AccountRecord> {
        decode(&self.payload)
    }

    /// Decode the payload as a [`ChannelRecord`].
    pub fn channel_record(&self) -> Result<ChannelRecord> {
        decode(&self.payload)
    }

    /// Decode the payload as a [`DocumentRecord`].
    pub fn document_record(&self) -> Result<DocumentRecord> {
        decode(&self.payload)
    }
}

fn decode<T: for<'de> Deserialize<'de>>(bytes: &[u8]) -> Result<T> {
    ciborium::from_reader(bytes).map_err(|e| LedgerError::Codec(e.to_string()))
}

fn encode<T: Serialize>(value: &T) -> Vec<u8> {
    let mut buf = Vec::new();
    ciborium::into_writer(value, &mut buf).expect("CBOR serialization failed");
    buf
}

/// Payload of an account-registration event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRecord {
    /// Hash of the registered name.
    pub name_hash: NameHash,
    /// Pointer to the public-key bundle in the blob store.
    pub pointer: ContentPointer,
}

/// Payload of a channel-registration event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelRecord {
    /// Deterministically derived channel id.
    pub channel_id: ChannelId,
    /// The owner's registered name hash (as claimed at submission).
    pub owner: NameHash,
    /// Wrapped symmetric key, encrypted to the channel's recipients.
    pub wrapped_key: Vec<u8>,
}

/// Payload of a document-submission event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRecord {
    /// The channel this document belongs to.
    pub channel_id: ChannelId,
    /// Pointer to the sealed payload in the blob store.
    pub pointer: ContentPointer,
}

/// A typed submission to the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    Account(AccountRecord),
    Channel(ChannelRecord),
    Document(DocumentRecord),
}

impl Submission {
    /// The event kind a successful submission will emit.
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Account(_) => EventKind::AccountRegistered,
            Self::Channel(_) => EventKind::ChannelRegistered,
            Self::Document(_) => EventKind::DocumentSubmitted,
        }
    }

    /// The topics the emitted event will carry.
    pub fn topics(&self) -> Vec<Topic> {
        match self {
            Self::Account(r) => vec![r.name_hash.into()],
            Self::Channel(r) => vec![r.channel_id.into(), r.owner.into()],
            Self::Document(r) => vec![r.channel_id.into()],
        }
    }

    /// CBOR-encode the payload record.
    pub fn payload(&self) -> Vec<u8> {
        match self {
            Self::Account(r) => encode(r),
            Self::Channel(r) => encode(r),
            Self::Document(r) => encode(r),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledgermail_core::Sha256Hash;

    #[test]
    fn test_account_record_roundtrip() {
        let record = AccountRecord {
            name_hash: NameHash::of("alice"),
            pointer: ContentPointer::from_sha256(&Sha256Hash::hash(b"pubkey")),
        };
        let submission = Submission::Account(record.clone());

        let event = LedgerEvent {
            position: 1,
            kind: submission.kind(),
            topics: submission.topics(),
            payload: submission.payload(),
        };

        assert_eq!(event.kind, EventKind::AccountRegistered);
        assert_eq!(event.topics, vec![record.name_hash.into()]);
        assert_eq!(event.account_record().unwrap(), record);
    }

    #[test]
    fn test_channel_record_topics() {
        let record = ChannelRecord {
            channel_id: ChannelId::from_bytes([1; 32]),
            owner: NameHash::of("alice"),
            wrapped_key: vec![9, 9, 9],
        };
        let submission = Submission::Channel(record.clone());

        let topics = submission.topics();
        assert_eq!(topics[0], record.channel_id.into());
        assert_eq!(topics[1], record.owner.into());
    }

    #[test]
    fn test_wrong_record_type_is_codec_error() {
        let submission = Submission::Document(DocumentRecord {
            channel_id: ChannelId::from_bytes([2; 32]),
            pointer: ContentPointer::from_sha256(&Sha256Hash::hash(b"doc")),
        });
        let event = LedgerEvent {
            position: 3,
            kind: submission.kind(),
            topics: submission.topics(),
            payload: submission.payload(),
        };

        assert!(event.document_record().is_ok());
        assert!(matches!(
            event.channel_record(),
            Err(LedgerError::Codec(_))
        ));
    }
}
