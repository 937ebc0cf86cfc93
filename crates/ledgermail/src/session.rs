//! The channel protocol session.
//!
//! A [`Session`] is the explicit per-identity state the protocol operates
//! on: the unlocked identity, the channel keys it holds, and the replay
//! cursors into the public log. Sessions are plain values; any number can
//! coexist in one process against a shared ledger.
//!
//! All application state is reconstructed by folding over the event log.
//! The log is public and untrusted: channel entries that fail to unwrap are
//! simply not addressed to this identity, and entries whose recovered
//! contents contradict their public claims are forged and dropped. Only a
//! decrypt failure inside a channel we already hold is treated as
//! corruption.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use ledgermail_core::{Address, ChannelId, NameHash};
use ledgermail_crypto::{
    generate_identity_keys, IdentityPublicKey, IdentitySecret, ProtectedKey, SymmetricKey,
    WrappedKey,
};
use ledgermail_ledger::{
    AccountRecord, BlobStore, ChannelRecord, DocumentRecord, EventKind, LedgerClient, Submission,
    TxReceipt,
};

use crate::config::SessionConfig;
use crate::error::{ProtocolError, Result};

/// The secret distributed inside a channel's wrapped key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct ChannelSecret {
    key: SymmetricKey,
    owner_name: String,
}

impl ChannelSecret {
    fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        ciborium::into_writer(self, &mut buf).expect("CBOR serialization failed");
        buf
    }

    fn from_bytes(bytes: &[u8]) -> Option<Self> {
        ciborium::from_reader(bytes).ok()
    }
}

/// A channel this session holds the key for.
#[derive(Debug, Clone)]
pub struct ChannelHandle {
    /// Deterministically derived id.
    pub channel_id: ChannelId,
    /// The symmetric key opening the channel's documents.
    pub key: SymmetricKey,
    /// The owner's registered name hash.
    pub owner: NameHash,
    /// The owner's name as recovered from the wrapped key.
    pub owner_name: String,
}

/// A decrypted document recovered from the log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// The channel it was published into.
    pub channel_id: ChannelId,
    /// Ledger position of the document event.
    pub position: u64,
    /// The recovered plaintext.
    pub plaintext: Vec<u8>,
}

/// The identity this session acts as.
struct LocalIdentity {
    name: String,
    name_hash: NameHash,
    secret: IdentitySecret,
    public: IdentityPublicKey,
    address: Address,
}

/// A per-identity protocol session over a ledger and a blob store.
pub struct Session<L: LedgerClient, B: BlobStore> {
    config: SessionConfig,
    ledger: L,
    blobs: B,
    identity: Option<LocalIdentity>,
    channels: HashMap<ChannelId, ChannelHandle>,
    /// Next channel-event position to scan.
    channel_cursor: u64,
    /// Next document-event position to scan. Never advances past work the
    /// channel cursor has not covered: discovery always runs first.
    document_cursor: u64,
}

impl<L: LedgerClient, B: BlobStore> Session<L, B> {
    /// Create a session with no identity attached.
    pub fn new(ledger: L, blobs: B, config: SessionConfig) -> Self {
        Self {
            config,
            ledger,
            blobs,
            identity: None,
            channels: HashMap::new(),
            channel_cursor: 1,
            document_cursor: 1,
        }
    }

    /// The session configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// The attached identity's name, if any.
    pub fn name(&self) -> Option<&str> {
        self.identity.as_ref().map(|i| i.name.as_str())
    }

    /// The attached identity's ledger address, if any.
    pub fn address(&self) -> Option<Address> {
        self.identity.as_ref().map(|i| i.address)
    }

    /// The attached identity's public key bundle, if any.
    pub fn public_key(&self) -> Option<IdentityPublicKey> {
        self.identity.as_ref().map(|i| i.public)
    }

    /// Channels currently held by this session.
    pub fn channels(&self) -> impl Iterator<Item = &ChannelHandle> {
        self.channels.values()
    }

    fn identity(&self) -> Result<&LocalIdentity> {
        self.identity
            .as_ref()
            .ok_or_else(|| ProtocolError::Validation("no identity attached to session".into()))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Account Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Register a fresh identity under `name`.
    ///
    /// Publishes the public-key bundle to the blob store, submits the
    /// registration, and blocks until the ledger confirms it. Returns the
    /// passphrase-protected private key (persist it: it is the only way to
    /// resume this identity) and the confirmation receipt.
    pub async fn register_account(
        &mut self,
        name: &str,
        passphrase: &str,
    ) -> Result<(ProtectedKey, TxReceipt)> {
        if self.identity.is_some() {
            return Err(ProtocolError::Validation(
                "session already has an identity".into(),
            ));
        }

        let (protected, public) = generate_identity_keys(name, passphrase)?;
        let secret = protected.unlock(passphrase)?;
        let address = public.address();
        let name_hash = NameHash::of(name);

        let pointer = self.blobs.put(&public.to_bytes()).await?;
        let submission = Submission::Account(AccountRecord { name_hash, pointer });
        let handle = self.ledger.submit(&submission, &address).await?;
        let receipt = self.ledger.wait_for_confirmation(&handle).await?;

        info!(name, %address, position = receipt.position, "account registered");
        self.identity = Some(LocalIdentity {
            name: name.to_string(),
            name_hash,
            secret,
            public,
            address,
        });
        Ok((protected, receipt))
    }

    /// Re-attach an already registered identity.
    ///
    /// Unlocks the protected key and checks it against the account log:
    /// the name must be registered and the on-ledger bundle must match the
    /// unlocked keys.
    pub async fn resume(
        &mut self,
        name: &str,
        protected: &ProtectedKey,
        passphrase: &str,
    ) -> Result<()> {
        if self.identity.is_some() {
            return Err(ProtocolError::Validation(
                "session already has an identity".into(),
            ));
        }

        let secret = protected.unlock(passphrase)?;
        let public = secret.public();
        let name_hash = NameHash::of(name);

        let registered = self.resolve_account(name_hash).await?;
        if registered != public {
            return Err(ProtocolError::Validation(
                "unlocked key does not match the registered bundle".into(),
            ));
        }

        debug!(name, "identity resumed");
        self.identity = Some(LocalIdentity {
            name: name.to_string(),
            name_hash,
            secret,
            public,
            address: public.address(),
        });
        Ok(())
    }

    /// Resolve a registered account's public-key bundle by name hash.
    ///
    /// Exactly one registration event must match: zero is an unknown
    /// account, more than one is a broken ledger invariant.
    async fn resolve_account(&self, name_hash: NameHash) -> Result<IdentityPublicKey> {
        let events = self
            .ledger
            .query_events(EventKind::AccountRegistered, 1, None, Some(name_hash.into()))
            .await?;

        let event = match events.as_slice() {
            [] => return Err(ProtocolError::AccountNotFound(name_hash)),
            [single] => single,
            _ => {
                return Err(ProtocolError::Corruption(format!(
                    "{} registration events for {:?}",
                    events.len(),
                    name_hash
                )))
            }
        };

        let record = event.account_record()?;
        let bytes = self.blobs.get(&record.pointer).await?;
        Ok(IdentityPublicKey::from_bytes(&bytes)?)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Channel Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Open a channel addressed to the named recipients.
    ///
    /// Resolves every recipient's current public key, wraps a fresh
    /// symmetric key (plus the caller's name, signed by the caller) to all
    /// of them and to the caller, and registers the channel. Blocks until
    /// the ledger confirms.
    pub async fn register_channel(
        &mut self,
        recipient_names: &[&str],
    ) -> Result<(ChannelId, TxReceipt)> {
        if recipient_names.is_empty() {
            return Err(ProtocolError::Validation(
                "at least one recipient is required".into(),
            ));
        }
        self.identity()?;

        // Every lookup must succeed before any key material is generated
        let mut recipients = Vec::with_capacity(recipient_names.len() + 1);
        for name in recipient_names {
            recipients.push(self.resolve_account(NameHash::of(name)).await?);
        }

        let identity = self.identity()?;
        recipients.push(identity.public);
        let owner = identity.name_hash;
        let owner_name = identity.name.clone();
        let address = identity.address;

        let key = SymmetricKey::generate();
        let channel_id = key.channel_id();
        let secret = ChannelSecret {
            key: key.clone(),
            owner_name: owner_name.clone(),
        };
        let wrapped = WrappedKey::seal(&secret.to_bytes(), &recipients, Some(&identity.secret))?;

        let submission = Submission::Channel(ChannelRecord {
            channel_id,
            owner,
            wrapped_key: wrapped.to_bytes(),
        });
        let handle = self.ledger.submit(&submission, &address).await?;
        let receipt = self.ledger.wait_for_confirmation(&handle).await?;

        info!(%channel_id, recipients = recipient_names.len(), "channel registered");
        self.channels.insert(
            channel_id,
            ChannelHandle {
                channel_id,
                key,
                owner,
                owner_name,
            },
        );
        Ok((channel_id, receipt))
    }

    /// Scan the log for channels addressed to this identity.
    ///
    /// Replays channel-registration events from the session cursor and
    /// attempts to unwrap each one. Unwrap failure means the entry is not
    /// addressed to us and is silently skipped: this linear scan with a
    /// cheap reject path *is* the access-control mechanism. Entries whose
    /// recovered owner name does not hash to the claimed owner are forged
    /// and dropped without raising.
    ///
    /// Returns the channels newly recovered by this scan.
    pub async fn discover_channels(&mut self) -> Result<Vec<ChannelHandle>> {
        let identity_secret = self.identity()?.secret.clone();
        let events = self
            .ledger
            .query_events(EventKind::ChannelRegistered, self.channel_cursor, None, None)
            .await?;

        let mut found = Vec::new();
        let mut cursor = self.channel_cursor;
        for event in &events {
            cursor = event.position + 1;

            let Ok(record) = event.channel_record() else {
                debug!(position = event.position, "skipping undecodable channel entry");
                continue;
            };
            if self.channels.contains_key(&record.channel_id) {
                continue;
            }
            let Ok(wrapped) = WrappedKey::from_bytes(&record.wrapped_key) else {
                debug!(position = event.position, "skipping malformed wrapped key");
                continue;
            };
            // The expected case: most entries are not for us
            let Ok(plaintext) = wrapped.open(&identity_secret, None) else {
                continue;
            };
            let Some(secret) = ChannelSecret::from_bytes(&plaintext) else {
                debug!(position = event.position, "skipping undecodable channel secret");
                continue;
            };

            // A forged entry can claim any owner; the recovered name must
            // hash back to the claim, and the key must derive the
            // registered id
            if NameHash::of(&secret.owner_name) != record.owner {
                debug!(position = event.position, "dropping channel entry with forged owner");
                continue;
            }
            if secret.key.channel_id() != record.channel_id {
                debug!(position = event.position, "dropping channel entry with mismatched key");
                continue;
            }

            let handle = ChannelHandle {
                channel_id: record.channel_id,
                key: secret.key,
                owner: record.owner,
                owner_name: secret.owner_name,
            };
            debug!(channel_id = %handle.channel_id, owner = %handle.owner_name, "channel recovered");
            self.channels.insert(record.channel_id, handle.clone());
            found.push(handle);
        }

        self.channel_cursor = cursor;
        Ok(found)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Document Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Publish a document into a channel this session owns the key for.
    ///
    /// The ledger enforces that only the channel's registered owner may
    /// submit; a non-owner is rejected with a permission denial.
    pub async fn send_document(
        &mut self,
        channel_id: ChannelId,
        plaintext: &[u8],
    ) -> Result<TxReceipt> {
        let identity = self.identity()?;
        let handle = self
            .channels
            .get(&channel_id)
            .ok_or(ProtocolError::ChannelNotFound(channel_id))?;

        let framed = handle.key.encrypt(plaintext)?;
        let pointer = self.blobs.put(framed.as_bytes()).await?;

        let submission = Submission::Document(DocumentRecord {
            channel_id,
            pointer,
        });
        let tx = self.ledger.submit(&submission, &identity.address).await?;
        let receipt = self.ledger.wait_for_confirmation(&tx).await?;

        info!(%channel_id, position = receipt.position, "document sent");
        Ok(receipt)
    }

    /// Scan the log for documents in channels this session holds.
    ///
    /// Discovery runs first so document replay never outruns it. Document
    /// events for unknown channels are skipped (not addressed to us), but a
    /// decrypt failure in a channel we *do* hold is corruption and is
    /// surfaced, unlike the expected skips during discovery.
    pub async fn receive_documents(&mut self) -> Result<Vec<Document>> {
        self.discover_channels().await?;

        let events = self
            .ledger
            .query_events(
                EventKind::DocumentSubmitted,
                self.document_cursor,
                None,
                None,
            )
            .await?;

        let mut documents = Vec::new();
        let mut cursor = self.document_cursor;
        for event in &events {
            cursor = event.position + 1;

            let Ok(record) = event.document_record() else {
                debug!(position = event.position, "skipping undecodable document entry");
                continue;
            };
            let Some(handle) = self.channels.get(&record.channel_id) else {
                continue;
            };

            let bytes = self.blobs.get(&record.pointer).await?;
            let framed = String::from_utf8(bytes).map_err(|_| {
                ProtocolError::Corruption(format!(
                    "document at position {} is not transport-encoded",
                    event.position
                ))
            })?;
            let plaintext = handle.key.decrypt(&framed).map_err(|e| {
                ProtocolError::Corruption(format!(
                    "document at position {} failed to decrypt: {}",
                    event.position, e
                ))
            })?;

            documents.push(Document {
                channel_id: record.channel_id,
                position: event.position,
                plaintext,
            });
        }

        self.document_cursor = cursor;
        Ok(documents)
    }
}
