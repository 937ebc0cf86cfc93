//! In-memory ledger and blob store.
//!
//! Primarily for tests, but with the same rejection semantics a production
//! registry contract enforces: a submission that violates an invariant is
//! rejected at `submit` time and never enters the log.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use rand::RngCore;
use tracing::debug;

use ledgermail_core::{Address, ChannelId, ContentPointer, NameHash, Sha256Hash, Topic};

use crate::error::{BlobError, ConflictKind, DenialKind, LedgerError, Result};
use crate::events::{EventKind, LedgerEvent, Submission};
use crate::traits::{BlobStore, LedgerClient, TxHandle, TxReceipt};

/// In-memory ledger implementation.
///
/// Cloning shares the underlying log, so multiple sessions in one process
/// observe the same chain. Thread-safe via RwLock.
#[derive(Clone)]
pub struct MemoryLedger {
    inner: Arc<RwLock<MemoryLedgerInner>>,
}

struct MemoryLedgerInner {
    /// The ordered event log. Position is index + 1.
    log: Vec<LedgerEvent>,

    /// Registered accounts: name hash -> registering address.
    names: HashMap<NameHash, Address>,

    /// Reverse index: address -> registered name hash.
    addresses: HashMap<Address, NameHash>,

    /// Registered channels: channel id -> owning address.
    channels: HashMap<ChannelId, Address>,

    /// Submitted-but-unread confirmations: handle -> event position.
    pending: HashMap<TxHandle, u64>,
}

impl MemoryLedger {
    /// Create a new empty ledger.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(MemoryLedgerInner {
                log: Vec::new(),
                names: HashMap::new(),
                addresses: HashMap::new(),
                channels: HashMap::new(),
                pending: HashMap::new(),
            })),
        }
    }

    /// Snapshot the full log (test introspection).
    pub fn events(&self) -> Vec<LedgerEvent> {
        self.inner.read().unwrap().log.clone()
    }

    /// Append a raw event without invariant checks.
    ///
    /// Lets tests plant forged or irrelevant entries the way a hostile
    /// submitter on a shared chain could.
    pub fn inject_raw(&self, kind: EventKind, topics: Vec<Topic>, payload: Vec<u8>) -> u64 {
        let mut inner = self.inner.write().unwrap();
        let position = inner.log.len() as u64 + 1;
        inner.log.push(LedgerEvent {
            position,
            kind,
            topics,
            payload,
        });
        position
    }

    fn validate(inner: &MemoryLedgerInner, submission: &Submission, from: &Address) -> Result<()> {
        match submission {
            Submission::Account(record) => {
                if inner.names.contains_key(&record.name_hash) {
                    return Err(LedgerError::Conflict(ConflictKind::ExistsName));
                }
                if inner.addresses.contains_key(from) {
                    return Err(LedgerError::Conflict(ConflictKind::ExistsAddress));
                }
            }
            Submission::Channel(record) => {
                if !inner.addresses.contains_key(from) {
                    return Err(LedgerError::Permission(DenialKind::NotExistsAccount));
                }
                if inner.channels.contains_key(&record.channel_id) {
                    return Err(LedgerError::Conflict(ConflictKind::ExistsChannel));
                }
            }
            Submission::Document(record) => {
                match inner.channels.get(&record.channel_id) {
                    Some(owner) if owner == from => {}
                    _ => return Err(LedgerError::Permission(DenialKind::NotChannelOwner)),
                }
            }
        }
        Ok(())
    }

    fn apply(inner: &mut MemoryLedgerInner, submission: &Submission, from: &Address) {
        match submission {
            Submission::Account(record) => {
                inner.names.insert(record.name_hash, *from);
                inner.addresses.insert(*from, record.name_hash);
            }
            Submission::Channel(record) => {
                inner.channels.insert(record.channel_id, *from);
            }
            Submission::Document(_) => {}
        }
    }
}

impl Default for MemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LedgerClient for MemoryLedger {
    async fn submit(&self, submission: &Submission, from: &Address) -> Result<TxHandle> {
        let mut inner = self.inner.write().unwrap();

        Self::validate(&inner, submission, from)?;
        Self::apply(&mut inner, submission, from);

        let position = inner.log.len() as u64 + 1;
        inner.log.push(LedgerEvent {
            position,
            kind: submission.kind(),
            topics: submission.topics(),
            payload: submission.payload(),
        });

        let mut handle = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut handle);
        let handle = TxHandle(handle);
        inner.pending.insert(handle, position);

        debug!(kind = ?submission.kind(), position, from = %from, "ledger event appended");
        Ok(handle)
    }

    async fn wait_for_confirmation(&self, handle: &TxHandle) -> Result<TxReceipt> {
        // The in-memory chain confirms instantly; the receipt still flows
        // through the same seam a real client blocks on.
        let inner = self.inner.read().unwrap();
        let position = *inner
            .pending
            .get(handle)
            .ok_or(LedgerError::UnknownHandle)?;
        Ok(TxReceipt {
            handle: *handle,
            position,
        })
    }

    async fn query_events(
        &self,
        kind: EventKind,
        from_position: u64,
        to_position: Option<u64>,
        topic: Option<Topic>,
    ) -> Result<Vec<LedgerEvent>> {
        let inner = self.inner.read().unwrap();
        let to = to_position.unwrap_or(u64::MAX);

        Ok(inner
            .log
            .iter()
            .filter(|e| e.kind == kind)
            .filter(|e| e.position >= from_position && e.position <= to)
            .filter(|e| topic.map_or(true, |t| e.topics.contains(&t)))
            .cloned()
            .collect())
    }
}

/// In-memory content-addressed blob store.
///
/// Pointers are the SHA-256 multihash of the bytes, so `put` is idempotent.
#[derive(Clone)]
pub struct MemoryBlobStore {
    blobs: Arc<RwLock<HashMap<String, Vec<u8>>>>,
}

impl MemoryBlobStore {
    /// Create a new empty blob store.
    pub fn new() -> Self {
        Self {
            blobs: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for MemoryBlobStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(&self, bytes: &[u8]) -> Result<ContentPointer, BlobError> {
        let pointer = ContentPointer::from_sha256(&Sha256Hash::hash(bytes));
        self.blobs
            .write()
            .unwrap()
            .insert(pointer.as_str().to_string(), bytes.to_vec());
        Ok(pointer)
    }

    async fn get(&self, pointer: &ContentPointer) -> Result<Vec<u8>, BlobError> {
        // Reject malformed pointers before the lookup
        pointer.to_multihash()?;
        self.blobs
            .read()
            .unwrap()
            .get(pointer.as_str())
            .cloned()
            .ok_or_else(|| BlobError::NotFound(pointer.clone()))
    }
}
