//! The abstract ledger and blob-store interfaces.
//!
//! These traits keep the protocol agnostic to how the log and the blobs are
//! actually reached. Implementations include the in-memory pair (tests) and
//! whatever transport a deployment wires in.

use async_trait::async_trait;

use ledgermail_core::{Address, ContentPointer, Topic};

use crate::error::{BlobError, Result};
use crate::events::{EventKind, LedgerEvent, Submission};

/// Opaque handle for a submitted, not-yet-confirmed transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TxHandle(pub [u8; 32]);

/// Confirmation receipt for a submitted transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxReceipt {
    /// The handle this receipt confirms.
    pub handle: TxHandle,
    /// Position of the emitted event in the log.
    pub position: u64,
}

/// The append-only public event log.
///
/// # Design Notes
///
/// - **Invariant enforcement**: the ledger, not the client, enforces name,
///   address, and channel uniqueness plus channel ownership. Rejections
///   surface as [`LedgerError`](crate::error::LedgerError) verbatim.
/// - **Confirmation**: `submit` returns immediately with a handle;
///   `wait_for_confirmation` blocks until the event is final. No internal
///   retries; duplicate submissions are safely rejected, not duplicated.
/// - **Ordering**: `query_events` returns events in strictly increasing
///   position order.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Submit a transaction from the given address.
    async fn submit(&self, submission: &Submission, from: &Address) -> Result<TxHandle>;

    /// Block until the transaction is confirmed.
    async fn wait_for_confirmation(&self, handle: &TxHandle) -> Result<TxReceipt>;

    /// Query events of one kind in `[from_position, to_position]`,
    /// optionally filtered to those carrying `topic`.
    ///
    /// `to_position = None` means "latest".
    async fn query_events(
        &self,
        kind: EventKind,
        from_position: u64,
        to_position: Option<u64>,
        topic: Option<Topic>,
    ) -> Result<Vec<LedgerEvent>>;
}

/// Content-addressed blob storage.
///
/// Pointers are base58 multihash text; `put` is idempotent because the
/// pointer is a function of the bytes.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store bytes, returning their content pointer.
    async fn put(&self, bytes: &[u8]) -> Result<ContentPointer, BlobError>;

    /// Fetch the bytes behind a pointer.
    async fn get(&self, pointer: &ContentPointer) -> Result<Vec<u8>, BlobError>;
}
