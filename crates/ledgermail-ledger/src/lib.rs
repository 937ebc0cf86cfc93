//! # ledgermail ledger
//!
//! The two external seams of the protocol: the append-only public event log
//! ([`LedgerClient`]) and the content-addressed blob store ([`BlobStore`]).
//!
//! The traits keep the protocol transport-agnostic. The in-memory
//! implementations enforce the same uniqueness and ownership invariants a
//! production ledger contract would, so every rejection path is exercised
//! in tests.

pub mod error;
pub mod events;
pub mod memory;
pub mod traits;

pub use error::{BlobError, ConflictKind, DenialKind, LedgerError, Result};
pub use events::{
    AccountRecord, ChannelRecord, DocumentRecord, EventKind, LedgerEvent, Submission,
};
pub use memory::{MemoryBlobStore, MemoryLedger};
pub use traits::{BlobStore, LedgerClient, TxHandle, TxReceipt};
