//! Encrypted channel protocol over a public ledger and a content-addressed
//! blob store.
//!
//! A [`Session`] ties one identity to a [`LedgerClient`] and a [`BlobStore`]
//! and drives the whole protocol: account registration, channel
//! establishment via multi-recipient key wrapping, and document exchange
//! under a per-channel symmetric key. All shared state lives in the public
//! log; a session recovers what it can read by folding over it.
//!
//! ```no_run
//! use ledgermail::{Session, SessionConfig};
//! use ledgermail_ledger::{MemoryBlobStore, MemoryLedger};
//!
//! # async fn demo() -> Result<(), ledgermail::ProtocolError> {
//! let ledger = MemoryLedger::new();
//! let blobs = MemoryBlobStore::new();
//!
//! let mut alice = Session::new(ledger.clone(), blobs.clone(), SessionConfig::default());
//! let (key, _) = alice.register_account("alice", "hunter2").await?;
//!
//! let (channel, _) = alice.register_channel(&["bob"]).await?;
//! alice.send_document(channel, b"hello bob").await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod session;

pub use config::{BlobGateway, RegistryAddresses, SessionConfig};
pub use error::{ProtocolError, Result};
pub use session::{ChannelHandle, Document, Session};

pub use ledgermail_core::{Address, ChannelId, ContentPointer, Multihash, NameHash};
pub use ledgermail_crypto::{IdentityPublicKey, ProtectedKey, SymmetricKey};
pub use ledgermail_ledger::{BlobStore, LedgerClient};
