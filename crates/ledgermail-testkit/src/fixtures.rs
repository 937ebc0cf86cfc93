//! Test fixtures and helpers.
//!
//! Common setup code for integration tests: a shared in-memory world and
//! shortcuts for producing registered sessions in it.

use ledgermail::{ProtectedKey, Session, SessionConfig};
use ledgermail_ledger::{MemoryBlobStore, MemoryLedger};

/// Deterministic passphrase for a test account name.
pub fn passphrase_for(name: &str) -> String {
    format!("{name}-passphrase")
}

/// A shared in-memory ledger and blob store.
///
/// Sessions created from one world see each other's events, so multi-party
/// scenarios need exactly one `TestWorld`.
#[derive(Clone)]
pub struct TestWorld {
    pub ledger: MemoryLedger,
    pub blobs: MemoryBlobStore,
}

impl TestWorld {
    /// Create a fresh empty world.
    pub fn new() -> Self {
        Self {
            ledger: MemoryLedger::new(),
            blobs: MemoryBlobStore::new(),
        }
    }

    /// Create a session with no identity attached.
    pub fn session(&self) -> Session<MemoryLedger, MemoryBlobStore> {
        Session::new(
            self.ledger.clone(),
            self.blobs.clone(),
            SessionConfig::default(),
        )
    }

    /// Create a session and register `name` with [`passphrase_for`]`(name)`.
    pub async fn registered(
        &self,
        name: &str,
    ) -> (Session<MemoryLedger, MemoryBlobStore>, ProtectedKey) {
        let mut session = self.session();
        let (protected, _) = session
            .register_account(name, &passphrase_for(name))
            .await
            .expect("test account registration failed");
        (session, protected)
    }
}

impl Default for TestWorld {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_registered_sessions_share_the_world() {
        let world = TestWorld::new();
        let (alice, _) = world.registered("alice").await;
        let (bob, _) = world.registered("bob").await;

        assert_eq!(alice.name(), Some("alice"));
        assert_eq!(bob.name(), Some("bob"));
        assert_ne!(alice.address(), bob.address());
        assert_eq!(world.ledger.events().len(), 2);
    }
}
