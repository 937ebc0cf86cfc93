//! # Ledgermail Testkit
//!
//! Testing utilities for ledgermail.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Fixtures**: a shared in-memory world ([`TestWorld`]) for multi-party
//!   integration scenarios
//! - **Generators**: proptest strategies for the core types
//!
//! ## Test Fixtures
//!
//! Quickly set up a multi-party scenario:
//!
//! ```rust,ignore
//! use ledgermail_testkit::TestWorld;
//!
//! let world = TestWorld::new();
//! let (mut alice, _) = world.registered("alice").await;
//! let (mut bob, _) = world.registered("bob").await;
//!
//! let (channel, _) = alice.register_channel(&["bob"]).await?;
//! ```
//!
//! ## Property Testing
//!
//! Use the generators with proptest:
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use ledgermail_testkit::generators::symmetric_key;
//!
//! proptest! {
//!     #[test]
//!     fn channel_id_is_deterministic(key in symmetric_key()) {
//!         prop_assert_eq!(key.channel_id(), key.channel_id());
//!     }
//! }
//! ```

pub mod fixtures;
pub mod generators;

pub use fixtures::{passphrase_for, TestWorld};
