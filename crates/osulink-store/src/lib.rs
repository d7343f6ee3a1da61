//! # osulink Store
//!
//! Storage abstraction for user records. Provides a trait-based interface
//! with SQLite and in-memory implementations.
//!
//! ## Key Types
//!
//! - [`UserStore`] - The async trait for all storage operations
//! - [`SqliteStore`] - SQLite-based persistent storage
//! - [`MemoryStore`] - In-memory storage for tests
//! - [`IdentityQuery`] - Lookup key for a user by platform identity
//!
//! ## Usage
//!
//! ```rust,no_run
//! use osulink_store::{IdentityQuery, SqliteStore, UserStore};
//! use osulink_core::User;
//!
//! async fn example() {
//!     let store = SqliteStore::open("osulink.db").unwrap();
//!
//!     let mut user = User::new();
//!     user.add_permission("PING".into());
//!     store.persist(&user).await.unwrap();
//!
//!     let holders = store.find_by_grant(&"PING".into()).await.unwrap();
//!     assert_eq!(holders.len(), 1);
//!
//!     let found = store
//!         .find_by_identity(&IdentityQuery::OsuUsername("peppy".into()))
//!         .await
//!         .unwrap();
//!     assert!(found.is_none());
//! }
//! ```
//!
//! ## Design Notes
//!
//! - **Atomic per user**: `persist` writes the user row and its grant rows in
//!   one transaction; readers never see a half-written grant list.
//! - **Insertion order**: `find_by_grant` returns users in the order they were
//!   first persisted.

pub mod error;
pub mod memory;
pub mod migration;
pub mod sqlite;
pub mod traits;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::{IdentityQuery, UserStore};
