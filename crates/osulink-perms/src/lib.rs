//! # osulink Permissions
//!
//! Keeps the chat platform's per-command access lists in step with the
//! grants recorded in the user store.
//!
//! ## Overview
//!
//! Grants are stored on users. The platform holds, for every command that
//! needs explicit permission, the list of users allowed to run it. The
//! [`PermissionSynchronizer`] mutates grants and then *reconciles*: it
//! recomputes the full allowed list from the store and pushes it, replacing
//! whatever the platform had.
//!
//! ## Key Concepts
//!
//! - **Grant / Revoke**: add or remove one command enum on one user, then reconcile
//! - **Reconcile**: recompute the authorized set from the store and full-replace push it
//! - **Protected identity**: the configured administrator; never editable and
//!   always included in every push
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use osulink_core::{CommandRegistry, User};
//! use osulink_perms::PermissionSynchronizer;
//! use osulink_platform::MemoryPlatform;
//! use osulink_store::MemoryStore;
//!
//! async fn example(registry: CommandRegistry, mut user: User) {
//!     let sync = PermissionSynchronizer::new(
//!         Arc::new(MemoryStore::new()),
//!         Arc::new(registry),
//!         Arc::new(MemoryPlatform::new()),
//!         Some("1".into()),
//!     );
//!
//!     sync.grant(&"PING".into(), &mut user).await.unwrap();
//!     sync.revoke(&"PING".into(), &mut user).await.unwrap();
//! }
//! ```

pub mod error;
pub mod synchronizer;

pub use error::{PermsError, PermsErrorKind, Result};
pub use synchronizer::{PermissionSynchronizer, ReconcileReport};
