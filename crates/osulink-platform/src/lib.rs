//! # osulink Platform
//!
//! Interface to the chat platform that hosts the bot's commands.
//!
//! ## Overview
//!
//! The platform owns two things the bot cares about: the registered commands
//! (each gets an opaque [`CommandHandle`](osulink_core::CommandHandle)) and,
//! per command, the list of users allowed to invoke it. This crate models
//! both behind the [`CommandPlatform`] trait.
//!
//! ## Key Properties
//!
//! - **Full replace**: `set_permissions` replaces a command's entire list.
//!   There is no incremental add/remove.
//! - **Idempotent**: pushing the same list twice leaves the platform unchanged.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use osulink_core::{CommandDefinition, DiscordUserId};
//! use osulink_platform::{CommandPlatform, MemoryPlatform, PermissionEntry};
//!
//! async fn example() {
//!     let platform = MemoryPlatform::new();
//!     let definition = CommandDefinition::new("ping", "Ping!").default_permission(false);
//!     let handle = platform.register_command(&definition).await.unwrap();
//!
//!     let admin = DiscordUserId::new("1");
//!     platform
//!         .set_permissions(&handle, vec![PermissionEntry::user(&admin)])
//!         .await
//!         .unwrap();
//! }
//! ```

pub mod error;
pub mod messages;
pub mod platform;

pub use error::{PlatformError, Result};
pub use messages::{AclPush, PermissionEntry, PermissionKind};
pub use platform::{memory::MemoryPlatform, CommandPlatform};
