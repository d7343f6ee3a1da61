//! # osulink
//!
//! Backend of a Discord bot that links Discord accounts to osu! accounts and
//! controls who may use each bot command.
//!
//! ## Overview
//!
//! - **Commands**: a built-in catalog (`PING`, `OSU`, `PERMISSIONS`) is
//!   registered with the chat platform at startup
//! - **Permissions**: grants live on users in the store; the platform's
//!   per-command access lists are recomputed from the store and pushed whole
//! - **Identity linking**: OAuth completions for osu! and Discord create and
//!   update users
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use osulink::{Bot, BotConfig};
//! use osulink::core::Interaction;
//! use osulink::platform::MemoryPlatform;
//! use osulink::store::MemoryStore;
//!
//! async fn example() {
//!     osulink::init_tracing();
//!
//!     let mut config = BotConfig::default();
//!     config.discord.administrator_id = "1".into();
//!
//!     let bot = Bot::start(
//!         config,
//!         Arc::new(MemoryStore::new()),
//!         Arc::new(MemoryPlatform::new()),
//!     )
//!     .await
//!     .unwrap();
//!
//!     let reply = bot
//!         .handle_interaction(&Interaction::new("ping", "1".into()))
//!         .await;
//!     assert_eq!(reply.unwrap().content, "Pong!");
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `osulink::core` - Ids, users, command definitions, registry
//! - `osulink::store` - User storage and SQLite
//! - `osulink::platform` - Chat platform interface
//! - `osulink::perms` - Permission synchronizer

pub mod auth;
pub mod bot;
pub mod commands;
pub mod config;
pub mod error;

// Re-export component crates
pub use osulink_core as core;
pub use osulink_perms as perms;
pub use osulink_platform as platform;
pub use osulink_store as store;

pub use auth::{DiscordProfile, IdentityLinker, OAuthTokens, OsuProfile};
pub use bot::Bot;
pub use commands::permissions::{Action, PermissionIntent, Target};
pub use commands::{BuiltinCommand, CommandReply};
pub use config::BotConfig;
pub use error::{AdapterError, AuthError, BotError, ConfigError, Result};

/// Install a `tracing` subscriber that reads its filter from `RUST_LOG`,
/// defaulting to `info`. Does nothing if one is already installed.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
