//! # osulink Core
//!
//! Pure types for osulink: users and their linked identities, command
//! descriptors, the command registry and the interaction model.
//!
//! This crate contains no I/O, no storage, no networking.
//!
//! ## Key Types
//!
//! - [`User`] - A person known to the bot, with optional Discord and osu! links
//! - [`CommandEnum`] - Stable identifier of a registered command
//! - [`CommandDescriptor`] - A registered command and its platform handle
//! - [`CommandRegistry`] - Catalog of registered commands, keyed by enum
//! - [`Interaction`] - An inbound command invocation with nested options
//!
//! ## Permission grants
//!
//! A grant is a [`CommandEnum`] stored on the [`User`]. Grants are unique per
//! user; [`User::add_permission`] and [`User::remove_permission`] preserve that.

pub mod command;
pub mod error;
pub mod interaction;
pub mod registry;
pub mod types;
pub mod user;

pub use command::{
    CommandChoice, CommandDefinition, CommandDescriptor, CommandOption, OptionKind,
};
pub use error::{CoreError, RegistryError};
pub use interaction::{Interaction, InteractionOption, OptionValue};
pub use registry::CommandRegistry;
pub use types::{CommandEnum, CommandHandle, DiscordUserId, OsuUserId, UserId};
pub use user::{DiscordIntegration, OsuIntegration, User};

/// Get current time in milliseconds.
pub fn now_millis() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}
