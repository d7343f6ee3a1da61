//! Error types for the bot.

use osulink_core::{DiscordUserId, RegistryError, UserId};
use osulink_perms::PermsError;
use osulink_platform::PlatformError;
use osulink_store::StoreError;
use thiserror::Error;

/// Errors that can occur during bot operations.
#[derive(Debug, Error)]
pub enum BotError {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Storage error.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// Platform error.
    #[error("platform error: {0}")]
    Platform(#[from] PlatformError),

    /// Command registry error.
    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),

    /// Permission error.
    #[error("permission error: {0}")]
    Permission(#[from] PermsError),

    /// Identity linking error.
    #[error("auth error: {0}")]
    Auth(#[from] AuthError),
}

/// Errors from loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Errors from turning an invocation into a permission change.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// The invocation does not have the expected option shape.
    #[error("malformed invocation: {0}")]
    Malformed(String),

    /// The target could not be found in the store.
    #[error("user not found")]
    UserNotFound,

    /// Storage error while resolving the target.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}

/// Errors from the OAuth completion callbacks.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The session refers to a user that no longer exists.
    #[error("session user not found: {0}")]
    SessionUserMissing(UserId),

    /// The Discord account is already linked to another user.
    #[error("discord account {0} is linked to another user")]
    IdentityInUse(DiscordUserId),

    /// The session user is already linked to a different Discord account.
    #[error("user {user} is already linked to discord account {linked}")]
    AlreadyLinked { user: UserId, linked: DiscordUserId },

    /// Storage error.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}

/// Result type for bot operations.
pub type Result<T> = std::result::Result<T, BotError>;
