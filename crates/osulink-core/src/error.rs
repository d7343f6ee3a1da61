//! Error types for osulink core.

use thiserror::Error;

use crate::types::CommandEnum;

/// Errors from parsing or validating core values.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid user id: {0}")]
    InvalidUserId(String),

    #[error("invalid option kind: {0}")]
    InvalidOptionKind(u8),

    #[error("empty command enum")]
    EmptyCommandEnum,
}

/// Errors from the command registry.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// A descriptor with this enum is already registered.
    #[error("command already registered: {0}")]
    DuplicateCommand(CommandEnum),
}
