//! Error types for the permissions module.

use osulink_core::{CommandEnum, UserId};
use osulink_platform::PlatformError;
use osulink_store::StoreError;
use thiserror::Error;

/// Errors that can occur during permission operations.
///
/// The first four variants are expected outcomes of user input and carry a
/// message safe to show to the invoker. Store and platform failures are not;
/// callers log them and report a generic failure.
#[derive(Debug, Error)]
pub enum PermsError {
    /// No registered command has this enum.
    #[error("unknown command: {0}")]
    UnknownCommand(CommandEnum),

    /// Attempted to edit the protected identity's grants.
    #[error("cannot modify the protected identity")]
    ProtectedIdentity,

    /// The user already holds this grant.
    #[error("user {user} already holds {command_enum}")]
    AlreadyGranted {
        user: UserId,
        command_enum: CommandEnum,
    },

    /// The user does not hold this grant.
    #[error("user {user} does not hold {command_enum}")]
    NotGranted {
        user: UserId,
        command_enum: CommandEnum,
    },

    /// Storage error.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Platform error while pushing permissions.
    #[error("platform error: {0}")]
    Platform(#[from] PlatformError),
}

/// Discriminant of a [`PermsError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PermsErrorKind {
    UnknownCommand,
    ProtectedIdentity,
    AlreadyGranted,
    NotGranted,
    Store,
    Platform,
}

impl PermsError {
    pub fn kind(&self) -> PermsErrorKind {
        match self {
            PermsError::UnknownCommand(_) => PermsErrorKind::UnknownCommand,
            PermsError::ProtectedIdentity => PermsErrorKind::ProtectedIdentity,
            PermsError::AlreadyGranted { .. } => PermsErrorKind::AlreadyGranted,
            PermsError::NotGranted { .. } => PermsErrorKind::NotGranted,
            PermsError::Store(_) => PermsErrorKind::Store,
            PermsError::Platform(_) => PermsErrorKind::Platform,
        }
    }

    /// Text to show the invoker, or `None` if the error must not be shown.
    pub fn user_message(&self) -> Option<&'static str> {
        match self {
            PermsError::UnknownCommand(_) => Some("There is no command with this enum."),
            PermsError::ProtectedIdentity => Some("You cannot modify Administrator's perms."),
            PermsError::AlreadyGranted { .. } => Some("User already has access to this command."),
            PermsError::NotGranted { .. } => Some("User already cannot access to this command."),
            PermsError::Store(_) | PermsError::Platform(_) => None,
        }
    }

    /// Whether this is an expected rejection rather than an infrastructure failure.
    pub fn is_rejection(&self) -> bool {
        self.user_message().is_some()
    }
}

/// Result type for permission operations.
pub type Result<T> = std::result::Result<T, PermsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infrastructure_errors_have_no_user_message() {
        let err = PermsError::from(PlatformError::Transport("reset".into()));
        assert_eq!(err.kind(), PermsErrorKind::Platform);
        assert!(err.user_message().is_none());
        assert!(!err.is_rejection());
    }

    #[test]
    fn test_rejections_have_user_message() {
        let err = PermsError::UnknownCommand("NOPE".into());
        assert_eq!(err.kind(), PermsErrorKind::UnknownCommand);
        assert_eq!(err.user_message(), Some("There is no command with this enum."));
        assert!(PermsError::ProtectedIdentity.is_rejection());
    }
}
