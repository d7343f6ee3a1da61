//! Error types for the platform module.

use osulink_core::CommandHandle;
use thiserror::Error;

/// Errors that can occur talking to the chat platform.
#[derive(Debug, Error)]
pub enum PlatformError {
    /// Network or connection failure.
    #[error("transport error: {0}")]
    Transport(String),

    /// The platform refused the request.
    #[error("platform rejected request: {0}")]
    Rejected(String),

    /// No command is registered under this handle.
    #[error("unknown command handle: {0}")]
    UnknownHandle(CommandHandle),
}

/// Result type for platform operations.
pub type Result<T> = std::result::Result<T, PlatformError>;
