//! Strong type definitions for osulink.
//!
//! Identifiers from different platforms are newtypes so a Discord id can
//! never be passed where an osu! id or an internal record id is expected.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::CoreError;

/// Internal identifier of a user record.
///
/// 12 random bytes, rendered as 24 hex characters.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub [u8; 12]);

impl UserId {
    /// Create a new UserId from raw bytes.
    pub const fn from_bytes(bytes: [u8; 12]) -> Self {
        Self(bytes)
    }

    /// Generate a random UserId.
    pub fn generate() -> Self {
        use rand::Rng;
        Self(rand::thread_rng().gen())
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 12] {
        &self.0
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from hex string.
    pub fn from_hex(s: &str) -> Result<Self, CoreError> {
        let bytes = hex::decode(s).map_err(|_| CoreError::InvalidUserId(s.to_string()))?;
        let arr: [u8; 12] = bytes
            .try_into()
            .map_err(|_| CoreError::InvalidUserId(s.to_string()))?;
        Ok(Self(arr))
    }
}

impl fmt::Debug for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UserId({})", self.to_hex())
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// A Discord user snowflake, kept as the string the platform sends.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DiscordUserId(pub String);

impl DiscordUserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DiscordUserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DiscordUserId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A numeric osu! user id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OsuUserId(pub u64);

impl fmt::Display for OsuUserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stable identifier of a registered command, independent of its display name.
///
/// Examples: `"PING"`, `"OSU"`, `"PERMISSIONS"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommandEnum(String);

impl CommandEnum {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Parse a user-supplied enum, rejecting blank input.
    pub fn parse(value: &str) -> Result<Self, CoreError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(CoreError::EmptyCommandEnum);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CommandEnum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CommandEnum {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Opaque platform-side handle of a registered command.
///
/// Assigned by the chat platform at registration and used to address the
/// command's access-control list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommandHandle(pub String);

impl CommandHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CommandHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id_hex_roundtrip() {
        let id = UserId::from_bytes([0x42; 12]);
        let hex = id.to_hex();
        assert_eq!(hex.len(), 24);
        assert_eq!(UserId::from_hex(&hex).unwrap(), id);
    }

    #[test]
    fn test_user_id_rejects_wrong_length() {
        assert!(UserId::from_hex("abcd").is_err());
        assert!(UserId::from_hex("not hex at all").is_err());
    }

    #[test]
    fn test_generated_ids_differ() {
        assert_ne!(UserId::generate(), UserId::generate());
    }

    #[test]
    fn test_command_enum_parse() {
        assert_eq!(CommandEnum::parse(" OSU ").unwrap().as_str(), "OSU");
        assert!(matches!(
            CommandEnum::parse("   "),
            Err(CoreError::EmptyCommandEnum)
        ));
    }

    #[test]
    fn test_discord_id_serializes_as_string() {
        let id = DiscordUserId::new("123456789012345678");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"123456789012345678\"");
    }
}
