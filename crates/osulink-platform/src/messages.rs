//! Wire types for command permission updates.

use serde::{Deserialize, Serialize};

use osulink_core::{CommandHandle, DiscordUserId};

/// What an entry's id refers to. Only user entries are ever pushed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PermissionKind {
    User,
}

/// One entry of a command's access-control list.
///
/// Serializes as `{"id": "...", "type": "USER", "permission": true}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PermissionEntry {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: PermissionKind,
    pub permission: bool,
}

impl PermissionEntry {
    /// Allow a single user.
    pub fn user(id: &DiscordUserId) -> Self {
        Self {
            id: id.as_str().to_string(),
            kind: PermissionKind::User,
            permission: true,
        }
    }
}

/// A recorded full-replace push, as seen by the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AclPush {
    pub handle: CommandHandle,
    pub entries: Vec<PermissionEntry>,
}

impl AclPush {
    /// Ids of the allowed users, in push order.
    pub fn user_ids(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|e| e.permission)
            .map(|e| e.id.as_str())
            .collect()
    }
}
