//! User records and their linked platform identities.

use serde::{Deserialize, Serialize};

use crate::types::{CommandEnum, DiscordUserId, OsuUserId, UserId};

/// Discord link of a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscordIntegration {
    pub user_id: DiscordUserId,
    /// `username#discriminator` as last reported by the provider.
    pub username_with_discriminator: Option<String>,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
}

impl DiscordIntegration {
    pub fn new(user_id: DiscordUserId) -> Self {
        Self {
            user_id,
            username_with_discriminator: None,
            access_token: None,
            refresh_token: None,
        }
    }
}

/// osu! link of a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OsuIntegration {
    pub user_id: OsuUserId,
    pub username: Option<String>,
    /// Preferred game mode (`osu`, `taiko`, `fruits`, `mania`).
    pub playmode: Option<String>,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    /// When the link was first verified (Unix ms).
    pub last_verified: Option<i64>,
}

impl OsuIntegration {
    pub fn new(user_id: OsuUserId) -> Self {
        Self {
            user_id,
            username: None,
            playmode: None,
            access_token: None,
            refresh_token: None,
            last_verified: None,
        }
    }
}

/// A user known to the bot.
///
/// Created on first successful login with either provider. The permission
/// list holds the command enums the user may invoke; it never contains
/// duplicates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub discord: Option<DiscordIntegration>,
    pub osu: Option<OsuIntegration>,
    /// Last login (Unix ms).
    pub last_login: Option<i64>,
    permissions: Vec<CommandEnum>,
}

impl User {
    /// Create an empty user with a fresh id.
    pub fn new() -> Self {
        Self::with_id(UserId::generate())
    }

    pub fn with_id(id: UserId) -> Self {
        Self {
            id,
            discord: None,
            osu: None,
            last_login: None,
            permissions: Vec::new(),
        }
    }

    /// Rebuild a user from stored parts, dropping duplicate grants.
    pub fn from_parts(
        id: UserId,
        discord: Option<DiscordIntegration>,
        osu: Option<OsuIntegration>,
        last_login: Option<i64>,
        permissions: Vec<CommandEnum>,
    ) -> Self {
        let mut user = Self {
            id,
            discord,
            osu,
            last_login,
            permissions: Vec::with_capacity(permissions.len()),
        };
        for command_enum in permissions {
            user.add_permission(command_enum);
        }
        user
    }

    /// The user's Discord id, if linked.
    pub fn discord_id(&self) -> Option<&DiscordUserId> {
        self.discord.as_ref().map(|d| &d.user_id)
    }

    /// The user's osu! id, if linked.
    pub fn osu_id(&self) -> Option<OsuUserId> {
        self.osu.as_ref().map(|o| o.user_id)
    }

    /// Granted command enums, in grant order.
    pub fn permissions(&self) -> &[CommandEnum] {
        &self.permissions
    }

    pub fn has_permission(&self, command_enum: &CommandEnum) -> bool {
        self.permissions.contains(command_enum)
    }

    /// Add a grant. Returns `false` if it was already present.
    pub fn add_permission(&mut self, command_enum: CommandEnum) -> bool {
        if self.has_permission(&command_enum) {
            return false;
        }
        self.permissions.push(command_enum);
        true
    }

    /// Remove a grant. Returns `false` if it was not present.
    pub fn remove_permission(&mut self, command_enum: &CommandEnum) -> bool {
        match self.permissions.iter().position(|e| e == command_enum) {
            Some(index) => {
                self.permissions.remove(index);
                true
            }
            None => false,
        }
    }
}

impl Default for User {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_permission_is_unique() {
        let mut user = User::new();
        assert!(user.add_permission("OSU".into()));
        assert!(!user.add_permission("OSU".into()));
        assert_eq!(user.permissions(), &[CommandEnum::from("OSU")]);
    }

    #[test]
    fn test_remove_permission_keeps_order() {
        let mut user = User::new();
        user.add_permission("A".into());
        user.add_permission("B".into());
        user.add_permission("C".into());

        assert!(user.remove_permission(&"B".into()));
        assert!(!user.remove_permission(&"B".into()));
        assert_eq!(
            user.permissions(),
            &[CommandEnum::from("A"), CommandEnum::from("C")]
        );
    }

    #[test]
    fn test_from_parts_drops_duplicates() {
        let user = User::from_parts(
            UserId::from_bytes([1; 12]),
            None,
            None,
            None,
            vec!["PING".into(), "OSU".into(), "PING".into()],
        );
        assert_eq!(user.permissions().len(), 2);
    }

    proptest::proptest! {
        #[test]
        fn test_add_then_remove_restores_grants(
            existing in proptest::collection::vec("[A-Z]{1,8}", 0..8),
            extra in "[A-Z]{1,8}",
        ) {
            let mut user = User::from_parts(
                UserId::from_bytes([9; 12]),
                None,
                None,
                None,
                existing.iter().map(|s| CommandEnum::from(s.as_str())).collect(),
            );
            proptest::prop_assume!(!user.has_permission(&CommandEnum::from(extra.as_str())));
            let before = user.permissions().to_vec();

            proptest::prop_assert!(user.add_permission(extra.as_str().into()));
            proptest::prop_assert!(user.remove_permission(&extra.as_str().into()));
            proptest::prop_assert_eq!(user.permissions(), before.as_slice());
        }
    }

    #[test]
    fn test_identity_accessors() {
        let mut user = User::new();
        assert!(user.discord_id().is_none());
        assert!(user.osu_id().is_none());

        user.discord = Some(DiscordIntegration::new("42".into()));
        user.osu = Some(OsuIntegration::new(OsuUserId(7)));
        assert_eq!(user.discord_id().map(|d| d.as_str()), Some("42"));
        assert_eq!(user.osu_id(), Some(OsuUserId(7)));
    }
}
