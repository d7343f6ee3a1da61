//! UserStore trait: the abstract interface for user persistence.

use async_trait::async_trait;
use osulink_core::{CommandEnum, DiscordUserId, OsuUserId, User, UserId};

use crate::error::Result;

/// How to find a user by one of their linked identities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityQuery {
    /// Chat-platform (Discord) id.
    DiscordId(DiscordUserId),
    /// Stats-platform (osu!) numeric id.
    OsuId(OsuUserId),
    /// Stats-platform (osu!) username, exact match.
    OsuUsername(String),
}

/// Async interface for user persistence.
///
/// All methods are async to support both sync (SQLite) and async backends.
/// For SQLite, we use `spawn_blocking` internally to avoid blocking the runtime.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Get a user by internal id.
    async fn get_user(&self, id: &UserId) -> Result<Option<User>>;

    /// All users holding a grant for `command_enum`, in insertion order.
    async fn find_by_grant(&self, command_enum: &CommandEnum) -> Result<Vec<User>>;

    /// Find a user by a linked identity.
    async fn find_by_identity(&self, query: &IdentityQuery) -> Result<Option<User>>;

    /// Insert or replace a user record, including its grant list.
    ///
    /// Atomic per user: concurrent readers see either the old or the new
    /// record, never a mix.
    async fn persist(&self, user: &User) -> Result<()>;

    /// Number of stored users.
    async fn count_users(&self) -> Result<usize>;
}

#[async_trait]
impl<S: UserStore + ?Sized> UserStore for std::sync::Arc<S> {
    async fn get_user(&self, id: &UserId) -> Result<Option<User>> {
        (**self).get_user(id).await
    }

    async fn find_by_grant(&self, command_enum: &CommandEnum) -> Result<Vec<User>> {
        (**self).find_by_grant(command_enum).await
    }

    async fn find_by_identity(&self, query: &IdentityQuery) -> Result<Option<User>> {
        (**self).find_by_identity(query).await
    }

    async fn persist(&self, user: &User) -> Result<()> {
        (**self).persist(user).await
    }

    async fn count_users(&self) -> Result<usize> {
        (**self).count_users().await
    }
}

impl IdentityQuery {
    /// Whether `user` matches this query.
    pub fn matches(&self, user: &User) -> bool {
        match self {
            IdentityQuery::DiscordId(id) => user.discord_id() == Some(id),
            IdentityQuery::OsuId(id) => user.osu_id() == Some(*id),
            IdentityQuery::OsuUsername(name) => user
                .osu
                .as_ref()
                .and_then(|o| o.username.as_deref())
                .is_some_and(|n| n == name),
        }
    }
}
