//! OAuth completion: linking Discord and osu! accounts to users.
//!
//! The HTTP layer runs the OAuth dance and calls into [`IdentityLinker`] with
//! the provider profile and tokens. The linker creates or updates the user
//! record and persists it.
//!
//! osu! is the primary login: completing it creates the user when needed.
//! Discord is normally linked onto the logged-in session user.

use std::sync::Arc;

use osulink_core::{
    now_millis, DiscordIntegration, DiscordUserId, OsuIntegration, OsuUserId, User, UserId,
};
use osulink_store::{IdentityQuery, UserStore};
use tracing::{debug, info};

use crate::error::AuthError;

/// Profile returned by Discord's `/users/@me`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscordProfile {
    pub id: DiscordUserId,
    pub username: String,
    pub discriminator: String,
}

impl DiscordProfile {
    /// `username#discriminator`.
    pub fn tag(&self) -> String {
        format!("{}#{}", self.username, self.discriminator)
    }
}

/// Profile returned by osu!'s `/me`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OsuProfile {
    pub id: OsuUserId,
    pub username: String,
    pub playmode: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthTokens {
    pub access_token: String,
    pub refresh_token: Option<String>,
}

/// Applies completed OAuth logins to the user store.
pub struct IdentityLinker<S: UserStore> {
    store: Arc<S>,
}

impl<S: UserStore> IdentityLinker<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Complete a Discord login.
    ///
    /// With a session user, Discord is linked onto that user. Without one,
    /// the user owning this Discord id is logged in, or a new user is
    /// created. A Discord id can belong to one user only.
    ///
    /// Only the store is updated; `Bot::complete_discord` also pushes the
    /// user's existing grants to the platform.
    pub async fn complete_discord(
        &self,
        session_user: Option<UserId>,
        profile: &DiscordProfile,
        tokens: OAuthTokens,
    ) -> Result<User, AuthError> {
        let owner = self
            .store
            .find_by_identity(&IdentityQuery::DiscordId(profile.id.clone()))
            .await?;

        let mut user = match session_user {
            Some(id) => {
                let user = self
                    .store
                    .get_user(&id)
                    .await?
                    .ok_or(AuthError::SessionUserMissing(id))?;

                if matches!(&owner, Some(owner) if owner.id != user.id) {
                    return Err(AuthError::IdentityInUse(profile.id.clone()));
                }
                if let Some(linked) = user.discord_id() {
                    if *linked != profile.id {
                        return Err(AuthError::AlreadyLinked {
                            user: user.id,
                            linked: linked.clone(),
                        });
                    }
                }
                user
            }
            None => match owner {
                Some(mut user) => {
                    user.last_login = Some(now_millis());
                    user
                }
                None => {
                    debug!(discord_id = %profile.id, "creating user from discord login");
                    User::new()
                }
            },
        };

        let discord = user
            .discord
            .get_or_insert_with(|| DiscordIntegration::new(profile.id.clone()));
        discord.username_with_discriminator = Some(profile.tag());
        discord.access_token = Some(tokens.access_token);
        discord.refresh_token = tokens.refresh_token;

        self.store.persist(&user).await?;
        info!(user = %user.id, discord_id = %profile.id, "discord linked");
        Ok(user)
    }

    /// Complete an osu! login, creating the user on first login.
    pub async fn complete_osu(
        &self,
        profile: &OsuProfile,
        tokens: OAuthTokens,
    ) -> Result<User, AuthError> {
        let now = now_millis();
        let existing = self
            .store
            .find_by_identity(&IdentityQuery::OsuId(profile.id))
            .await?;

        let mut user = match existing {
            Some(mut user) => {
                user.last_login = Some(now);
                user
            }
            None => {
                let mut user = User::new();
                let mut osu = OsuIntegration::new(profile.id);
                osu.last_verified = Some(now);
                user.osu = Some(osu);
                user
            }
        };

        let osu = user
            .osu
            .get_or_insert_with(|| OsuIntegration::new(profile.id));
        osu.username = Some(profile.username.clone());
        osu.playmode = Some(profile.playmode.clone());
        osu.access_token = Some(tokens.access_token);
        osu.refresh_token = tokens.refresh_token;

        self.store.persist(&user).await?;
        info!(user = %user.id, osu_id = profile.id.0, "osu! login completed");
        Ok(user)
    }
}
