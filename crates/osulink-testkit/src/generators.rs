//! Proptest generators for property-based testing.

use proptest::prelude::*;

use osulink_core::{
    CommandEnum, DiscordIntegration, DiscordUserId, OsuIntegration, OsuUserId, User, UserId,
};

/// Command enums the generators draw grants from.
pub const GRANTABLE: [&str; 3] = ["PING", "OSU_ADMIN", "STATS"];

/// Generate a random UserId.
pub fn user_id() -> impl Strategy<Value = UserId> {
    any::<[u8; 12]>().prop_map(UserId::from_bytes)
}

/// Generate a Discord snowflake. Small range so collisions with the
/// administrator id happen often.
pub fn discord_user_id() -> impl Strategy<Value = DiscordUserId> {
    (1u64..=8).prop_map(|n| DiscordUserId::new(n.to_string()))
}

/// Generate one of the [`GRANTABLE`] enums.
pub fn command_enum() -> impl Strategy<Value = CommandEnum> {
    prop::sample::select(GRANTABLE.to_vec()).prop_map(CommandEnum::new)
}

/// Generate a grant list, possibly with repeats.
pub fn grants() -> impl Strategy<Value = Vec<CommandEnum>> {
    prop::collection::vec(command_enum(), 0..=GRANTABLE.len() * 2)
}

/// Parameters for generating a user.
#[derive(Debug, Clone)]
pub struct UserParams {
    pub id: UserId,
    pub discord: Option<DiscordUserId>,
    pub osu: Option<u64>,
    pub grants: Vec<CommandEnum>,
}

impl Arbitrary for UserParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (
            user_id(),
            proptest::option::weighted(0.8, discord_user_id()),
            proptest::option::of(1u64..=50_000_000),
            grants(),
        )
            .prop_map(|(id, discord, osu, grants)| UserParams {
                id,
                discord,
                osu,
                grants,
            })
            .boxed()
    }
}

/// Build a user from parameters. Repeated grants collapse.
pub fn user_from_params(params: &UserParams) -> User {
    let mut user = User::with_id(params.id);
    user.discord = params.discord.clone().map(DiscordIntegration::new);
    user.osu = params.osu.map(|id| OsuIntegration::new(OsuUserId(id)));
    for grant in &params.grants {
        user.add_permission(grant.clone());
    }
    user
}

/// Generate a population of users with distinct Discord and osu! ids.
pub fn population(max: usize) -> impl Strategy<Value = Vec<User>> {
    prop::collection::vec(any::<UserParams>(), 0..=max).prop_map(|params| {
        let mut seen_discord = std::collections::HashSet::new();
        let mut seen_osu = std::collections::HashSet::new();
        params
            .iter()
            .map(user_from_params)
            .map(|mut user| {
                if let Some(id) = user.discord_id().cloned() {
                    if !seen_discord.insert(id) {
                        user.discord = None;
                    }
                }
                if let Some(id) = user.osu_id() {
                    if !seen_osu.insert(id) {
                        user.osu = None;
                    }
                }
                user
            })
            .collect()
    })
}
