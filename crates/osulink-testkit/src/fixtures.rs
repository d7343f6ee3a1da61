//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use std::sync::Arc;

use osulink::commands::permissions::Action;
use osulink::{Bot, BotConfig};
use osulink_core::{
    CommandEnum, DiscordIntegration, DiscordUserId, Interaction, InteractionOption, OptionKind,
    OsuIntegration, OsuUserId, User,
};
use osulink_platform::MemoryPlatform;
use osulink_store::{MemoryStore, UserStore};

/// Discord id used as the administrator in fixtures.
pub const ADMIN_ID: &str = "100000000000000001";

/// A memory store and platform shared with a bot under test.
pub struct TestFixture {
    pub store: Arc<MemoryStore>,
    pub platform: Arc<MemoryPlatform>,
    pub config: BotConfig,
}

impl TestFixture {
    /// Fixture with [`ADMIN_ID`] as administrator.
    pub fn new() -> Self {
        Self::with_admin(Some(ADMIN_ID))
    }

    pub fn with_admin(admin: Option<&str>) -> Self {
        let mut config = BotConfig::default();
        config.discord.administrator_id = admin.unwrap_or_default().to_string();
        Self {
            store: Arc::new(MemoryStore::new()),
            platform: Arc::new(MemoryPlatform::new()),
            config,
        }
    }

    /// Start a bot over this fixture's store and platform.
    pub async fn start(&self) -> Bot<MemoryStore, MemoryPlatform> {
        match Bot::start(self.config.clone(), self.store.clone(), self.platform.clone()).await {
            Ok(bot) => bot,
            Err(e) => panic!("bot failed to start: {}", e),
        }
    }

    /// Persist a user with both integrations linked.
    pub async fn linked_user(&self, discord_id: &str, osu_id: u64, osu_name: &str) -> User {
        let mut user = User::new();
        user.discord = Some(DiscordIntegration::new(DiscordUserId::new(discord_id)));
        let mut osu = OsuIntegration::new(OsuUserId(osu_id));
        osu.username = Some(osu_name.to_string());
        user.osu = Some(osu);
        self.persist(&user).await;
        user
    }

    /// Persist a user with only an osu! link.
    pub async fn osu_only_user(&self, osu_id: u64, osu_name: &str) -> User {
        let mut user = User::new();
        let mut osu = OsuIntegration::new(OsuUserId(osu_id));
        osu.username = Some(osu_name.to_string());
        user.osu = Some(osu);
        self.persist(&user).await;
        user
    }

    pub async fn persist(&self, user: &User) {
        if let Err(e) = self.store.persist(user).await {
            panic!("persist failed: {}", e);
        }
    }

    /// Reload a user from the store.
    pub async fn reload(&self, user: &User) -> User {
        match self.store.get_user(&user.id).await {
            Ok(Some(user)) => user,
            Ok(None) => panic!("user {} missing from store", user.id),
            Err(e) => panic!("get_user failed: {}", e),
        }
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// `/permissions <add|remove> discord user:<target> commandenum:<enum>`.
pub fn discord_invocation(
    invoker: &str,
    action: Action,
    target: &str,
    command_enum: &str,
) -> Interaction {
    permissions_invocation(
        invoker,
        action,
        "discord",
        vec![
            InteractionOption::user("user", &DiscordUserId::new(target)),
            InteractionOption::string("commandenum", command_enum),
        ],
    )
}

/// `/permissions <add|remove> osu osuresolvable:<target> commandenum:<enum>`.
pub fn osu_invocation(
    invoker: &str,
    action: Action,
    target: &str,
    command_enum: &str,
) -> Interaction {
    permissions_invocation(
        invoker,
        action,
        "osu",
        vec![
            InteractionOption::string("osuresolvable", target),
            InteractionOption::string("commandenum", command_enum),
        ],
    )
}

fn permissions_invocation(
    invoker: &str,
    action: Action,
    subcommand: &str,
    options: Vec<InteractionOption>,
) -> Interaction {
    let group = match action {
        Action::Add => "add",
        Action::Remove => "remove",
    };
    Interaction::new("permissions", DiscordUserId::new(invoker)).with_option(
        InteractionOption::group(
            group,
            OptionKind::SubCommandGroup,
            vec![InteractionOption::group(
                subcommand,
                OptionKind::SubCommand,
                options,
            )],
        ),
    )
}

/// Discord ids currently on the platform's list for `command_enum`.
pub async fn pushed_ids<S: UserStore>(
    bot: &Bot<S, MemoryPlatform>,
    command_enum: &str,
) -> Option<Vec<String>> {
    let descriptor = bot.registry().lookup(&CommandEnum::new(command_enum))?;
    let push = bot.platform().last_push(&descriptor.handle).await?;
    Some(push.user_ids().into_iter().map(String::from).collect())
}
