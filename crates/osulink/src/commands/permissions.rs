//! `/permissions add|remove osu|discord`: grant or revoke a command for a user.
//!
//! The invocation arrives as a nested option tree:
//!
//! ```text
//! permissions
//! └── add | remove            (SUB_COMMAND_GROUP)
//!     ├── osu                 (SUB_COMMAND)
//!     │   ├── osuresolvable   osu! id or username
//!     │   └── commandenum
//!     └── discord             (SUB_COMMAND)
//!         ├── user            Discord user
//!         └── commandenum
//! ```
//!
//! [`parse_intent`] locates each option by name and produces a
//! [`PermissionIntent`]; [`handle`] resolves the target and hands the change
//! to the [`PermissionSynchronizer`]. Every outcome becomes a text reply.

use osulink_core::{
    CommandChoice, CommandDefinition, CommandEnum, CommandOption, CommandRegistry, DiscordUserId,
    Interaction, OptionKind, OsuUserId, User,
};
use osulink_perms::{PermissionSynchronizer, PermsError};
use osulink_platform::CommandPlatform;
use osulink_store::{IdentityQuery, UserStore};
use tracing::{error, info, warn};

use super::CommandReply;
use crate::error::AdapterError;

pub const COMMAND_ENUM: &str = "PERMISSIONS";

pub const SUCCESS: &str = "Successfully updated the user permissions.";
pub const USER_NOT_FOUND: &str = "Cannot find the user in database.";
pub const UNRECOGNIZED_OPTION: &str = "Unrecognized option.";
pub const GENERIC_FAILURE: &str = "Something went wrong while updating the permissions.";

/// Grant or revoke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Add,
    Remove,
}

/// Who the change applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// A Discord user picked from the user selector.
    PlatformUser(DiscordUserId),
    /// Free text naming an osu! account: a numeric id or a username.
    External(String),
}

impl Target {
    /// Store query for this target. Numeric text is treated as an osu! id.
    pub fn query(&self) -> IdentityQuery {
        match self {
            Target::PlatformUser(id) => IdentityQuery::DiscordId(id.clone()),
            Target::External(text) => match text.trim().parse::<u64>() {
                Ok(id) => IdentityQuery::OsuId(OsuUserId(id)),
                Err(_) => IdentityQuery::OsuUsername(text.clone()),
            },
        }
    }
}

/// A parsed `/permissions` invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionIntent {
    pub action: Action,
    pub target: Target,
    pub command_enum: CommandEnum,
}

/// Platform definition of `/permissions`.
///
/// Choices for `commandenum` are taken from `registry` at call time, so this
/// must be built after every permissioned command is registered.
pub fn definition(registry: &CommandRegistry) -> CommandDefinition {
    let choices = registry.list_permissioned_enums();

    CommandDefinition::new("permissions", "Manage who can use the bot's commands")
        .default_permission(false)
        .option(action_group("add", "Give a user access to a command", &choices))
        .option(action_group(
            "remove",
            "Take away a user's access to a command",
            &choices,
        ))
}

fn action_group(name: &str, description: &str, choices: &[CommandChoice]) -> CommandOption {
    let command_enum = || {
        CommandOption::new("commandenum", "The command", OptionKind::String)
            .required()
            .choices(choices.to_vec())
    };

    CommandOption::new(name, description, OptionKind::SubCommandGroup)
        .option(
            CommandOption::new("osu", "Target an osu! account", OptionKind::SubCommand)
                .option(
                    CommandOption::new(
                        "osuresolvable",
                        "osu! username or id",
                        OptionKind::String,
                    )
                    .required(),
                )
                .option(command_enum()),
        )
        .option(
            CommandOption::new("discord", "Target a Discord user", OptionKind::SubCommand)
                .option(CommandOption::new("user", "Discord user", OptionKind::User).required())
                .option(command_enum()),
        )
}

/// Extract the intent from an invocation.
pub fn parse_intent(interaction: &Interaction) -> Result<PermissionIntent, AdapterError> {
    let group = interaction
        .selected()
        .ok_or_else(|| AdapterError::Malformed("missing add/remove group".into()))?;

    let action = match group.name.as_str() {
        "add" => Action::Add,
        "remove" => Action::Remove,
        other => return Err(AdapterError::Malformed(format!("unknown group {:?}", other))),
    };

    let sub = group
        .selected()
        .ok_or_else(|| AdapterError::Malformed("missing osu/discord subcommand".into()))?;

    let required = |name: &str| {
        sub.option(name)
            .and_then(|o| o.text())
            .ok_or_else(|| AdapterError::Malformed(format!("missing option {:?}", name)))
    };

    let target = match sub.name.as_str() {
        "osu" => Target::External(required("osuresolvable")?),
        "discord" => Target::PlatformUser(DiscordUserId::new(required("user")?)),
        other => {
            return Err(AdapterError::Malformed(format!(
                "unknown subcommand {:?}",
                other
            )))
        }
    };

    let command_enum = CommandEnum::parse(&required("commandenum")?)
        .map_err(|e| AdapterError::Malformed(e.to_string()))?;

    Ok(PermissionIntent {
        action,
        target,
        command_enum,
    })
}

/// Load the user a target refers to.
pub async fn resolve_target<S: UserStore>(store: &S, target: &Target) -> Result<User, AdapterError> {
    store
        .find_by_identity(&target.query())
        .await?
        .ok_or(AdapterError::UserNotFound)
}

/// Apply an intent. Returns the synchronizer's outcome unchanged.
pub async fn apply<S: UserStore, P: CommandPlatform>(
    sync: &PermissionSynchronizer<S, P>,
    intent: &PermissionIntent,
    user: &mut User,
) -> Result<(), PermsError> {
    match intent.action {
        Action::Add => sync.grant(&intent.command_enum, user).await?,
        Action::Remove => sync.revoke(&intent.command_enum, user).await?,
    };
    Ok(())
}

/// Handle a `/permissions` invocation end to end.
pub async fn handle<S: UserStore, P: CommandPlatform>(
    sync: &PermissionSynchronizer<S, P>,
    interaction: &Interaction,
) -> CommandReply {
    let intent = match parse_intent(interaction) {
        Ok(intent) => intent,
        Err(e) => {
            warn!(invoker = %interaction.invoker, error = %e, "unrecognized permissions invocation");
            return CommandReply::new(UNRECOGNIZED_OPTION);
        }
    };

    let mut user = match resolve_target(sync.store(), &intent.target).await {
        Ok(user) => user,
        Err(AdapterError::UserNotFound) => return CommandReply::new(USER_NOT_FOUND),
        Err(e) => {
            error!(query = ?intent.target.query(), error = %e, "failed to resolve permissions target");
            return CommandReply::new(GENERIC_FAILURE);
        }
    };

    match apply(sync, &intent, &mut user).await {
        Ok(()) => {
            info!(
                invoker = %interaction.invoker,
                user = %user.id,
                command_enum = %intent.command_enum,
                action = ?intent.action,
                "permissions updated"
            );
            CommandReply::new(SUCCESS)
        }
        Err(e) => match e.user_message() {
            Some(message) => CommandReply::new(message),
            None => {
                error!(
                    user = %user.id,
                    command_enum = %intent.command_enum,
                    error = %e,
                    "permission update failed"
                );
                CommandReply::new(GENERIC_FAILURE)
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use osulink_core::InteractionOption;

    fn invocation(group: &str, sub: &str, options: Vec<InteractionOption>) -> Interaction {
        Interaction::new("permissions", "1".into()).with_option(InteractionOption::group(
            group,
            OptionKind::SubCommandGroup,
            vec![InteractionOption::group(sub, OptionKind::SubCommand, options)],
        ))
    }

    #[test]
    fn test_parse_discord_target() {
        let target = DiscordUserId::new("42");
        let intent = parse_intent(&invocation(
            "add",
            "discord",
            vec![
                InteractionOption::user("user", &target),
                InteractionOption::string("commandenum", "PING"),
            ],
        ))
        .unwrap();

        assert_eq!(intent.action, Action::Add);
        assert_eq!(intent.target, Target::PlatformUser(target));
        assert_eq!(intent.command_enum, CommandEnum::new("PING"));
    }

    #[test]
    fn test_parse_ignores_option_order() {
        let intent = parse_intent(&invocation(
            "remove",
            "osu",
            vec![
                InteractionOption::string("commandenum", "OSU"),
                InteractionOption::string("osuresolvable", "peppy"),
            ],
        ))
        .unwrap();

        assert_eq!(intent.action, Action::Remove);
        assert_eq!(intent.target, Target::External("peppy".into()));
    }

    #[test]
    fn test_parse_malformed() {
        let missing_enum = invocation(
            "add",
            "osu",
            vec![InteractionOption::string("osuresolvable", "2")],
        );
        assert!(matches!(
            parse_intent(&missing_enum),
            Err(AdapterError::Malformed(_))
        ));

        let bad_group = invocation(
            "toggle",
            "osu",
            vec![
                InteractionOption::string("osuresolvable", "2"),
                InteractionOption::string("commandenum", "PING"),
            ],
        );
        assert!(matches!(parse_intent(&bad_group), Err(AdapterError::Malformed(_))));

        let empty = Interaction::new("permissions", "1".into());
        assert!(matches!(parse_intent(&empty), Err(AdapterError::Malformed(_))));
    }

    #[test]
    fn test_external_target_query() {
        assert_eq!(
            Target::External(" 124493 ".into()).query(),
            IdentityQuery::OsuId(OsuUserId(124493))
        );
        assert_eq!(
            Target::External("cookiezi".into()).query(),
            IdentityQuery::OsuUsername("cookiezi".into())
        );
        assert_eq!(
            Target::External("123abc".into()).query(),
            IdentityQuery::OsuUsername("123abc".into())
        );
    }

    #[test]
    fn test_definition_shape() {
        let registry = CommandRegistry::new();
        let definition = definition(&registry);

        assert!(!definition.default_permission);
        let names: Vec<_> = definition.options.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, vec!["add", "remove"]);

        for group in &definition.options {
            assert_eq!(group.kind, OptionKind::SubCommandGroup);
            let subs: Vec<_> = group.options.iter().map(|o| o.name.as_str()).collect();
            assert_eq!(subs, vec!["osu", "discord"]);
            for sub in &group.options {
                assert!(sub.options.iter().all(|o| o.required));
                assert!(sub.options.iter().any(|o| o.name == "commandenum"));
            }
        }
    }
}
