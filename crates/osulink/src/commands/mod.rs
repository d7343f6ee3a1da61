//! Built-in commands.
//!
//! Each command has a stable enum, a definition registered with the
//! platform, and (for the ones handled here) a handler that turns an
//! invocation into a reply.

pub mod permissions;
pub mod ping;

use serde::{Deserialize, Serialize};

use osulink_core::{CommandDefinition, CommandEnum, CommandOption, CommandRegistry, OptionKind};

/// Reply sent back to the invoker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandReply {
    pub content: String,
}

impl CommandReply {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }
}

/// The commands shipped with the bot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinCommand {
    Ping,
    Osu,
    Permissions,
}

impl BuiltinCommand {
    /// Registration order. `Permissions` is last because its choices list
    /// every permissioned command registered before it.
    pub const ALL: [BuiltinCommand; 3] = [
        BuiltinCommand::Ping,
        BuiltinCommand::Osu,
        BuiltinCommand::Permissions,
    ];

    pub fn command_enum(self) -> CommandEnum {
        CommandEnum::new(match self {
            BuiltinCommand::Ping => ping::COMMAND_ENUM,
            BuiltinCommand::Osu => OSU_COMMAND_ENUM,
            BuiltinCommand::Permissions => permissions::COMMAND_ENUM,
        })
    }

    pub fn from_command_enum(command_enum: &CommandEnum) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.command_enum() == *command_enum)
    }

    /// Platform definition. `registry` supplies the permission choices.
    pub fn definition(self, registry: &CommandRegistry) -> CommandDefinition {
        match self {
            BuiltinCommand::Ping => ping::definition(),
            BuiltinCommand::Osu => osu_definition(),
            BuiltinCommand::Permissions => permissions::definition(registry),
        }
    }
}

pub const OSU_COMMAND_ENUM: &str = "OSU";

/// osu! profile lookup. Open to everyone; answered by the stats client.
pub fn osu_definition() -> CommandDefinition {
    CommandDefinition::new("osu", "Show an osu! profile").option(
        CommandOption::new("user", "osu! username or id", OptionKind::String),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_enums_roundtrip() {
        for command in BuiltinCommand::ALL {
            assert_eq!(
                BuiltinCommand::from_command_enum(&command.command_enum()),
                Some(command)
            );
        }
        assert_eq!(BuiltinCommand::from_command_enum(&"NOPE".into()), None);
    }

    #[test]
    fn test_permission_defaults() {
        let registry = CommandRegistry::new();
        assert!(!BuiltinCommand::Ping.definition(&registry).default_permission);
        assert!(BuiltinCommand::Osu.definition(&registry).default_permission);
        assert!(!BuiltinCommand::Permissions.definition(&registry).default_permission);
    }
}
