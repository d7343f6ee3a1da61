//! `/ping`, with an optional message to echo back.

use osulink_core::{CommandDefinition, CommandOption, Interaction, OptionKind};

use super::CommandReply;

pub const COMMAND_ENUM: &str = "PING";

pub fn definition() -> CommandDefinition {
    CommandDefinition::new("ping", "Ping!")
        .default_permission(false)
        .option(CommandOption::new(
            "text",
            "Message to echo back",
            OptionKind::String,
        ))
}

pub fn handle(interaction: &Interaction) -> CommandReply {
    match interaction.option("text").and_then(|o| o.text()) {
        Some(text) => CommandReply::new(format!("Pong! Your message was {}", text)),
        None => CommandReply::new("Pong!"),
    }
}
