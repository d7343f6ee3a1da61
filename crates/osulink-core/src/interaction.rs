//! Inbound command invocations.
//!
//! The platform delivers an invocation as a command name plus a tree of
//! options: groups and subcommands carry nested options, leaves carry values.

use serde::{Deserialize, Serialize};

use crate::command::OptionKind;
use crate::types::DiscordUserId;

/// Value of a leaf option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Boolean(bool),
    Integer(i64),
    String(String),
}

impl OptionValue {
    /// Render the value as text, the way the platform displays it.
    pub fn to_text(&self) -> String {
        match self {
            OptionValue::Boolean(b) => b.to_string(),
            OptionValue::Integer(i) => i.to_string(),
            OptionValue::String(s) => s.clone(),
        }
    }
}

/// One option of an invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionOption {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: OptionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<OptionValue>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<InteractionOption>,
}

impl InteractionOption {
    /// A subcommand or subcommand group with nested options.
    pub fn group(name: impl Into<String>, kind: OptionKind, options: Vec<InteractionOption>) -> Self {
        Self {
            name: name.into(),
            kind,
            value: None,
            options,
        }
    }

    pub fn string(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: OptionKind::String,
            value: Some(OptionValue::String(value.into())),
            options: Vec::new(),
        }
    }

    pub fn user(name: impl Into<String>, id: &DiscordUserId) -> Self {
        Self {
            name: name.into(),
            kind: OptionKind::User,
            value: Some(OptionValue::String(id.as_str().to_string())),
            options: Vec::new(),
        }
    }

    /// Find a nested option by name.
    pub fn option(&self, name: &str) -> Option<&InteractionOption> {
        self.options.iter().find(|o| o.name == name)
    }

    /// The first nested subcommand or subcommand group, if any.
    pub fn selected(&self) -> Option<&InteractionOption> {
        self.options.iter().find(|o| o.kind.is_group())
    }

    pub fn text(&self) -> Option<String> {
        self.value.as_ref().map(OptionValue::to_text)
    }
}

/// A command invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interaction {
    /// Name of the invoked command.
    pub command_name: String,
    /// Who invoked it.
    pub invoker: DiscordUserId,
    #[serde(default)]
    pub options: Vec<InteractionOption>,
}

impl Interaction {
    pub fn new(command_name: impl Into<String>, invoker: DiscordUserId) -> Self {
        Self {
            command_name: command_name.into(),
            invoker,
            options: Vec::new(),
        }
    }

    pub fn with_option(mut self, option: InteractionOption) -> Self {
        self.options.push(option);
        self
    }

    pub fn option(&self, name: &str) -> Option<&InteractionOption> {
        self.options.iter().find(|o| o.name == name)
    }

    /// The top-level subcommand group or subcommand that was selected.
    pub fn selected(&self) -> Option<&InteractionOption> {
        self.options.iter().find(|o| o.kind.is_group())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_lookup() {
        let interaction = Interaction::new("permissions", "1".into()).with_option(
            InteractionOption::group(
                "add",
                OptionKind::SubCommandGroup,
                vec![InteractionOption::group(
                    "osu",
                    OptionKind::SubCommand,
                    vec![
                        InteractionOption::string("osuresolvable", "peppy"),
                        InteractionOption::string("commandenum", "PING"),
                    ],
                )],
            ),
        );

        let group = interaction.selected().unwrap();
        assert_eq!(group.name, "add");
        let sub = group.selected().unwrap();
        assert_eq!(sub.name, "osu");
        assert_eq!(sub.option("commandenum").and_then(|o| o.text()).as_deref(), Some("PING"));
        // Leaf options are not selectable
        assert!(sub.selected().is_none());
    }

    #[test]
    fn test_deserialize_platform_payload() {
        let json = r#"{
            "command_name": "ping",
            "invoker": "55",
            "options": [{ "name": "text", "type": 3, "value": "hi" }]
        }"#;
        let interaction: Interaction = serde_json::from_str(json).unwrap();
        let text = interaction.option("text").unwrap();
        assert_eq!(text.kind, OptionKind::String);
        assert_eq!(text.value, Some(OptionValue::String("hi".into())));
    }

    #[test]
    fn test_value_text() {
        assert_eq!(OptionValue::Integer(12).to_text(), "12");
        assert_eq!(OptionValue::Boolean(true).to_text(), "true");
    }
}
