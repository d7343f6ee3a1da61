//! Command definitions and registered command descriptors.
//!
//! A [`CommandDefinition`] is the shape sent to the chat platform when a
//! command is registered. A [`CommandDescriptor`] is what the bot keeps
//! afterwards: the stable enum, display fields, whether invoking it needs an
//! explicit grant, and the handle the platform assigned.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{CommandEnum, CommandHandle};

/// Kind of a command option, serialized as the platform's numeric code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum OptionKind {
    SubCommand,
    SubCommandGroup,
    String,
    Integer,
    Boolean,
    User,
    Channel,
    Role,
}

impl OptionKind {
    pub fn to_u8(self) -> u8 {
        match self {
            OptionKind::SubCommand => 1,
            OptionKind::SubCommandGroup => 2,
            OptionKind::String => 3,
            OptionKind::Integer => 4,
            OptionKind::Boolean => 5,
            OptionKind::User => 6,
            OptionKind::Channel => 7,
            OptionKind::Role => 8,
        }
    }

    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(OptionKind::SubCommand),
            2 => Some(OptionKind::SubCommandGroup),
            3 => Some(OptionKind::String),
            4 => Some(OptionKind::Integer),
            5 => Some(OptionKind::Boolean),
            6 => Some(OptionKind::User),
            7 => Some(OptionKind::Channel),
            8 => Some(OptionKind::Role),
            _ => None,
        }
    }

    /// Whether options of this kind carry nested options instead of a value.
    pub fn is_group(self) -> bool {
        matches!(self, OptionKind::SubCommand | OptionKind::SubCommandGroup)
    }
}

impl From<OptionKind> for u8 {
    fn from(kind: OptionKind) -> Self {
        kind.to_u8()
    }
}

impl TryFrom<u8> for OptionKind {
    type Error = CoreError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        OptionKind::from_u8(value).ok_or(CoreError::InvalidOptionKind(value))
    }
}

/// A fixed choice offered for a string option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandChoice {
    pub name: String,
    pub value: String,
}

impl CommandChoice {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// One option of a command definition. Groups nest further options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandOption {
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: OptionKind,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<CommandChoice>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<CommandOption>,
}

impl CommandOption {
    pub fn new(name: impl Into<String>, description: impl Into<String>, kind: OptionKind) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            kind,
            required: false,
            choices: Vec::new(),
            options: Vec::new(),
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn choices(mut self, choices: Vec<CommandChoice>) -> Self {
        self.choices = choices;
        self
    }

    pub fn option(mut self, option: CommandOption) -> Self {
        self.options.push(option);
        self
    }
}

/// A command as registered with the chat platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandDefinition {
    pub name: String,
    pub description: String,
    /// `true` if anyone may invoke the command without an explicit grant.
    pub default_permission: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<CommandOption>,
}

impl CommandDefinition {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            default_permission: true,
            options: Vec::new(),
        }
    }

    pub fn default_permission(mut self, open: bool) -> Self {
        self.default_permission = open;
        self
    }

    pub fn option(mut self, option: CommandOption) -> Self {
        self.options.push(option);
        self
    }
}

/// A registered command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandDescriptor {
    pub command_enum: CommandEnum,
    pub name: String,
    pub description: String,
    /// Default-open commands never go through grant/revoke.
    pub default_permission: bool,
    /// Platform handle used to push ACL updates.
    pub handle: CommandHandle,
}

impl CommandDescriptor {
    pub fn from_definition(
        command_enum: CommandEnum,
        definition: &CommandDefinition,
        handle: CommandHandle,
    ) -> Self {
        Self {
            command_enum,
            name: definition.name.clone(),
            description: definition.description.clone(),
            default_permission: definition.default_permission,
            handle,
        }
    }

    /// Whether invoking this command requires an explicit grant.
    pub fn requires_permission(&self) -> bool {
        !self.default_permission
    }
}
