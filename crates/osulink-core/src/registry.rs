//! The command registry.
//!
//! Filled once at startup, read by everything afterwards. Lookups are by
//! [`CommandEnum`]; iteration follows registration order so the choice list
//! shown to users is stable.

use std::collections::HashMap;

use crate::command::{CommandChoice, CommandDescriptor};
use crate::error::RegistryError;
use crate::types::{CommandEnum, CommandHandle};

/// Catalog of registered commands.
#[derive(Debug, Default)]
pub struct CommandRegistry {
    descriptors: HashMap<CommandEnum, CommandDescriptor>,
    order: Vec<CommandEnum>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a descriptor. Fails if its enum is already registered.
    pub fn register(&mut self, descriptor: CommandDescriptor) -> Result<(), RegistryError> {
        if self.descriptors.contains_key(&descriptor.command_enum) {
            return Err(RegistryError::DuplicateCommand(descriptor.command_enum));
        }
        self.order.push(descriptor.command_enum.clone());
        self.descriptors
            .insert(descriptor.command_enum.clone(), descriptor);
        Ok(())
    }

    /// Remove a descriptor.
    ///
    /// Grants referencing the enum stay in the user store; registering the
    /// enum again makes them effective again.
    pub fn unregister(&mut self, command_enum: &CommandEnum) -> Option<CommandDescriptor> {
        let removed = self.descriptors.remove(command_enum)?;
        self.order.retain(|e| e != command_enum);
        Some(removed)
    }

    pub fn lookup(&self, command_enum: &CommandEnum) -> Option<&CommandDescriptor> {
        self.descriptors.get(command_enum)
    }

    /// Find a descriptor by its display name.
    pub fn lookup_by_name(&self, name: &str) -> Option<&CommandDescriptor> {
        self.iter().find(|d| d.name == name)
    }

    /// Find a descriptor by its platform handle.
    pub fn lookup_by_handle(&self, handle: &CommandHandle) -> Option<&CommandDescriptor> {
        self.iter().find(|d| &d.handle == handle)
    }

    /// All descriptors in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &CommandDescriptor> {
        self.order.iter().filter_map(|e| self.descriptors.get(e))
    }

    /// Descriptors that require an explicit grant, in registration order.
    pub fn permissioned(&self) -> impl Iterator<Item = &CommandDescriptor> {
        self.iter().filter(|d| d.requires_permission())
    }

    /// Choices for the `commandenum` option: description as label, enum as value.
    pub fn list_permissioned_enums(&self) -> Vec<CommandChoice> {
        self.permissioned()
            .map(|d| CommandChoice::new(d.description.clone(), d.command_enum.as_str()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(command_enum: &str, open: bool) -> CommandDescriptor {
        CommandDescriptor {
            command_enum: command_enum.into(),
            name: command_enum.to_lowercase(),
            description: format!("{} command", command_enum),
            default_permission: open,
            handle: CommandHandle::new(format!("h-{}", command_enum)),
        }
    }

    #[test]
    fn test_register_and_lookup() {
        let mut registry = CommandRegistry::new();
        registry.register(descriptor("PING", false)).unwrap();

        let found = registry.lookup(&"PING".into()).unwrap();
        assert_eq!(found.name, "ping");
        assert!(registry.lookup(&"NOPE".into()).is_none());
        assert_eq!(
            registry.lookup_by_handle(&CommandHandle::new("h-PING")).map(|d| d.name.as_str()),
            Some("ping")
        );
    }

    #[test]
    fn test_duplicate_rejected() {
        let mut registry = CommandRegistry::new();
        registry.register(descriptor("PING", false)).unwrap();

        let err = registry.register(descriptor("PING", true)).unwrap_err();
        assert_eq!(err, RegistryError::DuplicateCommand("PING".into()));
        // First registration wins
        assert!(registry.lookup(&"PING".into()).unwrap().requires_permission());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_permissioned_choices_skip_open_commands() {
        let mut registry = CommandRegistry::new();
        registry.register(descriptor("PING", false)).unwrap();
        registry.register(descriptor("OSU", true)).unwrap();
        registry.register(descriptor("PERMISSIONS", false)).unwrap();

        let choices = registry.list_permissioned_enums();
        let values: Vec<&str> = choices.iter().map(|c| c.value.as_str()).collect();
        assert_eq!(values, vec!["PING", "PERMISSIONS"]);
        assert_eq!(choices[0].name, "PING command");
    }

    #[test]
    fn test_unregister() {
        let mut registry = CommandRegistry::new();
        registry.register(descriptor("PING", false)).unwrap();
        registry.register(descriptor("OSU", true)).unwrap();

        assert!(registry.unregister(&"PING".into()).is_some());
        assert!(registry.unregister(&"PING".into()).is_none());
        assert_eq!(registry.iter().count(), 1);

        // Can be registered again
        registry.register(descriptor("PING", false)).unwrap();
        assert_eq!(registry.len(), 2);
    }
}
