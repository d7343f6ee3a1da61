//! The chat-platform collaborator.
//!
//! Implementations talk to the real platform API; [`memory::MemoryPlatform`]
//! records everything for tests.

use async_trait::async_trait;

use osulink_core::{CommandDefinition, CommandHandle};

use crate::error::Result;
use crate::messages::PermissionEntry;

/// Operations the bot needs from the chat platform.
///
/// Implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait CommandPlatform: Send + Sync {
    /// Register a command and return the handle the platform assigned.
    async fn register_command(&self, definition: &CommandDefinition) -> Result<CommandHandle>;

    /// Replace the command's entire permission list with `entries`.
    async fn set_permissions(
        &self,
        handle: &CommandHandle,
        entries: Vec<PermissionEntry>,
    ) -> Result<()>;

    /// The permission list currently held by the platform.
    async fn get_permissions(&self, handle: &CommandHandle) -> Result<Vec<PermissionEntry>>;
}

#[async_trait]
impl<P: CommandPlatform + ?Sized> CommandPlatform for std::sync::Arc<P> {
    async fn register_command(&self, definition: &CommandDefinition) -> Result<CommandHandle> {
        (**self).register_command(definition).await
    }

    async fn set_permissions(
        &self,
        handle: &CommandHandle,
        entries: Vec<PermissionEntry>,
    ) -> Result<()> {
        (**self).set_permissions(handle, entries).await
    }

    async fn get_permissions(&self, handle: &CommandHandle) -> Result<Vec<PermissionEntry>> {
        (**self).get_permissions(handle).await
    }
}

/// A simple in-memory platform for testing.
///
/// Keeps registered definitions, the current ACL per command and the full
/// history of pushes. Pushes can be made to fail on demand.
pub mod memory {
    use super::*;
    use std::collections::HashMap;
    use tokio::sync::RwLock;

    use crate::error::PlatformError;
    use crate::messages::AclPush;

    /// First handle handed out; looks like a platform snowflake.
    const HANDLE_BASE: u64 = 900_000_000_000_000_000;

    #[derive(Default)]
    struct MemoryPlatformState {
        commands: Vec<(CommandHandle, CommandDefinition)>,
        acl: HashMap<CommandHandle, Vec<PermissionEntry>>,
        history: Vec<AclPush>,
        failing_pushes: usize,
    }

    /// In-memory platform implementation.
    #[derive(Default)]
    pub struct MemoryPlatform {
        state: RwLock<MemoryPlatformState>,
    }

    impl MemoryPlatform {
        pub fn new() -> Self {
            Self::default()
        }

        /// Make the next `count` permission pushes fail with a transport error.
        pub async fn fail_next_pushes(&self, count: usize) {
            self.state.write().await.failing_pushes = count;
        }

        /// Every successful push, oldest first.
        pub async fn history(&self) -> Vec<AclPush> {
            self.state.read().await.history.clone()
        }

        /// Successful pushes for one command, oldest first.
        pub async fn pushes_for(&self, handle: &CommandHandle) -> Vec<AclPush> {
            self.state
                .read()
                .await
                .history
                .iter()
                .filter(|p| &p.handle == handle)
                .cloned()
                .collect()
        }

        /// The most recent push for one command, if any.
        pub async fn last_push(&self, handle: &CommandHandle) -> Option<AclPush> {
            self.pushes_for(handle).await.pop()
        }

        /// Registered definitions with their handles, in registration order.
        pub async fn definitions(&self) -> Vec<(CommandHandle, CommandDefinition)> {
            self.state.read().await.commands.clone()
        }

        /// Find a registered definition by command name.
        pub async fn definition(&self, name: &str) -> Option<(CommandHandle, CommandDefinition)> {
            self.state
                .read()
                .await
                .commands
                .iter()
                .find(|(_, d)| d.name == name)
                .cloned()
        }
    }

    #[async_trait]
    impl CommandPlatform for MemoryPlatform {
        async fn register_command(&self, definition: &CommandDefinition) -> Result<CommandHandle> {
            let mut state = self.state.write().await;
            if state.commands.iter().any(|(_, d)| d.name == definition.name) {
                return Err(PlatformError::Rejected(format!(
                    "command name already registered: {}",
                    definition.name
                )));
            }

            let handle = CommandHandle::new((HANDLE_BASE + state.commands.len() as u64).to_string());
            state.commands.push((handle.clone(), definition.clone()));
            state.acl.insert(handle.clone(), Vec::new());
            tracing::debug!(command = %definition.name, %handle, "registered command");
            Ok(handle)
        }

        async fn set_permissions(
            &self,
            handle: &CommandHandle,
            entries: Vec<PermissionEntry>,
        ) -> Result<()> {
            let mut state = self.state.write().await;
            if state.failing_pushes > 0 {
                state.failing_pushes -= 1;
                return Err(PlatformError::Transport("connection reset".into()));
            }

            let slot = state
                .acl
                .get_mut(handle)
                .ok_or_else(|| PlatformError::UnknownHandle(handle.clone()))?;
            *slot = entries.clone();
            state.history.push(AclPush {
                handle: handle.clone(),
                entries,
            });
            Ok(())
        }

        async fn get_permissions(&self, handle: &CommandHandle) -> Result<Vec<PermissionEntry>> {
            self.state
                .read()
                .await
                .acl
                .get(handle)
                .cloned()
                .ok_or_else(|| PlatformError::UnknownHandle(handle.clone()))
        }
    }
}
