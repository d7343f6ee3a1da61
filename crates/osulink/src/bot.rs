//! The Bot: wires the store, registry, platform and synchronizer together.
//!
//! Startup registers the built-in commands with the platform, builds the
//! registry from the returned handles, and reconciles every permissioned
//! command so the platform matches the store.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use osulink_core::{CommandDescriptor, CommandRegistry, Interaction, User, UserId};
use osulink_perms::{PermissionSynchronizer, ReconcileReport};
use osulink_platform::CommandPlatform;
use osulink_store::{SqliteStore, UserStore};
use tracing::{debug, info, warn};

use crate::auth::{DiscordProfile, IdentityLinker, OAuthTokens};
use crate::commands::{self, BuiltinCommand, CommandReply};
use crate::config::BotConfig;
use crate::error::Result;

/// The running bot.
pub struct Bot<S: UserStore, P: CommandPlatform> {
    config: BotConfig,
    store: Arc<S>,
    platform: Arc<P>,
    permissions: PermissionSynchronizer<S, P>,
    identities: IdentityLinker<S>,
}

impl<S: UserStore, P: CommandPlatform> Bot<S, P> {
    /// Register the built-in commands and reconcile their permissions.
    ///
    /// Reconcile failures are logged and do not stop startup; the next
    /// grant or revoke of the affected command repairs its list.
    pub async fn start(config: BotConfig, store: Arc<S>, platform: Arc<P>) -> Result<Self> {
        config.validate()?;

        let mut registry = CommandRegistry::new();
        for command in BuiltinCommand::ALL {
            let definition = command.definition(&registry);
            let handle = platform.register_command(&definition).await?;
            debug!(command = %definition.name, handle = %handle, "registered command");
            registry.register(CommandDescriptor::from_definition(
                command.command_enum(),
                &definition,
                handle,
            ))?;
        }

        let registry = Arc::new(registry);
        let permissions = PermissionSynchronizer::new(
            store.clone(),
            registry.clone(),
            platform.clone(),
            config.protected_identity(),
        );

        let report = permissions.reconcile_all().await;
        for (command_enum, e) in &report.failed {
            warn!(command_enum = %command_enum, error = %e, "startup reconcile failed");
        }
        info!(
            commands = registry.len(),
            reconciled = report.reconciled.len(),
            failed = report.failed.len(),
            "bot started"
        );

        Ok(Self {
            identities: IdentityLinker::new(store.clone()),
            config,
            store,
            platform,
            permissions,
        })
    }

    pub fn config(&self) -> &BotConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn registry(&self) -> &CommandRegistry {
        self.permissions.registry()
    }

    pub fn permissions(&self) -> &PermissionSynchronizer<S, P> {
        &self.permissions
    }

    pub fn identities(&self) -> &IdentityLinker<S> {
        &self.identities
    }

    /// Reconcile every permissioned command again.
    pub async fn reconcile_all(&self) -> ReconcileReport {
        self.permissions.reconcile_all().await
    }

    /// Complete a Discord login and bring the user's grants onto the platform.
    ///
    /// Grants given before Discord was linked (through the osu! target) are
    /// not on any access list yet; every permissioned command the user holds
    /// is reconciled. A failed push is logged and does not fail the login.
    pub async fn complete_discord(
        &self,
        session_user: Option<UserId>,
        profile: &DiscordProfile,
        tokens: OAuthTokens,
    ) -> Result<User> {
        let user = self
            .identities
            .complete_discord(session_user, profile, tokens)
            .await?;

        let held = user.permissions().iter().filter(|e| {
            self.registry()
                .lookup(e)
                .map(CommandDescriptor::requires_permission)
                .unwrap_or(false)
        });
        for command_enum in held {
            if let Err(e) = self.permissions.reconcile(command_enum).await {
                warn!(user = %user.id, command_enum = %command_enum, error = %e, "reconcile after discord link failed");
            }
        }
        Ok(user)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Dispatch
    // ─────────────────────────────────────────────────────────────────────────

    /// Route an invocation to its handler.
    ///
    /// Returns `None` for commands that are unknown or not answered locally.
    /// Access control is enforced by the platform before delivery.
    pub async fn handle_interaction(&self, interaction: &Interaction) -> Option<CommandReply> {
        let descriptor = match self.registry().lookup_by_name(&interaction.command_name) {
            Some(descriptor) => descriptor,
            None => {
                debug!(command = %interaction.command_name, "ignoring unknown command");
                return None;
            }
        };

        match BuiltinCommand::from_command_enum(&descriptor.command_enum)? {
            BuiltinCommand::Ping => Some(commands::ping::handle(interaction)),
            BuiltinCommand::Permissions => {
                Some(commands::permissions::handle(&self.permissions, interaction).await)
            }
            BuiltinCommand::Osu => None,
        }
    }
}

impl<P: CommandPlatform> Bot<SqliteStore, P> {
    /// Load the config file, open the database it names, and start.
    pub async fn from_config_file(path: impl AsRef<Path>, platform: Arc<P>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let config = BotConfig::load(path)
            .with_context(|| format!("loading config from {}", path.display()))?;
        let store = SqliteStore::open(&config.database.path).with_context(|| {
            format!("opening database at {}", config.database.path.display())
        })?;

        Self::start(config, Arc::new(store), platform)
            .await
            .context("starting bot")
    }
}
