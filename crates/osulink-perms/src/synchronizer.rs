//! The permission synchronizer.
//!
//! Every mutation is a short sequence: validate against the registry and the
//! protected identity, persist the user, then reconcile the command. Reconcile
//! always recomputes from the store and replaces the platform's list, so a
//! failed push is repaired by the next successful reconcile of that command.
//!
//! No lock is taken per command. Two mutations of the same command may
//! interleave between persist and reconcile; the later reconcile reads the
//! store again and pushes the current set.

use std::collections::HashSet;
use std::sync::Arc;

use osulink_core::{CommandDescriptor, CommandEnum, CommandRegistry, DiscordUserId, User};
use osulink_platform::{CommandPlatform, PermissionEntry};
use osulink_store::UserStore;

use crate::error::{PermsError, Result};

/// Outcome of reconciling every permissioned command.
#[derive(Debug, Default)]
pub struct ReconcileReport {
    /// Commands whose list was pushed.
    pub reconciled: Vec<CommandEnum>,
    /// Commands that failed, with the reason.
    pub failed: Vec<(CommandEnum, PermsError)>,
}

impl ReconcileReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Grants, revokes and reconciles command permissions.
pub struct PermissionSynchronizer<S: UserStore, P: CommandPlatform> {
    store: Arc<S>,
    registry: Arc<CommandRegistry>,
    platform: Arc<P>,
    /// The administrator; exempt from edits and always authorized.
    protected: Option<DiscordUserId>,
}

impl<S: UserStore, P: CommandPlatform> PermissionSynchronizer<S, P> {
    pub fn new(
        store: Arc<S>,
        registry: Arc<CommandRegistry>,
        platform: Arc<P>,
        protected: Option<DiscordUserId>,
    ) -> Self {
        Self {
            store,
            registry,
            platform,
            protected,
        }
    }

    pub fn protected_identity(&self) -> Option<&DiscordUserId> {
        self.protected.as_ref()
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn is_protected(&self, user: &User) -> bool {
        match (&self.protected, user.discord_id()) {
            (Some(protected), Some(id)) => protected == id,
            _ => false,
        }
    }

    fn descriptor(&self, command_enum: &CommandEnum) -> Result<&CommandDescriptor> {
        self.registry
            .lookup(command_enum)
            .ok_or_else(|| PermsError::UnknownCommand(command_enum.clone()))
    }

    /// Grant `command_enum` to `user`, persist, and reconcile.
    ///
    /// On success `user` reflects the stored record and the pushed list is
    /// returned. On rejection neither `user` nor the store is touched.
    pub async fn grant(
        &self,
        command_enum: &CommandEnum,
        user: &mut User,
    ) -> Result<Vec<PermissionEntry>> {
        self.descriptor(command_enum)?;
        if self.is_protected(user) {
            return Err(PermsError::ProtectedIdentity);
        }
        if user.has_permission(command_enum) {
            return Err(PermsError::AlreadyGranted {
                user: user.id,
                command_enum: command_enum.clone(),
            });
        }

        let mut updated = user.clone();
        updated.add_permission(command_enum.clone());
        self.persist(&updated, "grant", command_enum).await?;
        *user = updated;
        tracing::info!(user = %user.id, command_enum = %command_enum, "granted command permission");

        self.reconcile(command_enum).await
    }

    /// Revoke `command_enum` from `user`, persist, and reconcile.
    pub async fn revoke(
        &self,
        command_enum: &CommandEnum,
        user: &mut User,
    ) -> Result<Vec<PermissionEntry>> {
        self.descriptor(command_enum)?;
        if self.is_protected(user) {
            return Err(PermsError::ProtectedIdentity);
        }
        if !user.has_permission(command_enum) {
            return Err(PermsError::NotGranted {
                user: user.id,
                command_enum: command_enum.clone(),
            });
        }

        let mut updated = user.clone();
        updated.remove_permission(command_enum);
        self.persist(&updated, "revoke", command_enum).await?;
        *user = updated;
        tracing::info!(user = %user.id, command_enum = %command_enum, "revoked command permission");

        self.reconcile(command_enum).await
    }

    /// Discord ids allowed to run `command_enum`, recomputed from the store.
    ///
    /// Users without a Discord link hold grants the platform cannot express
    /// and are skipped. The protected identity is appended last if absent.
    pub async fn authorized_set(&self, command_enum: &CommandEnum) -> Result<Vec<DiscordUserId>> {
        self.descriptor(command_enum)?;

        let holders = self.store.find_by_grant(command_enum).await.map_err(|e| {
            tracing::error!(command_enum = %command_enum, error = %e, "failed to load grant holders");
            PermsError::from(e)
        })?;

        let mut seen = HashSet::new();
        let mut ids = Vec::with_capacity(holders.len() + 1);
        for holder in &holders {
            match holder.discord_id() {
                Some(id) => {
                    if seen.insert(id.clone()) {
                        ids.push(id.clone());
                    }
                }
                None => {
                    tracing::debug!(user = %holder.id, command_enum = %command_enum, "skipping grant holder without discord link");
                }
            }
        }

        if let Some(protected) = &self.protected {
            if !seen.contains(protected) {
                ids.push(protected.clone());
            }
        }

        Ok(ids)
    }

    /// Recompute the authorized set and replace the platform's list with it.
    pub async fn reconcile(&self, command_enum: &CommandEnum) -> Result<Vec<PermissionEntry>> {
        let descriptor = self.descriptor(command_enum)?;
        let entries: Vec<PermissionEntry> = self
            .authorized_set(command_enum)
            .await?
            .iter()
            .map(PermissionEntry::user)
            .collect();

        self.platform
            .set_permissions(&descriptor.handle, entries.clone())
            .await
            .map_err(|e| {
                tracing::error!(
                    command_enum = %command_enum,
                    handle = %descriptor.handle,
                    error = %e,
                    "failed to push command permissions"
                );
                PermsError::from(e)
            })?;

        tracing::debug!(command_enum = %command_enum, users = entries.len(), "pushed command permissions");
        Ok(entries)
    }

    /// Reconcile every command that requires permission.
    ///
    /// Failures do not stop the remaining commands.
    pub async fn reconcile_all(&self) -> ReconcileReport {
        let mut report = ReconcileReport::default();
        for descriptor in self.registry.permissioned() {
            let command_enum = descriptor.command_enum.clone();
            match self.reconcile(&command_enum).await {
                Ok(_) => report.reconciled.push(command_enum),
                Err(e) => report.failed.push((command_enum, e)),
            }
        }
        if !report.is_complete() {
            tracing::warn!(failed = report.failed.len(), "some command permissions were not pushed");
        }
        report
    }

    async fn persist(&self, user: &User, op: &str, command_enum: &CommandEnum) -> Result<()> {
        self.store.persist(user).await.map_err(|e| {
            tracing::error!(op, user = %user.id, command_enum = %command_enum, error = %e, "failed to persist user");
            PermsError::from(e)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PermsErrorKind;
    use osulink_core::{CommandHandle, DiscordIntegration};
    use osulink_platform::MemoryPlatform;
    use osulink_store::MemoryStore;

    const ADMIN: &str = "1000";

    struct Harness {
        store: Arc<MemoryStore>,
        platform: Arc<MemoryPlatform>,
        sync: PermissionSynchronizer<MemoryStore, MemoryPlatform>,
        osu_handle: CommandHandle,
    }

    async fn harness(protected: Option<&str>) -> Harness {
        use osulink_core::CommandDefinition;

        let store = Arc::new(MemoryStore::new());
        let platform = Arc::new(MemoryPlatform::new());
        let mut registry = CommandRegistry::new();
        let mut osu_handle = None;
        for (command_enum, name, open) in [("OSU", "osu", false), ("PING", "ping", false), ("INFO", "info", true)] {
            let definition = CommandDefinition::new(name, name).default_permission(open);
            let handle = platform.register_command(&definition).await.unwrap();
            if command_enum == "OSU" {
                osu_handle = Some(handle.clone());
            }
            registry
                .register(CommandDescriptor::from_definition(command_enum.into(), &definition, handle))
                .unwrap();
        }

        let sync = PermissionSynchronizer::new(
            Arc::clone(&store),
            Arc::new(registry),
            Arc::clone(&platform),
            protected.map(DiscordUserId::from),
        );
        Harness {
            store,
            platform,
            sync,
            osu_handle: osu_handle.unwrap(),
        }
    }

    async fn linked(store: &MemoryStore, discord: &str) -> User {
        let mut user = User::new();
        user.discord = Some(DiscordIntegration::new(discord.into()));
        store.persist(&user).await.unwrap();
        user
    }

    fn ids(entries: &[PermissionEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.id.as_str()).collect()
    }

    #[tokio::test]
    async fn test_grant_then_revoke_scenario() {
        let h = harness(Some(ADMIN)).await;
        let mut a = linked(&h.store, "42").await;

        let pushed = h.sync.grant(&"OSU".into(), &mut a).await.unwrap();
        assert_eq!(ids(&pushed), vec!["42", ADMIN]);
        assert!(a.has_permission(&"OSU".into()));

        let pushed = h.sync.revoke(&"OSU".into(), &mut a).await.unwrap();
        assert_eq!(ids(&pushed), vec![ADMIN]);
        assert!(a.permissions().is_empty());

        let last = h.platform.last_push(&h.osu_handle).await.unwrap();
        assert_eq!(last.user_ids(), vec![ADMIN]);
    }

    #[tokio::test]
    async fn test_unknown_command_leaves_store_untouched() {
        let h = harness(Some(ADMIN)).await;
        let mut a = linked(&h.store, "42").await;
        let before = a.clone();

        let err = h.sync.grant(&"UNKNOWN".into(), &mut a).await.unwrap_err();
        assert_eq!(err.kind(), PermsErrorKind::UnknownCommand);
        assert_eq!(a, before);
        assert_eq!(h.store.get_user(&a.id).await.unwrap().unwrap(), before);
        assert!(h.platform.history().await.is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_grant_rejected() {
        let h = harness(None).await;
        let mut a = linked(&h.store, "42").await;

        h.sync.grant(&"PING".into(), &mut a).await.unwrap();
        let err = h.sync.grant(&"PING".into(), &mut a).await.unwrap_err();
        assert_eq!(err.kind(), PermsErrorKind::AlreadyGranted);

        let stored = h.store.get_user(&a.id).await.unwrap().unwrap();
        assert_eq!(stored.permissions(), &[CommandEnum::from("PING")]);
    }

    #[tokio::test]
    async fn test_revoke_without_grant_rejected() {
        let h = harness(None).await;
        let mut a = linked(&h.store, "42").await;

        let err = h.sync.revoke(&"PING".into(), &mut a).await.unwrap_err();
        assert_eq!(err.kind(), PermsErrorKind::NotGranted);
        assert!(h.platform.history().await.is_empty());
    }

    #[tokio::test]
    async fn test_protected_identity_is_immutable() {
        let h = harness(Some(ADMIN)).await;
        let mut admin = linked(&h.store, ADMIN).await;
        let before = admin.clone();

        let err = h.sync.grant(&"OSU".into(), &mut admin).await.unwrap_err();
        assert_eq!(err.kind(), PermsErrorKind::ProtectedIdentity);
        let err = h.sync.revoke(&"OSU".into(), &mut admin).await.unwrap_err();
        assert_eq!(err.kind(), PermsErrorKind::ProtectedIdentity);

        assert_eq!(h.store.get_user(&admin.id).await.unwrap().unwrap(), before);
    }

    #[tokio::test]
    async fn test_unknown_command_checked_before_protected_identity() {
        let h = harness(Some(ADMIN)).await;
        let mut admin = linked(&h.store, ADMIN).await;

        let err = h.sync.grant(&"NOPE".into(), &mut admin).await.unwrap_err();
        assert_eq!(err.kind(), PermsErrorKind::UnknownCommand);
    }

    #[tokio::test]
    async fn test_reconcile_is_idempotent() {
        let h = harness(Some(ADMIN)).await;
        let mut a = linked(&h.store, "42").await;
        let mut b = linked(&h.store, "43").await;
        h.sync.grant(&"PING".into(), &mut a).await.unwrap();
        h.sync.grant(&"PING".into(), &mut b).await.unwrap();

        let first = h.sync.reconcile(&"PING".into()).await.unwrap();
        let second = h.sync.reconcile(&"PING".into()).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(ids(&first), vec!["42", "43", ADMIN]);
    }

    #[tokio::test]
    async fn test_protected_identity_not_duplicated_when_granted_directly() {
        let h = harness(Some(ADMIN)).await;
        // Grant written outside the synchronizer
        let mut admin = User::new();
        admin.discord = Some(DiscordIntegration::new(ADMIN.into()));
        admin.add_permission("PING".into());
        h.store.persist(&admin).await.unwrap();

        let pushed = h.sync.reconcile(&"PING".into()).await.unwrap();
        assert_eq!(ids(&pushed), vec![ADMIN]);
    }

    #[tokio::test]
    async fn test_no_protected_identity_configured() {
        let h = harness(None).await;
        let pushed = h.sync.reconcile(&"OSU".into()).await.unwrap();
        assert!(pushed.is_empty());
    }

    #[tokio::test]
    async fn test_unlinked_holder_is_skipped() {
        let h = harness(Some(ADMIN)).await;
        let mut unlinked = User::new();
        h.store.persist(&unlinked).await.unwrap();

        let pushed = h.sync.grant(&"PING".into(), &mut unlinked).await.unwrap();
        assert_eq!(ids(&pushed), vec![ADMIN]);
    }

    #[tokio::test]
    async fn test_push_failure_is_repaired_by_next_reconcile() {
        let h = harness(Some(ADMIN)).await;
        let mut a = linked(&h.store, "42").await;

        h.platform.fail_next_pushes(1).await;
        let err = h.sync.grant(&"OSU".into(), &mut a).await.unwrap_err();
        assert_eq!(err.kind(), PermsErrorKind::Platform);
        assert!(err.user_message().is_none());

        // Grant was persisted even though the push failed
        let stored = h.store.get_user(&a.id).await.unwrap().unwrap();
        assert!(stored.has_permission(&"OSU".into()));
        assert!(h.platform.last_push(&h.osu_handle).await.is_none());

        let pushed = h.sync.reconcile(&"OSU".into()).await.unwrap();
        assert_eq!(ids(&pushed), vec!["42", ADMIN]);
    }

    #[tokio::test]
    async fn test_reconcile_all_covers_permissioned_commands_only() {
        let h = harness(Some(ADMIN)).await;
        let report = h.sync.reconcile_all().await;

        assert!(report.is_complete());
        assert_eq!(
            report.reconciled,
            vec![CommandEnum::from("OSU"), CommandEnum::from("PING")]
        );
        assert_eq!(h.platform.history().await.len(), 2);
    }

    #[tokio::test]
    async fn test_reconcile_all_reports_failures() {
        let h = harness(Some(ADMIN)).await;
        h.platform.fail_next_pushes(1).await;

        let report = h.sync.reconcile_all().await;
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, CommandEnum::from("OSU"));
        assert_eq!(report.reconciled, vec![CommandEnum::from("PING")]);
    }

    proptest::proptest! {
        #![proptest_config(proptest::prelude::ProptestConfig::with_cases(32))]

        #[test]
        fn test_protected_identity_always_pushed(
            holders in proptest::collection::vec("[1-9][0-9]{0,5}", 0..6),
            include_admin in proptest::bool::ANY,
        ) {
            let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
            rt.block_on(async {
                let h = harness(Some(ADMIN)).await;
                let mut discord_ids: Vec<String> = holders.clone();
                if include_admin {
                    discord_ids.push(ADMIN.to_string());
                }
                for discord in &discord_ids {
                    if h.store
                        .find_by_identity(&osulink_store::IdentityQuery::DiscordId(discord.as_str().into()))
                        .await
                        .unwrap()
                        .is_some()
                    {
                        continue;
                    }
                    let mut user = linked(&h.store, discord).await;
                    user.add_permission("PING".into());
                    h.store.persist(&user).await.unwrap();
                }

                let pushed = h.sync.reconcile(&"PING".into()).await.unwrap();
                let pushed_ids = ids(&pushed);
                proptest::prop_assert_eq!(pushed_ids.iter().filter(|id| **id == ADMIN).count(), 1);
                let unique: HashSet<&&str> = pushed_ids.iter().collect();
                proptest::prop_assert_eq!(unique.len(), pushed_ids.len());
                Ok(())
            })?;
        }
    }
}
