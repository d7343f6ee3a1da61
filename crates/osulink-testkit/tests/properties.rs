//! Properties of reconcile over arbitrary user populations.

use std::collections::HashSet;
use std::sync::Arc;

use proptest::prelude::*;

use osulink_core::{
    CommandDefinition, CommandDescriptor, CommandEnum, CommandRegistry, DiscordUserId, User,
};
use osulink_perms::PermissionSynchronizer;
use osulink_platform::{CommandPlatform, MemoryPlatform};
use osulink_store::{MemoryStore, UserStore};
use osulink_testkit::generators::{command_enum, population, GRANTABLE};

const ADMIN: &str = "3";

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

async fn setup(
    users: &[User],
) -> (
    PermissionSynchronizer<MemoryStore, MemoryPlatform>,
    Arc<MemoryPlatform>,
) {
    let store = Arc::new(MemoryStore::new());
    for user in users {
        store.persist(user).await.unwrap();
    }

    let platform = Arc::new(MemoryPlatform::new());
    let mut registry = CommandRegistry::new();
    for name in GRANTABLE {
        let definition = CommandDefinition::new(name.to_lowercase(), name).default_permission(false);
        let handle = platform.register_command(&definition).await.unwrap();
        registry
            .register(CommandDescriptor::from_definition(
                CommandEnum::new(name),
                &definition,
                handle,
            ))
            .unwrap();
    }

    let sync = PermissionSynchronizer::new(
        store,
        Arc::new(registry),
        platform.clone(),
        Some(DiscordUserId::new(ADMIN)),
    );
    (sync, platform)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn reconcile_is_idempotent(users in population(10), target in command_enum()) {
        runtime().block_on(async {
            let (sync, _) = setup(&users).await;
            let first = sync.reconcile(&target).await.unwrap();
            let second = sync.reconcile(&target).await.unwrap();
            prop_assert_eq!(first, second);
            Ok(())
        })?;
    }

    #[test]
    fn pushed_set_is_holders_plus_admin(users in population(10), target in command_enum()) {
        runtime().block_on(async {
            let (sync, _) = setup(&users).await;
            let pushed = sync.reconcile(&target).await.unwrap();
            let pushed: Vec<_> = pushed.iter().map(|e| e.id.as_str().to_string()).collect();

            let mut expected: HashSet<String> = users
                .iter()
                .filter(|u| u.has_permission(&target))
                .filter_map(|u| u.discord_id().map(|id| id.as_str().to_string()))
                .collect();
            expected.insert(ADMIN.to_string());

            let unique: HashSet<String> = pushed.iter().cloned().collect();
            prop_assert_eq!(unique.len(), pushed.len());
            prop_assert_eq!(unique, expected);
            prop_assert_eq!(pushed.iter().filter(|id| id.as_str() == ADMIN).count(), 1);
            Ok(())
        })?;
    }

    #[test]
    fn grant_then_revoke_restores_list(users in population(8), target in command_enum()) {
        runtime().block_on(async {
            let (sync, _) = setup(&users).await;
            let before = sync.reconcile(&target).await.unwrap();

            let candidate = users.iter().find(|u| {
                !u.has_permission(&target)
                    && u.discord_id().map(|id| id.as_str() != ADMIN).unwrap_or(true)
            });
            if let Some(candidate) = candidate {
                let mut user = candidate.clone();
                sync.grant(&target, &mut user).await.unwrap();
                sync.revoke(&target, &mut user).await.unwrap();

                let after = sync.reconcile(&target).await.unwrap();
                prop_assert_eq!(before, after);
                prop_assert!(!user.has_permission(&target));
            }
            Ok(())
        })?;
    }
}
