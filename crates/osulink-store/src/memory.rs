//! In-memory implementation of the UserStore trait.
//!
//! This is primarily for testing. Like the SQLite schema it allows one user
//! per Discord id and per osu! id, but keeps everything in memory with no
//! persistence.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use osulink_core::{CommandEnum, User, UserId};

use crate::error::{Result, StoreError};
use crate::traits::{IdentityQuery, UserStore};

/// In-memory store implementation.
///
/// All data is lost when the store is dropped. Thread-safe via RwLock; a
/// persist swaps the whole record under the write lock.
pub struct MemoryStore {
    inner: RwLock<MemoryStoreInner>,
}

#[derive(Default)]
struct MemoryStoreInner {
    users: HashMap<UserId, User>,
    /// Insertion order, for stable `find_by_grant` results.
    order: Vec<UserId>,
}

impl MemoryStoreInner {
    fn ordered(&self) -> impl Iterator<Item = &User> {
        self.order.iter().filter_map(|id| self.users.get(id))
    }
}

fn shares_identity(a: &User, b: &User) -> bool {
    let discord = matches!((a.discord_id(), b.discord_id()), (Some(x), Some(y)) if x == y);
    let osu = matches!((a.osu_id(), b.osu_id()), (Some(x), Some(y)) if x == y);
    discord || osu
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(MemoryStoreInner::default()),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, MemoryStoreInner>> {
        self.inner
            .read()
            .map_err(|e| StoreError::Poisoned(e.to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, MemoryStoreInner>> {
        self.inner
            .write()
            .map_err(|e| StoreError::Poisoned(e.to_string()))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn get_user(&self, id: &UserId) -> Result<Option<User>> {
        Ok(self.read()?.users.get(id).cloned())
    }

    async fn find_by_grant(&self, command_enum: &CommandEnum) -> Result<Vec<User>> {
        let inner = self.read()?;
        let found = inner
            .ordered()
            .filter(|u| u.has_permission(command_enum))
            .cloned()
            .collect();
        Ok(found)
    }

    async fn find_by_identity(&self, query: &IdentityQuery) -> Result<Option<User>> {
        let inner = self.read()?;
        let found = inner.ordered().find(|u| query.matches(u)).cloned();
        Ok(found)
    }

    async fn persist(&self, user: &User) -> Result<()> {
        let mut inner = self.write()?;
        if let Some(other) = inner.ordered().find(|u| u.id != user.id && shares_identity(u, user)) {
            return Err(StoreError::IdentityConflict(format!(
                "user {} already holds an identity of user {}",
                other.id, user.id
            )));
        }
        if inner.users.insert(user.id, user.clone()).is_none() {
            inner.order.push(user.id);
        }
        Ok(())
    }

    async fn count_users(&self) -> Result<usize> {
        Ok(self.read()?.users.len())
    }
}
