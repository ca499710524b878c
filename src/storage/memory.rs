use super::store::{RecordStore, StatePatch};
use super::types::*;

use anyhow::Result;
use async_trait::async_trait;
use dashmap::DashMap;

/// Volatile backend: one `UserState` per user id, lost on restart.
///
/// Each mutation runs under the shard lock of that user's entry, so a write is
/// an atomic replace of the user's state. Concurrent writes to the same user
/// are applied in completion order.
pub struct MemoryStore {
    users: DashMap<String, UserState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            users: DashMap::new(),
        }
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    pub fn contains(&self, user_id: &str) -> bool {
        self.users.contains_key(user_id)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    fn variant(&self) -> StoreVariant {
        StoreVariant::Memory
    }

    async fn load(&self, user_id: &str) -> Result<Option<UserState>> {
        Ok(self.users.get(user_id).map(|entry| entry.value().clone()))
    }

    async fn get_or_create(&self, user_id: &str) -> Result<UserState> {
        let entry = self.users.entry(user_id.to_string()).or_insert_with(|| {
            tracing::info!("Initialized default state for user {}", user_id);
            get_or_create(None, user_id)
        });
        Ok(entry.value().clone())
    }

    async fn update(&self, user_id: &str, patch: StatePatch) -> Result<UserState> {
        let mut entry = self
            .users
            .entry(user_id.to_string())
            .or_insert_with(|| get_or_create(None, user_id));
        patch(entry.value_mut());
        Ok(entry.value().clone())
    }

    async fn delete_user(&self, user_id: &str) -> Result<bool> {
        let removed = self.users.remove(user_id).is_some();
        if removed {
            tracing::info!("Deleted state for user {}", user_id);
        }
        Ok(removed)
    }
}
