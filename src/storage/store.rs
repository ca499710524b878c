//! Record Store Contract
//!
//! The seam between HTTP handlers and persistence. Backends implement the four
//! primitive operations; the per-record helpers are provided on top of them so
//! every backend gets identical overwrite and default semantics.

use super::types::*;

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;

/// A mutation applied to one user's state while the backend holds it.
///
/// A backend may run it more than once against fresher copies of the state
/// when a concurrent write got there first.
pub type StatePatch = Box<dyn Fn(&mut UserState) + Send>;

#[async_trait]
pub trait RecordStore: Send + Sync {
    fn variant(&self) -> StoreVariant;

    /// Returns the stored state without creating it.
    async fn load(&self, user_id: &str) -> Result<Option<UserState>>;

    /// Returns the stored state, creating and storing the default one first
    /// if the user has never been seen.
    async fn get_or_create(&self, user_id: &str) -> Result<UserState>;

    /// Applies `patch` to the user's state (created if absent) and stores the
    /// result. Returns the state as stored.
    async fn update(&self, user_id: &str, patch: StatePatch) -> Result<UserState>;

    /// Removes the user entirely. Returns whether anything was removed.
    async fn delete_user(&self, user_id: &str) -> Result<bool>;

    async fn get_record(&self, user_id: &str, kind: RecordKind, key: MonthKey) -> Result<LedgerRecord> {
        let state = self.get_or_create(user_id).await?;
        Ok(state
            .book(kind)
            .get(key)
            .cloned()
            .unwrap_or_else(|| LedgerRecord::empty(user_id, key)))
    }

    async fn put_record(
        &self,
        user_id: &str,
        kind: RecordKind,
        key: MonthKey,
        items: Value,
    ) -> Result<LedgerRecord> {
        let record = LedgerRecord::stamped(user_id, key, items, Utc::now());
        let stored = record.clone();
        self.update(
            user_id,
            Box::new(move |state| state.book_mut(kind).upsert(stored.clone())),
        )
        .await?;
        tracing::debug!("Stored {} record {} for user {}", kind, key, user_id);
        Ok(record)
    }

    async fn get_note(&self, user_id: &str, key: MonthKey) -> Result<NoteRecord> {
        let state = self.get_or_create(user_id).await?;
        Ok(state
            .notes
            .get(key)
            .cloned()
            .unwrap_or_else(|| NoteRecord::empty(user_id, key)))
    }

    async fn put_note(&self, user_id: &str, key: MonthKey, content: Value) -> Result<NoteRecord> {
        let note = NoteRecord::stamped(user_id, key, content, Utc::now());
        let stored = note.clone();
        self.update(
            user_id,
            Box::new(move |state| state.notes.upsert(stored.clone())),
        )
        .await?;
        tracing::debug!("Stored note {} for user {}", key, user_id);
        Ok(note)
    }

    async fn get_fleet(&self, user_id: &str) -> Result<Fleet> {
        Ok(self.get_or_create(user_id).await?.fleet)
    }

    async fn put_fleet(&self, user_id: &str, vehicles: Value) -> Result<Fleet> {
        let fleet = Fleet::stamped(vehicles, Utc::now());
        let stored = fleet.clone();
        self.update(user_id, Box::new(move |state| state.fleet = stored.clone()))
            .await?;
        tracing::debug!("Stored fleet for user {}", user_id);
        Ok(fleet)
    }
}
