use super::store::{RecordStore, StatePatch};
use super::types::*;
use crate::config::MongoSettings;

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use mongodb::bson::{self, Bson, Document, doc};
use mongodb::error::{Error as MongoError, ErrorKind, WriteFailure};
use mongodb::options::{IndexOptions, ReturnDocument};
use mongodb::{Client, Collection, IndexModel};

const USER_ID_FIELD: &str = "userId";
const REVISION_FIELD: &str = "revision";
const DUPLICATE_KEY: i32 = 11000;
const MAX_WRITE_ATTEMPTS: usize = 16;

/// Persistent backend: one MongoDB document per user id.
///
/// Lazy creation is a single upserting `find_one_and_update` so concurrent
/// first reads agree on one document. Writes are conditional on the document
/// revision they read: a replace that finds the revision moved on (or an
/// insert that finds the document already created) reloads and reapplies the
/// patch, so concurrent writes to different keys never drop each other.
pub struct MongoStore {
    users: Collection<UserState>,
}

impl MongoStore {
    /// Connects, verifies the server answers a ping and ensures the unique
    /// index on `userId` exists.
    pub async fn connect(settings: &MongoSettings) -> Result<Self> {
        let client = Client::with_uri_str(&settings.uri)
            .await
            .context("invalid MongoDB connection string")?;
        let database = client.database(&settings.database);

        database
            .run_command(doc! { "ping": 1 })
            .await
            .context("MongoDB did not answer ping")?;

        let users = database.collection::<UserState>(&settings.collection);
        let index = IndexModel::builder()
            .keys(doc! { USER_ID_FIELD: 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        users
            .create_index(index)
            .await
            .context("failed to create userId index")?;

        tracing::info!(
            "Connected to MongoDB database '{}' (collection '{}')",
            settings.database,
            settings.collection
        );

        Ok(Self { users })
    }
}

#[async_trait]
impl RecordStore for MongoStore {
    fn variant(&self) -> StoreVariant {
        StoreVariant::Mongo
    }

    async fn load(&self, user_id: &str) -> Result<Option<UserState>> {
        Ok(self.users.find_one(doc! { USER_ID_FIELD: user_id }).await?)
    }

    async fn get_or_create(&self, user_id: &str) -> Result<UserState> {
        let defaults = insert_defaults(user_id)?;

        let state = self
            .users
            .find_one_and_update(
                doc! { USER_ID_FIELD: user_id },
                doc! { "$setOnInsert": defaults },
            )
            .upsert(true)
            .return_document(ReturnDocument::After)
            .await?;

        state.ok_or_else(|| anyhow::anyhow!("upsert returned no document for user {}", user_id))
    }

    async fn update(&self, user_id: &str, patch: StatePatch) -> Result<UserState> {
        for attempt in 1..=MAX_WRITE_ATTEMPTS {
            match self.load(user_id).await? {
                Some(mut state) => {
                    let seen = state.revision;
                    patch(&mut state);
                    state.revision = seen + 1;

                    let result = self
                        .users
                        .replace_one(revision_filter(user_id, seen), &state)
                        .await?;
                    if result.matched_count > 0 {
                        return Ok(state);
                    }
                }
                None => {
                    let mut state = get_or_create(None, user_id);
                    patch(&mut state);
                    state.revision = 1;

                    match self.users.insert_one(&state).await {
                        Ok(_) => return Ok(state),
                        Err(err) if is_duplicate_key(&err) => {}
                        Err(err) => return Err(err.into()),
                    }
                }
            }
            tracing::debug!(
                "Concurrent write for user {} (attempt {}), reapplying",
                user_id,
                attempt
            );
        }

        bail!(
            "write for user {} kept conflicting after {} attempts",
            user_id,
            MAX_WRITE_ATTEMPTS
        )
    }

    async fn delete_user(&self, user_id: &str) -> Result<bool> {
        let result = self
            .users
            .delete_one(doc! { USER_ID_FIELD: user_id })
            .await?;
        if result.deleted_count > 0 {
            tracing::info!("Deleted document for user {}", user_id);
        }
        Ok(result.deleted_count > 0)
    }
}

/// The `$setOnInsert` body for a user's first document. `userId` is left out
/// since the upsert filter already writes it.
pub fn insert_defaults(user_id: &str) -> Result<Document> {
    let mut defaults = bson::to_document(&get_or_create(None, user_id))?;
    defaults.remove(USER_ID_FIELD);
    Ok(defaults)
}

/// Matches the user's document only while it is still at `revision`.
pub fn revision_filter(user_id: &str, revision: i64) -> Document {
    if revision == 0 {
        // documents stored before revisions existed have no field at all
        doc! { USER_ID_FIELD: user_id, REVISION_FIELD: { "$in": [0_i64, Bson::Null] } }
    } else {
        doc! { USER_ID_FIELD: user_id, REVISION_FIELD: revision }
    }
}

fn is_duplicate_key(err: &MongoError) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(write_error)) if write_error.code == DUPLICATE_KEY
    )
}
