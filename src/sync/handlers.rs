use axum::extract::{Extension, Path};
use axum::Json;
use chrono::Utc;
use std::sync::Arc;

use super::protocol::{SyncPatch, snapshot};
use super::types::{DeleteResponse, SyncState, SyncWriteRequest};
use crate::error::{ApiError, require_user_id};
use crate::protocol::{Ack, ApiJson};
use crate::storage::store::RecordStore;

pub async fn handle_sync_read(
    Extension(store): Extension<Arc<dyn RecordStore>>,
    Path(user_id): Path<String>,
) -> Result<Json<SyncState>, ApiError> {
    let state = store.get_or_create(&user_id).await?;

    tracing::debug!(
        "Sync read for {}: {} expenses, {} income, {} notes",
        user_id,
        state.expenses.len(),
        state.income.len(),
        state.notes.len()
    );

    Ok(Json(snapshot(&state, store.variant())))
}

pub async fn handle_sync_write(
    Extension(store): Extension<Arc<dyn RecordStore>>,
    ApiJson(mut req): ApiJson<SyncWriteRequest>,
) -> Result<Json<Ack<SyncState>>, ApiError> {
    let user_id = require_user_id(req.user_id.take())?;
    let patch = SyncPatch::prepare(&user_id, req, Utc::now())?;

    tracing::info!(
        "Sync write for {} touching {:?}",
        user_id,
        patch.touched_fields()
    );

    let state = store
        .update(&user_id, Box::new(move |state| patch.apply(state)))
        .await?;

    Ok(Json(Ack::stored(snapshot(&state, store.variant()))))
}

pub async fn handle_sync_delete(
    Extension(store): Extension<Arc<dyn RecordStore>>,
    Path(user_id): Path<String>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let deleted = store.delete_user(&user_id).await?;

    if !deleted {
        tracing::debug!("Sync delete for unknown user {}", user_id);
    }

    Ok(Json(DeleteResponse {
        success: true,
        deleted,
    }))
}
