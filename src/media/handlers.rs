use axum::extract::Extension;
use axum::Json;
use chrono::Utc;
use std::sync::Arc;

use super::blob::{BlobStore, DEFAULT_RESOURCE_TYPE};
use super::naming::{asset_public_id, belongs_to, namespace};
use super::types::*;
use crate::error::ApiError;
use crate::protocol::ApiJson;

pub async fn handle_upload(
    Extension(blobs): Extension<Arc<dyn BlobStore>>,
    ApiJson(req): ApiJson<UploadRequest>,
) -> Result<Json<UploadResponse>, ApiError> {
    let content = match req.file {
        Some(file) if !file.is_empty() => file,
        _ => return Err(ApiError::missing("file")),
    };

    let folder = namespace(blobs.root(), req.user_id.as_deref());
    let public_id = asset_public_id(&folder, req.filename.as_deref(), Utc::now().timestamp_millis());

    tracing::debug!("Uploading {} ({} bytes)", public_id, content.len());

    let asset = blobs.upload(NewAsset { content, public_id }).await?;

    Ok(Json(UploadResponse {
        success: true,
        url: asset.url,
        public_id: asset.public_id,
    }))
}

pub async fn handle_delete_upload(
    Extension(blobs): Extension<Arc<dyn BlobStore>>,
    ApiJson(req): ApiJson<DeleteAssetRequest>,
) -> Result<Json<DeleteAssetResponse>, ApiError> {
    let public_id = match req.public_id {
        Some(id) if !id.trim().is_empty() => id,
        _ => return Err(ApiError::missing("publicId")),
    };

    if delete_scope(blobs.root(), req.user_id.as_deref(), &public_id)? == DeleteScope::Unscoped {
        tracing::warn!("Deleting {} without a userId, ownership not checked", public_id);
    }

    let resource_type = req.resource_type.as_deref().unwrap_or(DEFAULT_RESOURCE_TYPE);
    blobs.remove(&public_id, resource_type).await?;

    Ok(Json(DeleteAssetResponse {
        success: true,
        public_id,
    }))
}

/// Rejects a delete of an asset outside the requesting user's folder.
pub fn delete_scope(
    root: &str,
    user_id: Option<&str>,
    public_id: &str,
) -> Result<DeleteScope, ApiError> {
    let Some(user_id) = user_id else {
        return Ok(DeleteScope::Unscoped);
    };
    if belongs_to(&namespace(root, Some(user_id)), public_id) {
        Ok(DeleteScope::Owned)
    } else {
        Err(ApiError::Forbidden(format!(
            "{} does not belong to user {}",
            public_id, user_id
        )))
    }
}
