use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MediaError {
    /// The provider refused or failed an upload. Carries its message.
    #[error("{0}")]
    Upload(String),
    #[error("{0}")]
    Delete(String),
}

/// Content handed to the provider under an already-chosen identifier.
#[derive(Debug, Clone)]
pub struct NewAsset {
    /// Data URI, remote URL or raw base64, forwarded untouched.
    pub content: String,
    pub public_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedAsset {
    pub url: String,
    pub public_id: String,
}

/// Body of `POST /api/upload`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadRequest {
    pub file: Option<String>,
    pub filename: Option<String>,
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub success: bool,
    pub url: String,
    pub public_id: String,
}

/// How a delete request relates to the caller's namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteScope {
    /// The asset lies in the folder of the `userId` that asked.
    Owned,
    /// No `userId` was sent, so ownership could not be checked.
    Unscoped,
}

/// Body of `DELETE /api/upload`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteAssetRequest {
    pub public_id: Option<String>,
    pub user_id: Option<String>,
    pub resource_type: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteAssetResponse {
    pub success: bool,
    pub public_id: String,
}
