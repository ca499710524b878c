use async_trait::async_trait;

use super::types::{MediaError, NewAsset, UploadedAsset};

pub const DEFAULT_RESOURCE_TYPE: &str = "image";

/// External storage for uploaded files.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Folder every user namespace is created under.
    fn root(&self) -> &str;

    async fn upload(&self, asset: NewAsset) -> Result<UploadedAsset, MediaError>;

    async fn remove(&self, public_id: &str, resource_type: &str) -> Result<(), MediaError>;
}
