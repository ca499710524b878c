use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use sha1::{Digest, Sha1};

use super::blob::BlobStore;
use super::types::{MediaError, NewAsset, UploadedAsset};
use crate::config::MediaSettings;

/// Signed REST client for the Cloudinary upload API.
///
/// Requests are form-encoded and signed with SHA-1 over the sorted parameters
/// followed by the API secret. Failures are reported once; there is no retry.
pub struct CloudinaryClient {
    http_client: reqwest::Client,
    settings: MediaSettings,
}

#[derive(Debug, Deserialize)]
struct ProviderResponse {
    secure_url: Option<String>,
    url: Option<String>,
    public_id: Option<String>,
    result: Option<String>,
    error: Option<ProviderError>,
}

#[derive(Debug, Deserialize)]
struct ProviderError {
    message: String,
}

impl CloudinaryClient {
    pub fn new(settings: MediaSettings) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            settings,
        }
    }

    fn endpoint(&self, resource_type: &str, action: &str) -> String {
        format!(
            "{}/{}/{}/{}",
            self.settings.api_base.trim_end_matches('/'),
            self.settings.cloud_name,
            resource_type,
            action
        )
    }

    /// Signature over `params` (excluding `file`, `api_key` and
    /// `resource_type`, which the provider does not sign).
    pub fn sign(&self, params: &[(&str, String)]) -> String {
        signature(params, &self.settings.api_secret)
    }

    /// Adds timestamp, api key and signature to `params`.
    fn signed_form(&self, mut params: Vec<(&'static str, String)>) -> Vec<(&'static str, String)> {
        params.push(("timestamp", Utc::now().timestamp().to_string()));
        let signature = self.sign(&params);
        params.push(("api_key", self.settings.api_key.clone()));
        params.push(("signature", signature));
        params
    }

    async fn post(&self, url: String, form: &[(&str, String)]) -> Result<ProviderResponse, String> {
        let response = self
            .http_client
            .post(url)
            .form(form)
            .send()
            .await
            .map_err(|e| e.to_string())?;
        let status = response.status();
        let body: ProviderResponse = response
            .json()
            .await
            .map_err(|e| format!("unreadable provider response ({}): {}", status, e))?;

        if let Some(error) = body.error {
            return Err(error.message);
        }
        Ok(body)
    }
}

pub fn signature(params: &[(&str, String)], secret: &str) -> String {
    let mut signed: Vec<&(&str, String)> = params
        .iter()
        .filter(|(name, _)| !matches!(*name, "file" | "api_key" | "resource_type"))
        .collect();
    signed.sort_by(|a, b| a.0.cmp(b.0));

    let payload = signed
        .iter()
        .map(|(name, value)| format!("{}={}", name, value))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha1::new();
    hasher.update(payload.as_bytes());
    hasher.update(secret.as_bytes());
    hex::encode(hasher.finalize())
}

#[async_trait]
impl BlobStore for CloudinaryClient {
    fn root(&self) -> &str {
        &self.settings.folder
    }

    async fn upload(&self, asset: NewAsset) -> Result<UploadedAsset, MediaError> {
        let mut form = self.signed_form(vec![("public_id", asset.public_id.clone())]);
        form.push(("file", asset.content));

        let body = self
            .post(self.endpoint("auto", "upload"), &form)
            .await
            .map_err(MediaError::Upload)?;

        match (body.secure_url.or(body.url), body.public_id) {
            (Some(url), Some(public_id)) => {
                tracing::info!("Uploaded asset {}", public_id);
                Ok(UploadedAsset { url, public_id })
            }
            _ => Err(MediaError::Upload(
                "provider response is missing url or public_id".to_string(),
            )),
        }
    }

    async fn remove(&self, public_id: &str, resource_type: &str) -> Result<(), MediaError> {
        let form = self.signed_form(vec![("public_id", public_id.to_string())]);

        let body = self
            .post(self.endpoint(resource_type, "destroy"), &form)
            .await
            .map_err(MediaError::Delete)?;

        match body.result.as_deref() {
            Some("ok") => {
                tracing::info!("Deleted asset {}", public_id);
                Ok(())
            }
            Some("not found") => {
                tracing::warn!("Asset {} was already gone", public_id);
                Ok(())
            }
            other => Err(MediaError::Delete(format!(
                "provider answered {:?} for {}",
                other, public_id
            ))),
        }
    }
}
