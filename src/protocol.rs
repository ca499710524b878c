//! HTTP Protocol
//!
//! Route paths, the JSON body extractor and the response envelopes shared by
//! every domain.

use axum::Json;
use axum::async_trait;
use axum::extract::{FromRequest, Request};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::ApiError;
use crate::storage::types::StoreVariant;

// --- API Endpoints ---

/// Health/status probe.
pub const ENDPOINT_HEALTH: &str = "/";
/// Monthly expense records: `GET /{userId}/{month}/{year}`, `POST` body.
pub const ENDPOINT_EXPENSES: &str = "/api/expenses";
/// Monthly income records, same shape as expenses.
pub const ENDPOINT_INCOME: &str = "/api/income";
/// One fleet per user: `GET /{userId}`, `POST` body.
pub const ENDPOINT_FLEET: &str = "/api/fleet";
/// Monthly notes: `GET /{userId}/{month}/{year}`, `POST` body.
pub const ENDPOINT_NOTES: &str = "/api/notes";
/// Full-state synchronization: `GET|DELETE /{userId}`, `POST` sparse patch.
pub const ENDPOINT_SYNC: &str = "/api/sync";
/// Media upload (`POST`) and removal (`DELETE`).
pub const ENDPOINT_UPLOAD: &str = "/api/upload";

/// Largest request body accepted; uploads carry file content inline.
pub const MAX_BODY_BYTES: usize = 50 * 1024 * 1024;

// --- Extractors ---

/// `Json<T>` whose rejection (bad syntax, wrong shape, missing content type)
/// answers through `ApiError` like every other failure.
#[derive(Debug)]
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::Validation(rejection.body_text()))?;
        Ok(Self(value))
    }
}

// --- Envelopes ---

/// Acknowledgment for mutating endpoints, echoing what was stored.
#[derive(Debug, Serialize)]
pub struct Ack<T: Serialize> {
    pub success: bool,
    pub data: T,
}

impl<T: Serialize> Ack<T> {
    pub fn stored(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub storage: StoreVariant,
    pub timestamp: DateTime<Utc>,
}
