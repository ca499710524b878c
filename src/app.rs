//! HTTP Application
//!
//! Assembles the router. Shared services are injected as `Extension` layers and
//! constructed once at startup, so tests can build an isolated app per case.

use axum::extract::{DefaultBodyLimit, Extension};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::media::blob::BlobStore;
use crate::media::handlers::{handle_delete_upload, handle_upload};
use crate::protocol::*;
use crate::records::handlers::*;
use crate::storage::store::RecordStore;
use crate::sync::handlers::{handle_sync_delete, handle_sync_read, handle_sync_write};

pub const SERVICE_NAME: &str = "finance-sync";

pub fn build_router(store: Arc<dyn RecordStore>, blobs: Option<Arc<dyn BlobStore>>) -> Router {
    let mut app = Router::new()
        .route(ENDPOINT_HEALTH, get(handle_health))
        .route(ENDPOINT_EXPENSES, post(handle_save_expenses))
        .route(
            &format!("{}/:user_id/:month/:year", ENDPOINT_EXPENSES),
            get(handle_get_expenses),
        )
        .route(ENDPOINT_INCOME, post(handle_save_income))
        .route(
            &format!("{}/:user_id/:month/:year", ENDPOINT_INCOME),
            get(handle_get_income),
        )
        .route(ENDPOINT_FLEET, post(handle_save_fleet))
        .route(&format!("{}/:user_id", ENDPOINT_FLEET), get(handle_get_fleet))
        .route(ENDPOINT_NOTES, post(handle_save_note))
        .route(
            &format!("{}/:user_id/:month/:year", ENDPOINT_NOTES),
            get(handle_get_note),
        )
        .route(ENDPOINT_SYNC, post(handle_sync_write))
        .route(
            &format!("{}/:user_id", ENDPOINT_SYNC),
            get(handle_sync_read).delete(handle_sync_delete),
        );

    match blobs {
        Some(blobs) => {
            app = app
                .route(
                    ENDPOINT_UPLOAD,
                    post(handle_upload).delete(handle_delete_upload),
                )
                .layer(Extension(blobs));
        }
        None => {
            tracing::info!("Media provider not configured, {} is disabled", ENDPOINT_UPLOAD);
        }
    }

    app.layer(Extension(store))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(CorsLayer::permissive())
}

async fn handle_health(Extension(store): Extension<Arc<dyn RecordStore>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: SERVICE_NAME,
        storage: store.variant(),
        timestamp: Utc::now(),
    })
}
