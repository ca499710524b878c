use axum::extract::{Extension, Path};
use axum::Json;
use std::sync::Arc;

use super::types::{FleetView, SaveFleetRequest, SaveLedgerRequest, SaveNoteRequest};
use crate::error::{ApiError, require_user_id};
use crate::protocol::{Ack, ApiJson};
use crate::storage::store::RecordStore;
use crate::storage::types::{LedgerRecord, MonthKey, NoteRecord, RecordKind, item_count};

type MonthPath = Path<(String, String, String)>;

async fn read_ledger(
    kind: RecordKind,
    store: &dyn RecordStore,
    (user_id, month, year): (String, String, String),
) -> Result<Json<LedgerRecord>, ApiError> {
    let key = MonthKey::from_path(&month, &year)?;
    let record = store.get_record(&user_id, kind, key).await?;
    Ok(Json(record))
}

async fn write_ledger(
    kind: RecordKind,
    store: &dyn RecordStore,
    req: SaveLedgerRequest,
) -> Result<Json<Ack<LedgerRecord>>, ApiError> {
    let user_id = require_user_id(req.user_id)?;
    let key = MonthKey::from_json(req.month.as_ref(), req.year.as_ref())?;

    let record = store.put_record(&user_id, kind, key, req.items).await?;
    tracing::info!(
        "Saved {} {} for {} ({} items)",
        kind,
        key,
        user_id,
        item_count(&record.items)
    );

    Ok(Json(Ack::stored(record)))
}

pub async fn handle_get_expenses(
    Extension(store): Extension<Arc<dyn RecordStore>>,
    Path(path): MonthPath,
) -> Result<Json<LedgerRecord>, ApiError> {
    read_ledger(RecordKind::Expenses, store.as_ref(), path).await
}

pub async fn handle_save_expenses(
    Extension(store): Extension<Arc<dyn RecordStore>>,
    ApiJson(req): ApiJson<SaveLedgerRequest>,
) -> Result<Json<Ack<LedgerRecord>>, ApiError> {
    write_ledger(RecordKind::Expenses, store.as_ref(), req).await
}

pub async fn handle_get_income(
    Extension(store): Extension<Arc<dyn RecordStore>>,
    Path(path): MonthPath,
) -> Result<Json<LedgerRecord>, ApiError> {
    read_ledger(RecordKind::Income, store.as_ref(), path).await
}

pub async fn handle_save_income(
    Extension(store): Extension<Arc<dyn RecordStore>>,
    ApiJson(req): ApiJson<SaveLedgerRequest>,
) -> Result<Json<Ack<LedgerRecord>>, ApiError> {
    write_ledger(RecordKind::Income, store.as_ref(), req).await
}

pub async fn handle_get_fleet(
    Extension(store): Extension<Arc<dyn RecordStore>>,
    Path(user_id): Path<String>,
) -> Result<Json<FleetView>, ApiError> {
    let fleet = store.get_fleet(&user_id).await?;
    Ok(Json(FleetView { user_id, fleet }))
}

pub async fn handle_save_fleet(
    Extension(store): Extension<Arc<dyn RecordStore>>,
    ApiJson(req): ApiJson<SaveFleetRequest>,
) -> Result<Json<Ack<FleetView>>, ApiError> {
    let user_id = require_user_id(req.user_id)?;
    let fleet = store.put_fleet(&user_id, req.vehicles).await?;

    tracing::info!("Saved fleet for {} ({} vehicles)", user_id, fleet.vehicle_count());

    Ok(Json(Ack::stored(FleetView { user_id, fleet })))
}

pub async fn handle_get_note(
    Extension(store): Extension<Arc<dyn RecordStore>>,
    Path((user_id, month, year)): MonthPath,
) -> Result<Json<NoteRecord>, ApiError> {
    let key = MonthKey::from_path(&month, &year)?;
    let note = store.get_note(&user_id, key).await?;
    Ok(Json(note))
}

pub async fn handle_save_note(
    Extension(store): Extension<Arc<dyn RecordStore>>,
    ApiJson(req): ApiJson<SaveNoteRequest>,
) -> Result<Json<Ack<NoteRecord>>, ApiError> {
    let user_id = require_user_id(req.user_id)?;
    let key = MonthKey::from_json(req.month.as_ref(), req.year.as_ref())?;

    let note = store.put_note(&user_id, key, req.content).await?;
    tracing::info!("Saved note {} for {}", key, user_id);

    Ok(Json(Ack::stored(note)))
}
