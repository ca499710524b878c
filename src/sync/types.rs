//! Sync Data Types
//!
//! Payloads for `/api/sync`. Every top-level field of a write is optional;
//! absence means "leave the stored value alone".

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::storage::types::{Configuration, Fleet, LedgerRecord, NoteRecord, empty_content, empty_list};

/// Body of `POST /api/sync`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncWriteRequest {
    pub user_id: Option<String>,
    pub expenses: Option<Vec<IncomingLedgerRecord>>,
    pub income: Option<Vec<IncomingLedgerRecord>>,
    pub notes: Option<Vec<IncomingNote>>,
    pub fleet: Option<IncomingFleet>,
    pub system_users: Option<Vec<Value>>,
    pub years: Option<Vec<Value>>,
    pub categories: Option<Vec<Value>>,
    pub suppliers: Option<Vec<Value>>,
    pub payment_methods: Option<Vec<Value>>,
    pub maintenance: Option<Vec<Value>>,
    pub maintenance_types: Option<Vec<Value>>,
    pub maintenance_areas: Option<Vec<Value>>,
}

/// An expense or income record as sent by the client. `month`/`year` arrive
/// as numbers or numeric strings and are normalized before keying.
#[derive(Debug, Deserialize)]
pub struct IncomingLedgerRecord {
    pub month: Option<Value>,
    pub year: Option<Value>,
    #[serde(default = "empty_list")]
    pub items: Value,
}

#[derive(Debug, Deserialize)]
pub struct IncomingNote {
    pub month: Option<Value>,
    pub year: Option<Value>,
    #[serde(default = "empty_content")]
    pub content: Value,
}

/// A whole fleet object as sent; it replaces the stored one field for field.
pub type IncomingFleet = Map<String, Value>;

/// Body of `GET /api/sync/{userId}` and of the `POST` acknowledgment.
///
/// Record lists are in first-write order. The reference lists are only
/// present when the backend is the persistent one.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncState {
    pub user_id: String,
    pub expenses: Vec<LedgerRecord>,
    pub income: Vec<LedgerRecord>,
    pub notes: Vec<NoteRecord>,
    pub fleet: Fleet,
    #[serde(flatten)]
    pub configuration: Option<Configuration>,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub success: bool,
    pub deleted: bool,
}
