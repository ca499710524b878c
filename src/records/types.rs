use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::storage::types::{Fleet, empty_content, empty_list};

/// Body of `POST /api/expenses` and `POST /api/income`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveLedgerRequest {
    pub user_id: Option<String>,
    pub month: Option<Value>,
    pub year: Option<Value>,
    #[serde(default = "empty_list")]
    pub items: Value,
}

/// Body of `POST /api/notes`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveNoteRequest {
    pub user_id: Option<String>,
    pub month: Option<Value>,
    pub year: Option<Value>,
    #[serde(default = "empty_content")]
    pub content: Value,
}

/// Body of `POST /api/fleet`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveFleetRequest {
    pub user_id: Option<String>,
    #[serde(default = "empty_list")]
    pub vehicles: Value,
}

/// A user's fleet as returned over HTTP.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FleetView {
    pub user_id: String,
    #[serde(flatten)]
    pub fleet: Fleet,
}
