//! Storage Data Types
//!
//! Per-user state and the records it aggregates. Items, note content, vehicles
//! and configuration entries are kept as opaque JSON values: the server stores
//! whatever the client sent and hands it back unchanged.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

const MONTH_MIN: i64 = 1;
const MONTH_MAX: i64 = 12;
const YEAR_MIN: i64 = 1;
const YEAR_MAX: i64 = 9999;

pub const DEFAULT_YEARS: [i64; 3] = [2024, 2025, 2026];

pub const DEFAULT_CATEGORIES: [&str; 10] = [
    "Housing",
    "Groceries",
    "Transport",
    "Health",
    "Education",
    "Leisure",
    "Clothing",
    "Utilities",
    "Insurance",
    "Other",
];

pub const DEFAULT_SUPPLIERS: [&str; 15] = [
    "Supermarket",
    "Bakery",
    "Butcher",
    "Greengrocer",
    "Pharmacy",
    "Gas Station",
    "Mechanic",
    "Electricity Company",
    "Water Company",
    "Internet Provider",
    "Mobile Carrier",
    "Restaurant",
    "Clothing Store",
    "Hardware Store",
    "Online Store",
];

pub const DEFAULT_PAYMENT_METHODS: [&str; 4] = ["Cash", "Debit Card", "Credit Card", "Bank Transfer"];

/// Which backend holds the state. Controls what the sync read surface exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StoreVariant {
    #[serde(rename = "memory")]
    Memory,
    #[serde(rename = "mongodb")]
    Mongo,
}

/// The two month-keyed item collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Expenses,
    Income,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKind::Expenses => write!(f, "expenses"),
            RecordKind::Income => write!(f, "income"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeyError {
    #[error("{0} is required")]
    Missing(&'static str),
    #[error("{field} is invalid: {value}")]
    Invalid { field: &'static str, value: String },
}

/// Normalized `(month, year)` storage key, rendered as `"{month}-{year}"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MonthKey {
    pub month: u32,
    pub year: u32,
}

impl MonthKey {
    /// Builds a key from JSON body fields. Accepts integers and integer strings.
    pub fn from_json(month: Option<&Value>, year: Option<&Value>) -> Result<Self, KeyError> {
        Ok(Self {
            month: json_component("month", month, MONTH_MIN, MONTH_MAX)?,
            year: json_component("year", year, YEAR_MIN, YEAR_MAX)?,
        })
    }

    /// Builds a key from URL path segments.
    pub fn from_path(month: &str, year: &str) -> Result<Self, KeyError> {
        Ok(Self {
            month: text_component("month", month, MONTH_MIN, MONTH_MAX)?,
            year: text_component("year", year, YEAR_MIN, YEAR_MAX)?,
        })
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.month, self.year)
    }
}

fn json_component(
    field: &'static str,
    value: Option<&Value>,
    min: i64,
    max: i64,
) -> Result<u32, KeyError> {
    match value {
        None | Some(Value::Null) => Err(KeyError::Missing(field)),
        Some(Value::String(text)) => text_component(field, text, min, max),
        Some(Value::Number(number)) => {
            let whole = number
                .as_i64()
                .or_else(|| number.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64));
            match whole {
                Some(n) => in_range(field, n, min, max),
                None => Err(KeyError::Invalid {
                    field,
                    value: number.to_string(),
                }),
            }
        }
        Some(other) => Err(KeyError::Invalid {
            field,
            value: other.to_string(),
        }),
    }
}

fn text_component(field: &'static str, text: &str, min: i64, max: i64) -> Result<u32, KeyError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(KeyError::Missing(field));
    }
    match trimmed.parse::<i64>() {
        Ok(n) => in_range(field, n, min, max),
        Err(_) => Err(KeyError::Invalid {
            field,
            value: text.to_string(),
        }),
    }
}

fn in_range(field: &'static str, n: i64, min: i64, max: i64) -> Result<u32, KeyError> {
    if (min..=max).contains(&n) {
        Ok(n as u32)
    } else {
        Err(KeyError::Invalid {
            field,
            value: n.to_string(),
        })
    }
}

/// Anything stored under a month key.
pub trait Keyed {
    fn key(&self) -> MonthKey;
}

/// One month of expense or income items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerRecord {
    pub user_id: String,
    pub month: u32,
    pub year: u32,
    #[serde(default = "empty_list")]
    pub items: Value,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

pub type ExpenseRecord = LedgerRecord;
pub type IncomeRecord = LedgerRecord;

impl LedgerRecord {
    /// The placeholder returned for a key that was never written.
    pub fn empty(user_id: &str, key: MonthKey) -> Self {
        Self {
            user_id: user_id.to_string(),
            month: key.month,
            year: key.year,
            items: empty_list(),
            updated_at: None,
        }
    }

    pub fn stamped(user_id: &str, key: MonthKey, items: Value, now: DateTime<Utc>) -> Self {
        Self {
            user_id: user_id.to_string(),
            month: key.month,
            year: key.year,
            items,
            updated_at: Some(now),
        }
    }
}

impl Keyed for LedgerRecord {
    fn key(&self) -> MonthKey {
        MonthKey {
            month: self.month,
            year: self.year,
        }
    }
}

/// Free-text note for one month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteRecord {
    pub user_id: String,
    pub month: u32,
    pub year: u32,
    #[serde(default = "empty_content")]
    pub content: Value,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl NoteRecord {
    pub fn empty(user_id: &str, key: MonthKey) -> Self {
        Self {
            user_id: user_id.to_string(),
            month: key.month,
            year: key.year,
            content: empty_content(),
            updated_at: None,
        }
    }

    pub fn stamped(user_id: &str, key: MonthKey, content: Value, now: DateTime<Utc>) -> Self {
        Self {
            user_id: user_id.to_string(),
            month: key.month,
            year: key.year,
            content,
            updated_at: Some(now),
        }
    }
}

impl Keyed for NoteRecord {
    fn key(&self) -> MonthKey {
        MonthKey {
            month: self.month,
            year: self.year,
        }
    }
}

/// A user's fleet. Fields other than `vehicles` are kept as sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fleet {
    #[serde(default = "empty_list")]
    pub vehicles: Value,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for Fleet {
    fn default() -> Self {
        Self {
            vehicles: empty_list(),
            updated_at: None,
            extra: Map::new(),
        }
    }
}

impl Fleet {
    pub fn stamped(vehicles: Value, now: DateTime<Utc>) -> Self {
        Self {
            vehicles,
            updated_at: Some(now),
            extra: Map::new(),
        }
    }

    /// Builds the replacement for a whole fleet object sent by a client.
    /// A missing `vehicles` means an empty fleet; `updatedAt` is always ours.
    pub fn replaced_by(mut fields: Map<String, Value>, now: DateTime<Utc>) -> Self {
        let vehicles = fields.remove("vehicles").unwrap_or_else(empty_list);
        fields.remove("updatedAt");
        Self {
            vehicles,
            updated_at: Some(now),
            extra: fields,
        }
    }

    pub fn vehicle_count(&self) -> usize {
        item_count(&self.vehicles)
    }
}

/// Month-keyed records in first-write order.
///
/// Overwriting a key keeps the record in its original position, so the
/// flattened list a client reads back is stable across edits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordBook<T>(Vec<T>);

impl<T> Default for RecordBook<T> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<T: Keyed> RecordBook<T> {
    pub fn get(&self, key: MonthKey) -> Option<&T> {
        self.0.iter().find(|record| record.key() == key)
    }

    /// Replaces the record at the same key, or appends it.
    pub fn upsert(&mut self, record: T) {
        let key = record.key();
        match self.0.iter_mut().find(|existing| existing.key() == key) {
            Some(slot) => *slot = record,
            None => self.0.push(record),
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn records(&self) -> &[T] {
        &self.0
    }
}

/// Reference lists exposed by the persistent variant's sync surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Configuration {
    pub system_users: Vec<Value>,
    pub years: Vec<Value>,
    pub categories: Vec<Value>,
    pub suppliers: Vec<Value>,
    pub payment_methods: Vec<Value>,
    pub maintenance: Vec<Value>,
    pub maintenance_types: Vec<Value>,
    pub maintenance_areas: Vec<Value>,
}

/// Everything stored for one user. In MongoDB this is one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserState {
    pub user_id: String,
    /// Bumped on every persistent write; a write only lands if the revision
    /// it read is still current.
    #[serde(default)]
    pub revision: i64,
    #[serde(default)]
    pub expenses: RecordBook<ExpenseRecord>,
    #[serde(default)]
    pub income: RecordBook<IncomeRecord>,
    #[serde(default)]
    pub notes: RecordBook<NoteRecord>,
    #[serde(default)]
    pub fleet: Fleet,
    #[serde(default)]
    pub system_users: Vec<Value>,
    #[serde(default = "default_years")]
    pub years: Vec<Value>,
    #[serde(default = "default_categories")]
    pub categories: Vec<Value>,
    #[serde(default = "default_suppliers")]
    pub suppliers: Vec<Value>,
    #[serde(default = "default_payment_methods")]
    pub payment_methods: Vec<Value>,
    #[serde(default)]
    pub maintenance: Vec<Value>,
    #[serde(default)]
    pub maintenance_types: Vec<Value>,
    #[serde(default)]
    pub maintenance_areas: Vec<Value>,
}

impl UserState {
    /// Fresh state with every field at its documented default.
    pub fn new(user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            revision: 0,
            expenses: RecordBook::default(),
            income: RecordBook::default(),
            notes: RecordBook::default(),
            fleet: Fleet::default(),
            system_users: Vec::new(),
            years: default_years(),
            categories: default_categories(),
            suppliers: default_suppliers(),
            payment_methods: default_payment_methods(),
            maintenance: Vec::new(),
            maintenance_types: Vec::new(),
            maintenance_areas: Vec::new(),
        }
    }

    pub fn book(&self, kind: RecordKind) -> &RecordBook<LedgerRecord> {
        match kind {
            RecordKind::Expenses => &self.expenses,
            RecordKind::Income => &self.income,
        }
    }

    pub fn book_mut(&mut self, kind: RecordKind) -> &mut RecordBook<LedgerRecord> {
        match kind {
            RecordKind::Expenses => &mut self.expenses,
            RecordKind::Income => &mut self.income,
        }
    }

    pub fn configuration(&self) -> Configuration {
        Configuration {
            system_users: self.system_users.clone(),
            years: self.years.clone(),
            categories: self.categories.clone(),
            suppliers: self.suppliers.clone(),
            payment_methods: self.payment_methods.clone(),
            maintenance: self.maintenance.clone(),
            maintenance_types: self.maintenance_types.clone(),
            maintenance_areas: self.maintenance_areas.clone(),
        }
    }
}

/// Lazy default-initialization as a pure function of what the store holds.
pub fn get_or_create(existing: Option<UserState>, user_id: &str) -> UserState {
    existing.unwrap_or_else(|| UserState::new(user_id))
}

/// Number of entries in an item list; zero when the client sent something else.
pub fn item_count(items: &Value) -> usize {
    items.as_array().map_or(0, Vec::len)
}

pub fn empty_list() -> Value {
    Value::Array(Vec::new())
}

pub fn empty_content() -> Value {
    Value::String(String::new())
}

fn default_years() -> Vec<Value> {
    DEFAULT_YEARS.iter().map(|year| Value::from(*year)).collect()
}

fn default_categories() -> Vec<Value> {
    strings(&DEFAULT_CATEGORIES)
}

fn default_suppliers() -> Vec<Value> {
    strings(&DEFAULT_SUPPLIERS)
}

fn default_payment_methods() -> Vec<Value> {
    strings(&DEFAULT_PAYMENT_METHODS)
}

fn strings(list: &[&str]) -> Vec<Value> {
    list.iter().map(|s| Value::from(*s)).collect()
}
