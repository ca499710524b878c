use chrono::{DateTime, Utc};
use serde_json::Value;

use super::types::*;
use crate::error::ApiError;
use crate::storage::types::*;

/// A validated sync write, ready to apply to one user's state.
///
/// Records are already keyed and stamped, so applying the patch cannot fail
/// and applying it twice gives the same state.
#[derive(Debug, Default)]
pub struct SyncPatch {
    pub expenses: Option<Vec<LedgerRecord>>,
    pub income: Option<Vec<LedgerRecord>>,
    pub notes: Option<Vec<NoteRecord>>,
    pub fleet: Option<Fleet>,
    pub system_users: Option<Vec<Value>>,
    pub years: Option<Vec<Value>>,
    pub categories: Option<Vec<Value>>,
    pub suppliers: Option<Vec<Value>>,
    pub payment_methods: Option<Vec<Value>>,
    pub maintenance: Option<Vec<Value>>,
    pub maintenance_types: Option<Vec<Value>>,
    pub maintenance_areas: Option<Vec<Value>>,
}

impl SyncPatch {
    /// Validates every record key in `request`. One malformed record rejects
    /// the whole write.
    pub fn prepare(
        user_id: &str,
        request: SyncWriteRequest,
        now: DateTime<Utc>,
    ) -> Result<Self, ApiError> {
        let expenses = request
            .expenses
            .map(|records| ledger_records(user_id, "expenses", records, now))
            .transpose()?;
        let income = request
            .income
            .map(|records| ledger_records(user_id, "income", records, now))
            .transpose()?;
        let notes = request
            .notes
            .map(|records| note_records(user_id, records, now))
            .transpose()?;
        let fleet = request.fleet.map(|fields| Fleet::replaced_by(fields, now));

        Ok(Self {
            expenses,
            income,
            notes,
            fleet,
            system_users: request.system_users,
            years: request.years,
            categories: request.categories,
            suppliers: request.suppliers,
            payment_methods: request.payment_methods,
            maintenance: request.maintenance,
            maintenance_types: request.maintenance_types,
            maintenance_areas: request.maintenance_areas,
        })
    }

    pub fn apply(&self, state: &mut UserState) {
        for record in self.expenses.iter().flatten() {
            state.expenses.upsert(record.clone());
        }
        for record in self.income.iter().flatten() {
            state.income.upsert(record.clone());
        }
        for note in self.notes.iter().flatten() {
            state.notes.upsert(note.clone());
        }
        if let Some(fleet) = &self.fleet {
            state.fleet = fleet.clone();
        }

        replace(&mut state.system_users, &self.system_users);
        replace(&mut state.years, &self.years);
        replace(&mut state.categories, &self.categories);
        replace(&mut state.suppliers, &self.suppliers);
        replace(&mut state.payment_methods, &self.payment_methods);
        replace(&mut state.maintenance, &self.maintenance);
        replace(&mut state.maintenance_types, &self.maintenance_types);
        replace(&mut state.maintenance_areas, &self.maintenance_areas);
    }

    /// Names of the top-level fields this patch touches, for logging.
    pub fn touched_fields(&self) -> Vec<&'static str> {
        let present = [
            ("expenses", self.expenses.is_some()),
            ("income", self.income.is_some()),
            ("notes", self.notes.is_some()),
            ("fleet", self.fleet.is_some()),
            ("systemUsers", self.system_users.is_some()),
            ("years", self.years.is_some()),
            ("categories", self.categories.is_some()),
            ("suppliers", self.suppliers.is_some()),
            ("paymentMethods", self.payment_methods.is_some()),
            ("maintenance", self.maintenance.is_some()),
            ("maintenanceTypes", self.maintenance_types.is_some()),
            ("maintenanceAreas", self.maintenance_areas.is_some()),
        ];
        present
            .into_iter()
            .filter_map(|(name, is_present)| is_present.then_some(name))
            .collect()
    }
}

/// The full-state read for a user.
pub fn snapshot(state: &UserState, variant: StoreVariant) -> SyncState {
    SyncState {
        user_id: state.user_id.clone(),
        expenses: state.expenses.records().to_vec(),
        income: state.income.records().to_vec(),
        notes: state.notes.records().to_vec(),
        fleet: state.fleet.clone(),
        configuration: match variant {
            StoreVariant::Mongo => Some(state.configuration()),
            StoreVariant::Memory => None,
        },
    }
}

fn replace(slot: &mut Vec<Value>, incoming: &Option<Vec<Value>>) {
    if let Some(list) = incoming {
        slot.clone_from(list);
    }
}

fn ledger_records(
    user_id: &str,
    field: &str,
    records: Vec<IncomingLedgerRecord>,
    now: DateTime<Utc>,
) -> Result<Vec<LedgerRecord>, ApiError> {
    records
        .into_iter()
        .enumerate()
        .map(|(index, record)| {
            let key = MonthKey::from_json(record.month.as_ref(), record.year.as_ref())
                .map_err(|e| ApiError::Validation(format!("{}[{}]: {}", field, index, e)))?;
            Ok(LedgerRecord::stamped(user_id, key, record.items, now))
        })
        .collect()
}

fn note_records(
    user_id: &str,
    records: Vec<IncomingNote>,
    now: DateTime<Utc>,
) -> Result<Vec<NoteRecord>, ApiError> {
    records
        .into_iter()
        .enumerate()
        .map(|(index, note)| {
            let key = MonthKey::from_json(note.month.as_ref(), note.year.as_ref())
                .map_err(|e| ApiError::Validation(format!("notes[{}]: {}", index, e)))?;
            Ok(NoteRecord::stamped(user_id, key, note.content, now))
        })
        .collect()
}
