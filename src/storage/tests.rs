//! Storage Module Tests
//!
//! Validates per-user state handling and the record store contract.
//!
//! ## Test Scopes
//! - **Keys**: Month/year parsing from JSON bodies and URL segments.
//! - **RecordBook**: Key-wise upsert and first-write ordering.
//! - **Defaults**: The state handed out for an unseen user.
//! - **Documents**: The BSON form of `UserState` and the write guards `MongoStore`
//!   sends. The round trip against a live server is not covered here.
//! - **MemoryStore**: Lazy creation, overwrite semantics, deletion.

#[cfg(test)]
mod tests {
    use crate::storage::document::{insert_defaults, revision_filter};
    use crate::storage::memory::MemoryStore;
    use crate::storage::store::RecordStore;
    use crate::storage::types::*;
    use chrono::{TimeZone, Utc};
    use mongodb::bson::{self, Bson, doc};
    use serde_json::{Value, json};
    use std::sync::Arc;

    fn key(month: u32, year: u32) -> MonthKey {
        MonthKey { month, year }
    }

    // ============================================================
    // MONTH KEY TESTS
    // ============================================================

    #[test]
    fn test_month_key_accepts_numbers_and_numeric_strings() {
        let from_numbers = MonthKey::from_json(Some(&json!(3)), Some(&json!(2025))).unwrap();
        let from_strings = MonthKey::from_json(Some(&json!("03")), Some(&json!("2025"))).unwrap();

        assert_eq!(from_numbers, key(3, 2025));
        assert_eq!(from_numbers, from_strings, "\"03\" and 3 should address the same record");
        assert_eq!(from_numbers.to_string(), "3-2025");
    }

    #[test]
    fn test_month_key_accepts_whole_floats() {
        let parsed = MonthKey::from_json(Some(&json!(12.0)), Some(&json!(2024))).unwrap();
        assert_eq!(parsed, key(12, 2024));
    }

    #[test]
    fn test_month_key_missing_fields() {
        assert_eq!(
            MonthKey::from_json(None, Some(&json!(2025))),
            Err(KeyError::Missing("month"))
        );
        assert_eq!(
            MonthKey::from_json(Some(&json!(1)), Some(&Value::Null)),
            Err(KeyError::Missing("year"))
        );
    }

    #[test]
    fn test_month_key_rejects_out_of_range_and_garbage() {
        assert!(MonthKey::from_json(Some(&json!(0)), Some(&json!(2025))).is_err());
        assert!(MonthKey::from_json(Some(&json!(13)), Some(&json!(2025))).is_err());
        assert!(MonthKey::from_json(Some(&json!("march")), Some(&json!(2025))).is_err());
        assert!(MonthKey::from_json(Some(&json!(1.5)), Some(&json!(2025))).is_err());
        assert!(MonthKey::from_json(Some(&json!([1])), Some(&json!(2025))).is_err());
        assert!(MonthKey::from_json(Some(&json!(1)), Some(&json!(-4))).is_err());
    }

    #[test]
    fn test_month_key_from_path() {
        assert_eq!(MonthKey::from_path("7", "2026").unwrap(), key(7, 2026));
        assert!(matches!(
            MonthKey::from_path("abc", "2026"),
            Err(KeyError::Invalid { field: "month", .. })
        ));
    }

    // ============================================================
    // RECORD BOOK TESTS
    // ============================================================

    #[test]
    fn test_record_book_upsert_replaces_in_place() {
        let mut book: RecordBook<LedgerRecord> = RecordBook::default();
        book.upsert(LedgerRecord::empty("u1", key(2, 2025)));
        book.upsert(LedgerRecord::empty("u1", key(1, 2025)));

        let mut replacement = LedgerRecord::empty("u1", key(2, 2025));
        replacement.items = json!([{"amount": 10}]);
        book.upsert(replacement);

        assert_eq!(book.len(), 2);
        // first-write order is kept: month 2 was written first
        assert_eq!(book.records()[0].month, 2);
        assert_eq!(book.records()[0].items, json!([{"amount": 10}]));
        assert_eq!(book.records()[1].month, 1);
    }

    #[test]
    fn test_record_book_get_missing_key() {
        let book: RecordBook<NoteRecord> = RecordBook::default();
        assert!(book.get(key(1, 2025)).is_none());
        assert!(book.is_empty());
    }

    // ============================================================
    // DEFAULT STATE TESTS
    // ============================================================

    #[test]
    fn test_get_or_create_builds_documented_defaults() {
        let state = get_or_create(None, "alice");

        assert_eq!(state.user_id, "alice");
        assert!(state.expenses.is_empty());
        assert!(state.income.is_empty());
        assert!(state.notes.is_empty());
        assert_eq!(state.fleet.vehicles, json!([]));
        assert!(state.system_users.is_empty());
        assert_eq!(state.years, vec![json!(2024), json!(2025), json!(2026)]);
        assert_eq!(state.categories.len(), 10);
        assert_eq!(state.suppliers.len(), 15);
        assert_eq!(state.payment_methods.len(), 4);
        assert!(state.maintenance.is_empty());
        assert!(state.maintenance_types.is_empty());
        assert!(state.maintenance_areas.is_empty());
    }

    #[test]
    fn test_get_or_create_keeps_existing_state() {
        let mut existing = UserState::new("bob");
        existing.years = vec![json!(1999)];

        let state = get_or_create(Some(existing.clone()), "bob");
        assert_eq!(state, existing);
    }

    #[test]
    fn test_partial_document_fills_defaults() {
        // documents written before a field existed still load
        let state: UserState = serde_json::from_value(json!({
            "userId": "carol",
            "expenses": [{"userId": "carol", "month": 1, "year": 2025, "items": [1, 2]}]
        }))
        .unwrap();

        assert_eq!(state.expenses.len(), 1);
        assert_eq!(state.payment_methods.len(), 4);
        assert_eq!(state.fleet.vehicles, json!([]));
    }

    #[test]
    fn test_payloads_are_kept_as_sent() {
        let note: NoteRecord = serde_json::from_value(json!({
            "userId": "ivy", "month": 1, "year": 2025, "content": {"text": "hi", "pinned": true}
        }))
        .unwrap();
        let blank: NoteRecord =
            serde_json::from_value(json!({"userId": "ivy", "month": 1, "year": 2025})).unwrap();
        let record: LedgerRecord = serde_json::from_value(json!({
            "userId": "ivy", "month": 1, "year": 2025, "items": {"a": 1}
        }))
        .unwrap();

        assert_eq!(note.content, json!({"text": "hi", "pinned": true}));
        assert_eq!(blank.content, json!(""));
        assert_eq!(record.items, json!({"a": 1}));
        assert_eq!(item_count(&record.items), 0);
    }

    #[test]
    fn test_fleet_replacement_keeps_extra_fields() {
        let now = Utc::now();
        let fields = json!({"label": "work vans", "vehicles": [1], "updatedAt": "stale"});
        let Value::Object(fields) = fields else { unreachable!() };

        let fleet = Fleet::replaced_by(fields, now);

        assert_eq!(fleet.vehicles, json!([1]));
        assert_eq!(fleet.updated_at, Some(now));
        assert_eq!(fleet.extra.get("label"), Some(&json!("work vans")));
        assert!(!fleet.extra.contains_key("updatedAt"));
        assert_eq!(
            serde_json::to_value(&fleet).unwrap()["label"],
            "work vans",
            "extra fields are returned at the top level"
        );

        let empty = Fleet::replaced_by(serde_json::Map::new(), now);
        assert_eq!(empty.vehicles, json!([]));
    }

    // ============================================================
    // DOCUMENT TESTS
    // ============================================================

    fn populated_state() -> UserState {
        let at = Utc.with_ymd_and_hms(2025, 3, 14, 9, 26, 53).unwrap();
        let mut state = UserState::new("jack");
        state.revision = 7;
        state.expenses.upsert(LedgerRecord::stamped(
            "jack",
            key(3, 2025),
            json!([{"desc": "rent", "value": 900.5, "paid": true}, null]),
            at,
        ));
        state.expenses.upsert(LedgerRecord::empty("jack", key(1, 2025)));
        state.notes.upsert(NoteRecord::stamped("jack", key(3, 2025), json!({"rich": ["x"]}), at));
        let Value::Object(fleet) = json!({"vehicles": [{"plate": "JK-01"}], "label": "family"}) else {
            unreachable!()
        };
        state.fleet = Fleet::replaced_by(fleet, at);
        state.years = vec![json!(2025), json!("custom")];
        state
    }

    #[test]
    fn test_user_state_round_trips_through_bson() {
        let state = populated_state();

        let document = bson::to_document(&state).unwrap();
        let back: UserState = bson::from_document(document.clone()).unwrap();

        assert_eq!(back, state);
        // record books are stored as plain arrays, in first-write order
        let expenses = document.get_array("expenses").unwrap();
        assert_eq!(expenses.len(), 2);
        let first: LedgerRecord = bson::from_bson(expenses[0].clone()).unwrap();
        assert_eq!(first.key(), key(3, 2025));
        assert_eq!(document.get_i64("revision").unwrap(), 7);
    }

    #[test]
    fn test_insert_defaults_omit_user_id() {
        let mut defaults = insert_defaults("kate").unwrap();

        assert!(!defaults.contains_key("userId"));
        assert_eq!(defaults.get_i64("revision").unwrap(), 0);

        // what the upsert ends up storing
        defaults.insert("userId", "kate");
        let stored: UserState = bson::from_document(defaults).unwrap();
        assert_eq!(stored, UserState::new("kate"));
    }

    #[test]
    fn test_partial_bson_document_fills_defaults() {
        let stored: UserState = bson::from_document(doc! {
            "userId": "liam",
            "notes": [{"userId": "liam", "month": 2_i32, "year": 2024_i32}],
        })
        .unwrap();

        assert_eq!(stored.revision, 0);
        assert_eq!(stored.notes.records()[0].content, json!(""));
        assert!(stored.notes.records()[0].updated_at.is_none());
        assert_eq!(stored.categories.len(), 10);
        assert_eq!(stored.years, vec![json!(2024), json!(2025), json!(2026)]);
        assert_eq!(stored.fleet, Fleet::default());
    }

    #[test]
    fn test_revision_filter_pins_the_read_revision() {
        assert_eq!(
            revision_filter("mia", 4),
            doc! { "userId": "mia", "revision": 4_i64 }
        );
        // a document that predates revisions has no field to compare
        assert_eq!(
            revision_filter("mia", 0),
            doc! { "userId": "mia", "revision": { "$in": [0_i64, Bson::Null] } }
        );
    }

    // ============================================================
    // MEMORY STORE TESTS
    // ============================================================

    #[tokio::test]
    async fn test_concurrent_writes_to_different_keys_all_land() {
        let store: Arc<dyn RecordStore> = Arc::new(MemoryStore::new());

        let writes = (1..=12).map(|month| {
            let store = store.clone();
            tokio::spawn(async move {
                store
                    .put_record("nina", RecordKind::Expenses, key(month, 2025), json!([month]))
                    .await
            })
        });
        for write in writes.collect::<Vec<_>>() {
            write.await.unwrap().unwrap();
        }

        let state = store.get_or_create("nina").await.unwrap();
        assert_eq!(state.expenses.len(), 12);
    }

    #[tokio::test]
    async fn test_memory_store_creates_user_on_first_read() {
        let store = MemoryStore::new();
        assert!(!store.contains("dave"));

        let state = store.get_or_create("dave").await.unwrap();

        assert_eq!(state, UserState::new("dave"));
        assert!(store.contains("dave"));
        assert_eq!(store.user_count(), 1);
    }

    #[tokio::test]
    async fn test_memory_store_load_does_not_create() {
        let store = MemoryStore::new();
        assert!(store.load("ghost").await.unwrap().is_none());
        assert_eq!(store.user_count(), 0);
    }

    #[tokio::test]
    async fn test_get_record_returns_structural_default() {
        let store = MemoryStore::new();

        let record = store
            .get_record("erin", RecordKind::Income, key(4, 2025))
            .await
            .unwrap();

        assert_eq!(record, LedgerRecord::empty("erin", key(4, 2025)));
        assert!(record.updated_at.is_none());
    }

    #[tokio::test]
    async fn test_put_record_overwrites_whole_record() {
        let store = MemoryStore::new();
        let k = key(5, 2025);

        store
            .put_record("frank", RecordKind::Expenses, k, json!(["a", "b"]))
            .await
            .unwrap();
        store
            .put_record("frank", RecordKind::Expenses, k, json!(["c"]))
            .await
            .unwrap();

        let record = store
            .get_record("frank", RecordKind::Expenses, k)
            .await
            .unwrap();
        assert_eq!(record.items, json!(["c"]));
        assert!(record.updated_at.is_some());

        // kinds are independent
        let income = store.get_record("frank", RecordKind::Income, k).await.unwrap();
        assert_eq!(income.items, json!([]));
    }

    #[tokio::test]
    async fn test_put_note_and_fleet() {
        let store = MemoryStore::new();

        store
            .put_note("gina", key(1, 2026), json!("pay the plumber"))
            .await
            .unwrap();
        store
            .put_fleet("gina", json!([{"plate": "ABC-1234"}]))
            .await
            .unwrap();

        let note = store.get_note("gina", key(1, 2026)).await.unwrap();
        assert_eq!(note.content, "pay the plumber");

        let fleet = store.get_fleet("gina").await.unwrap();
        assert_eq!(fleet.vehicles, json!([{"plate": "ABC-1234"}]));
        assert!(fleet.updated_at.is_some());
    }

    #[tokio::test]
    async fn test_delete_user() {
        let store = MemoryStore::new();
        store.get_or_create("henry").await.unwrap();

        assert!(store.delete_user("henry").await.unwrap());
        assert!(!store.delete_user("henry").await.unwrap());
        assert_eq!(store.user_count(), 0);
    }
}
