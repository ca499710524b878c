//! Household Finance Sync Backend
//!
//! A small HTTP service storing a finance tracker's per-user state: monthly
//! expenses and income, monthly notes, a vehicle fleet and reference lists.
//! It serves the main binary (`main.rs`) and the integration-style tests.
//!
//! ## Modules
//! - **`storage`**: Per-user state, the `RecordStore` trait and its in-memory and
//!   MongoDB backends.
//! - **`sync`**: Full-state synchronization (sparse patch, upsert-per-key, full replace).
//! - **`records`**: Single-record endpoints for expenses, income, fleet and notes.
//! - **`media`**: File uploads delegated to an external media provider.
//! - **`app`**, **`protocol`**, **`error`**, **`config`**: HTTP assembly, route constants
//!   and envelopes, the error taxonomy and runtime settings.

pub mod app;
pub mod config;
pub mod error;
pub mod media;
pub mod protocol;
pub mod records;
pub mod storage;
pub mod sync;

#[cfg(test)]
pub(crate) mod testing;
