//! Sync Protocol Module
//!
//! Full-state synchronization between a client and its stored `UserState`.
//!
//! ## Write semantics
//! A sync write is applied at three levels:
//! 1. **Sparse patch** at the top level: only fields present in the payload are touched.
//! 2. **Upsert-per-key** inside `expenses`, `income` and `notes`: each incoming record
//!    replaces the stored record with the same `(month, year)`; other records survive.
//!    Collections never shrink through sync.
//! 3. **Full replace** of each record, of the fleet and of every reference list.
//!
//! ## Submodules
//! - **`protocol`**: Validation, stamping and application of a sync payload.
//! - **`handlers`**: Axum handlers for `GET`, `POST` and `DELETE /api/sync`.
//! - **`types`**: Wire DTOs.

pub mod handlers;
pub mod protocol;
pub mod types;
