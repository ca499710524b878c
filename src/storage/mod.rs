//! Record Store Module
//!
//! Per-user persistence for the finance tracker.
//!
//! ## Core Concepts
//! - **UserState**: One aggregate per user id holding expenses, income, notes, fleet and
//!   the reference lists. It is created lazily, with documented defaults, the first time
//!   a user id is read or written.
//! - **Records**: Expense, income and note records are keyed by `(month, year)`. A write
//!   always replaces the whole record at its key.
//! - **Backends**: `MemoryStore` (volatile, DashMap) and `MongoStore` (one document per
//!   user) both implement the `RecordStore` trait injected into the HTTP handlers.

pub mod document;
pub mod memory;
pub mod store;
pub mod types;

#[cfg(test)]
mod tests;
