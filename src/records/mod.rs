//! Per-domain Record Handlers
//!
//! Single-record endpoints for expenses, income, fleet and notes. Each one is the
//! one-key special case of the sync protocol: a read returns the record at
//! `(userId, month, year)` or a structurally empty placeholder, a write replaces
//! that one record and stamps a fresh `updatedAt`. The fleet has no month key.

pub mod handlers;
pub mod types;
