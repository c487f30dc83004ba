//! The `TimeEntry` document collection.
//!  - Documents live in a single JSON-lines file inside the data directory.
//!  - Writes append one document per line under an exclusive file lock, reads take a shared one.
//!  - Every document gets a generated `_id` and `createdAt`/`updatedAt` timestamps.

pub mod entities;
pub mod entry_storage;
