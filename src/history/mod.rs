//! Per-owner request/response history.
//!
//! Append-only: records are created once and never updated or deleted.

pub mod memory;
pub mod model;
pub mod sqlite;
pub mod store;

pub use memory::MemoryHistoryStore;
pub use model::{HistoryRecord, NewHistoryRecord};
pub use sqlite::SqliteHistoryStore;
pub use store::{open_store, HistoryStore, StoreFuture};
