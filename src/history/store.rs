//! History storage abstraction layer.
//!
//! The router holds an `Arc<dyn HistoryStore>` built once at startup from
//! configuration, so backends can be swapped without touching the proxy.

use super::memory::MemoryHistoryStore;
use super::model::{HistoryRecord, NewHistoryRecord};
use super::sqlite::SqliteHistoryStore;
use crate::config::StorageBackend;
use crate::error::StorageError;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Boxed future returned by store operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StorageError>> + Send + 'a>>;

/// Durable storage for history records.
pub trait HistoryStore: Send + Sync {
    /// Assigns `id` and `created_at`, persists, and returns the stored record.
    ///
    /// Safe under concurrent calls; ids are random v4 UUIDs.
    fn create(&self, record: NewHistoryRecord) -> StoreFuture<'_, HistoryRecord>;

    /// All records of one owner, most recent first.
    fn list_by_owner<'a>(&'a self, owner_id: &'a str) -> StoreFuture<'a, Vec<HistoryRecord>>;

    /// Point lookup by id.
    fn get_by_id<'a>(&'a self, id: &'a str) -> StoreFuture<'a, Option<HistoryRecord>>;
}

/// Builds the configured backend.
pub fn open_store(backend: &StorageBackend) -> Result<Arc<dyn HistoryStore>, StorageError> {
    match backend {
        StorageBackend::Memory => {
            tracing::info!("Using in-memory history store");
            Ok(Arc::new(MemoryHistoryStore::new()))
        }
        StorageBackend::Sqlite(path) => {
            tracing::info!(path = %path.display(), "Using SQLite history store");
            Ok(Arc::new(SqliteHistoryStore::open(path)?))
        }
    }
}
