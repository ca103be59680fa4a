//! In-memory history backend for tests and local runs.

use super::model::{HistoryRecord, NewHistoryRecord};
use super::store::{HistoryStore, StoreFuture};
use crate::error::StorageError;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::RwLock;
use uuid::Uuid;

fn lock_error<E: std::fmt::Display>(e: E) -> StorageError {
    StorageError::Lock(e.to_string())
}

#[derive(Default)]
struct MemoryState {
    /// Insertion order.
    records: Vec<HistoryRecord>,
    by_id: HashMap<String, usize>,
}

/// History kept in process memory. Lost on restart.
#[derive(Default)]
pub struct MemoryHistoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.state.read().map(|s| s.records.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn insert(&self, record: NewHistoryRecord) -> Result<HistoryRecord, StorageError> {
        let record = record.into_record(Uuid::new_v4().to_string(), Utc::now());
        let mut state = self.state.write().map_err(lock_error)?;
        let index = state.records.len();
        state.by_id.insert(record.id.clone(), index);
        state.records.push(record.clone());
        Ok(record)
    }

    fn owned_by(&self, owner_id: &str) -> Result<Vec<HistoryRecord>, StorageError> {
        let state = self.state.read().map_err(lock_error)?;
        let mut records: Vec<HistoryRecord> = state
            .records
            .iter()
            .rev()
            .filter(|r| r.owner_id == owner_id)
            .cloned()
            .collect();
        // Stable: same-instant records stay newest-inserted first.
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records)
    }

    fn lookup(&self, id: &str) -> Result<Option<HistoryRecord>, StorageError> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state
            .by_id
            .get(id)
            .and_then(|&i| state.records.get(i))
            .cloned())
    }
}

impl HistoryStore for MemoryHistoryStore {
    fn create(&self, record: NewHistoryRecord) -> StoreFuture<'_, HistoryRecord> {
        Box::pin(async move { self.insert(record) })
    }

    fn list_by_owner<'a>(&'a self, owner_id: &'a str) -> StoreFuture<'a, Vec<HistoryRecord>> {
        Box::pin(async move { self.owned_by(owner_id) })
    }

    fn get_by_id<'a>(&'a self, id: &'a str) -> StoreFuture<'a, Option<HistoryRecord>> {
        Box::pin(async move { self.lookup(id) })
    }
}
