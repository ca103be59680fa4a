//! SQLite history backend.

use super::model::{HistoryRecord, NewHistoryRecord};
use super::store::{HistoryStore, StoreFuture};
use crate::error::StorageError;
use crate::proxy::types::HttpMethod;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

const SELECT_COLUMNS: &str = "id, owner_id, method, url, headers, query_params, body, \
     response_body, response_headers, status_code, status_text, response_time_ms, created_at";

/// History persisted in a SQLite database.
///
/// The connection sits behind a mutex and every query runs on the blocking pool.
pub struct SqliteHistoryStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteHistoryStore {
    /// Opens (or creates) the database at `path`.
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        let conn = Connection::open(path)?;

        // Enable WAL mode for better concurrency
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;

        Self::init(conn)
    }

    /// Opens a private in-memory database.
    pub fn in_memory() -> Result<Self, StorageError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StorageError> {
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS history (
                id TEXT PRIMARY KEY,
                owner_id TEXT NOT NULL,
                method TEXT NOT NULL,
                url TEXT NOT NULL,
                headers TEXT NOT NULL,
                query_params TEXT NOT NULL,
                body TEXT,
                response_body TEXT NOT NULL,
                response_headers TEXT NOT NULL,
                status_code INTEGER NOT NULL,
                status_text TEXT NOT NULL,
                response_time_ms INTEGER NOT NULL,
                created_at INTEGER NOT NULL
            )
            "#,
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_history_owner ON history(owner_id, created_at)",
            [],
        )?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Runs `f` against the connection on the blocking pool.
    fn with_conn<T, F>(&self, f: F) -> StoreFuture<'static, T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, StorageError> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        Box::pin(async move {
            let task = tokio::task::spawn_blocking(move || {
                let conn = conn
                    .lock()
                    .map_err(|e| StorageError::Lock(e.to_string()))?;
                f(&conn)
            });
            match task.await {
                Ok(result) => result,
                Err(e) => Err(StorageError::Task(e.to_string())),
            }
        })
    }
}

/// Column values as stored, before decoding.
struct HistoryRow {
    id: String,
    owner_id: String,
    method: String,
    url: String,
    headers: String,
    query_params: String,
    body: Option<String>,
    response_body: String,
    response_headers: String,
    status_code: i64,
    status_text: String,
    response_time_ms: i64,
    created_at: i64,
}

impl HistoryRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            owner_id: row.get(1)?,
            method: row.get(2)?,
            url: row.get(3)?,
            headers: row.get(4)?,
            query_params: row.get(5)?,
            body: row.get(6)?,
            response_body: row.get(7)?,
            response_headers: row.get(8)?,
            status_code: row.get(9)?,
            status_text: row.get(10)?,
            response_time_ms: row.get(11)?,
            created_at: row.get(12)?,
        })
    }

    fn into_record(self) -> Result<HistoryRecord, StorageError> {
        let corrupt = |reason: String| StorageError::Corrupt {
            id: self.id.clone(),
            reason,
        };

        let method = HttpMethod::parse(&self.method)
            .ok_or_else(|| corrupt(format!("unknown method '{}'", self.method)))?;
        let status_code = u16::try_from(self.status_code)
            .map_err(|_| corrupt(format!("status code {} out of range", self.status_code)))?;
        let response_time_ms = u64::try_from(self.response_time_ms)
            .map_err(|_| corrupt(format!("negative response time {}", self.response_time_ms)))?;
        let created_at = DateTime::from_timestamp_micros(self.created_at)
            .ok_or_else(|| corrupt(format!("invalid timestamp {}", self.created_at)))?;

        Ok(HistoryRecord {
            headers: serde_json::from_str(&self.headers)?,
            query_params: serde_json::from_str(&self.query_params)?,
            response_body: serde_json::from_str(&self.response_body)?,
            response_headers: serde_json::from_str(&self.response_headers)?,
            id: self.id,
            owner_id: self.owner_id,
            method,
            url: self.url,
            body: self.body,
            status_code,
            status_text: self.status_text,
            response_time_ms,
            created_at,
        })
    }
}

/// Current time truncated to the stored microsecond precision.
fn now_micros() -> DateTime<Utc> {
    let now = Utc::now();
    DateTime::from_timestamp_micros(now.timestamp_micros()).unwrap_or(now)
}

impl HistoryStore for SqliteHistoryStore {
    fn create(&self, record: NewHistoryRecord) -> StoreFuture<'_, HistoryRecord> {
        self.with_conn(move |conn| {
            let record = record.into_record(Uuid::new_v4().to_string(), now_micros());

            conn.execute(
                r#"
                INSERT INTO history (
                    id, owner_id, method, url, headers, query_params, body,
                    response_body, response_headers, status_code, status_text,
                    response_time_ms, created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
                "#,
                params![
                    record.id,
                    record.owner_id,
                    record.method.as_str(),
                    record.url,
                    serde_json::to_string(&record.headers)?,
                    serde_json::to_string(&record.query_params)?,
                    record.body,
                    serde_json::to_string(&record.response_body)?,
                    serde_json::to_string(&record.response_headers)?,
                    i64::from(record.status_code),
                    record.status_text,
                    record.response_time_ms as i64,
                    record.created_at.timestamp_micros(),
                ],
            )?;

            tracing::debug!(id = %record.id, owner = %record.owner_id, "Stored history record");
            Ok(record)
        })
    }

    fn list_by_owner<'a>(&'a self, owner_id: &'a str) -> StoreFuture<'a, Vec<HistoryRecord>> {
        let owner_id = owner_id.to_string();
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM history WHERE owner_id = ?1 ORDER BY created_at DESC, rowid DESC",
                SELECT_COLUMNS
            ))?;

            let rows = stmt
                .query_map([&owner_id], HistoryRow::from_row)?
                .collect::<Result<Vec<_>, _>>()?;

            rows.into_iter()
                .map(HistoryRow::into_record)
                .collect::<Result<Vec<_>, _>>()
        })
    }

    fn get_by_id<'a>(&'a self, id: &'a str) -> StoreFuture<'a, Option<HistoryRecord>> {
        let id = id.to_string();
        self.with_conn(move |conn| {
            let row = conn
                .query_row(
                    &format!("SELECT {} FROM history WHERE id = ?1", SELECT_COLUMNS),
                    [&id],
                    HistoryRow::from_row,
                )
                .optional()?;

            row.map(HistoryRow::into_record).transpose()
        })
    }
}
