use crate::proxy::types::{HttpMethod, RequestConfig, ResponseEnvelope};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Persisted outcome of one proxy execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRecord {
    pub id: String,
    pub owner_id: String,
    pub method: HttpMethod,
    pub url: String,
    pub headers: HashMap<String, String>,
    pub query_params: HashMap<String, String>,
    pub body: Option<String>,
    pub response_body: Value,
    pub response_headers: HashMap<String, String>,
    /// 0 when no response was received.
    pub status_code: u16,
    pub status_text: String,
    pub response_time_ms: u64,
    pub created_at: DateTime<Utc>,
}

/// A record before the store assigns `id` and `created_at`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewHistoryRecord {
    pub owner_id: String,
    pub method: HttpMethod,
    pub url: String,
    pub headers: HashMap<String, String>,
    pub query_params: HashMap<String, String>,
    pub body: Option<String>,
    pub response_body: Value,
    pub response_headers: HashMap<String, String>,
    pub status_code: u16,
    pub status_text: String,
    pub response_time_ms: u64,
}

impl NewHistoryRecord {
    /// Pairs the originating request with its envelope.
    pub fn from_exchange(owner_id: &str, config: RequestConfig, envelope: ResponseEnvelope) -> Self {
        Self {
            owner_id: owner_id.to_string(),
            method: config.method,
            url: config.url,
            headers: config.headers,
            query_params: config.query_params,
            body: config.body,
            response_body: envelope.body,
            response_headers: envelope.headers,
            status_code: envelope.status_code,
            status_text: envelope.status_text,
            response_time_ms: envelope.response_time_ms,
        }
    }

    pub fn into_record(self, id: String, created_at: DateTime<Utc>) -> HistoryRecord {
        HistoryRecord {
            id,
            owner_id: self.owner_id,
            method: self.method,
            url: self.url,
            headers: self.headers,
            query_params: self.query_params,
            body: self.body,
            response_body: self.response_body,
            response_headers: self.response_headers,
            status_code: self.status_code,
            status_text: self.status_text,
            response_time_ms: self.response_time_ms,
            created_at,
        }
    }
}
