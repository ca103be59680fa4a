//! Heuristic scoring of a single request/response exchange.

use crate::history::HistoryRecord;
use crate::proxy::response_builder::{body_size, header_value};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;

/// Bodies larger than this get a size suggestion.
pub const LARGE_BODY_BYTES: usize = 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PerformanceRating {
    Excellent,
    Good,
    Average,
    Slow,
}

impl PerformanceRating {
    pub fn from_response_time(ms: u64) -> Self {
        if ms > 2000 {
            PerformanceRating::Slow
        } else if ms > 1000 {
            PerformanceRating::Average
        } else if ms > 500 {
            PerformanceRating::Good
        } else {
            PerformanceRating::Excellent
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SecurityLevel {
    Secure,
    Moderate,
    NeedsAttention,
}

impl SecurityLevel {
    pub fn from_score(score: u8) -> Self {
        if score > 80 {
            SecurityLevel::Secure
        } else if score > 60 {
            SecurityLevel::Moderate
        } else {
            SecurityLevel::NeedsAttention
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StatusClass {
    Success,
    Redirect,
    ClientError,
    ServerError,
    NetworkError,
    Unknown,
}

impl StatusClass {
    pub fn from_status(status: u16) -> Self {
        match status {
            0 => StatusClass::NetworkError,
            200..=299 => StatusClass::Success,
            300..=399 => StatusClass::Redirect,
            400..=499 => StatusClass::ClientError,
            500..=599 => StatusClass::ServerError,
            _ => StatusClass::Unknown,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    Simple,
    Nested,
    Complex,
}

/// Shape of a response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StructureSummary {
    pub array_count: usize,
    pub object_count: usize,
    /// 0 for a scalar; each enclosing array or object adds one.
    pub max_depth: usize,
    pub complexity: Complexity,
}

impl StructureSummary {
    pub fn of(body: &Value) -> Self {
        let mut summary = Self {
            array_count: 0,
            object_count: 0,
            max_depth: 0,
            complexity: Complexity::Simple,
        };
        summary.max_depth = summary.walk(body);
        summary.complexity = match summary.max_depth {
            0 | 1 => Complexity::Simple,
            2 | 3 => Complexity::Nested,
            _ => Complexity::Complex,
        };
        summary
    }

    /// Counts containers under `value` and returns its depth.
    fn walk(&mut self, value: &Value) -> usize {
        match value {
            Value::Array(items) => {
                self.array_count += 1;
                1 + items.iter().map(|v| self.walk(v)).max().unwrap_or(0)
            }
            Value::Object(map) => {
                self.object_count += 1;
                1 + map.values().map(|v| self.walk(v)).max().unwrap_or(0)
            }
            Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => 0,
        }
    }
}

/// The response side of an exchange, as the analyzer sees it.
#[derive(Debug, Clone, Copy)]
pub struct ResponseView<'a> {
    pub body: &'a Value,
    pub headers: &'a HashMap<String, String>,
    pub status_code: u16,
    pub response_time_ms: u64,
}

impl<'a> From<&'a HistoryRecord> for ResponseView<'a> {
    fn from(record: &'a HistoryRecord) -> Self {
        Self {
            body: &record.response_body,
            headers: &record.response_headers,
            status_code: record.status_code,
            response_time_ms: record.response_time_ms,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub security_score: u8,
    pub security_level: SecurityLevel,
    pub performance: PerformanceRating,
    /// `max(0, 100 - ms / 50)`.
    pub performance_score: f64,
    pub status_class: StatusClass,
    pub structure: StructureSummary,
    pub body_size: usize,
    pub suggestions: Vec<String>,
}

/// Scores one exchange. Header names are matched case-insensitively.
pub fn analyze(
    response: ResponseView<'_>,
    request_url: &str,
    request_headers: &HashMap<String, String>,
) -> AnalysisResult {
    let is_https = request_url.starts_with("https://");
    let present = |name: &str| {
        header_value(request_headers, name).is_some_and(|v| !v.trim().is_empty())
    };
    let has_auth = present("authorization");
    let has_user_agent = present("user-agent");
    let open_cors = header_value(response.headers, "access-control-allow-origin")
        .map(str::trim)
        == Some("*");
    let has_cache_headers = ["cache-control", "etag", "last-modified", "expires"]
        .iter()
        .any(|h| header_value(response.headers, h).is_some());

    let security_score = security_score(is_https, has_auth, has_user_agent, open_cors);
    let body_size = body_size(response.body);
    let time = response.response_time_ms;

    let mut suggestions = Vec::new();
    if !is_https {
        suggestions.push("Use HTTPS for secure communication".to_string());
    }
    if !has_auth {
        suggestions.push("Consider adding authentication headers".to_string());
    }
    if !has_user_agent {
        suggestions.push("Add a User-Agent header for better API compatibility".to_string());
    }
    if open_cors {
        suggestions.push(
            "Restrict Access-Control-Allow-Origin instead of allowing every origin".to_string(),
        );
    }
    if time > 2000 {
        suggestions.push("Response time is high - consider caching or optimization".to_string());
    }
    if body_size > LARGE_BODY_BYTES {
        suggestions.push("Response body is large - consider pagination or filtering".to_string());
    }
    if !has_cache_headers {
        suggestions.push("Add Cache-Control headers for better performance".to_string());
    }

    AnalysisResult {
        security_score,
        security_level: SecurityLevel::from_score(security_score),
        performance: PerformanceRating::from_response_time(time),
        performance_score: (100.0 - time as f64 / 50.0).max(0.0),
        status_class: StatusClass::from_status(response.status_code),
        structure: StructureSummary::of(response.body),
        body_size,
        suggestions,
    }
}

/// Analyzes a stored history record.
pub fn analyze_record(record: &HistoryRecord) -> AnalysisResult {
    analyze(ResponseView::from(record), &record.url, &record.headers)
}

fn security_score(is_https: bool, has_auth: bool, has_user_agent: bool, open_cors: bool) -> u8 {
    let mut score: i32 = 100;
    if !is_https {
        score -= 30;
    }
    if !has_auth {
        score -= 20;
    }
    if !has_user_agent {
        score -= 10;
    }
    if open_cors {
        score -= 15;
    }
    score.clamp(0, 100) as u8
}
