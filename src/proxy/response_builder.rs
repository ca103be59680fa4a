//! Response envelope construction.
//!
//! Turns a raw target response, or a failed outbound call, into the unified
//! envelope that is returned to the caller and stored in history.

use super::types::{RawResponse, ResponseEnvelope};
use crate::error::ExecutionError;
use crate::shared::status_text;
use base64::Engine;
use serde_json::{json, Value};
use std::collections::HashMap;

/// Determines if response body is likely binary based on content-type.
///
/// # Arguments
///
/// * `content_type` - The Content-Type header value
///
/// # Returns
///
/// `true` if the content is likely binary, `false` otherwise.
pub fn is_binary_content(content_type: Option<&str>) -> bool {
    let ct = match content_type {
        Some(ct) => ct.to_lowercase(),
        None => return false,
    };

    let text_types = [
        "text/",
        "application/json",
        "application/xml",
        "application/javascript",
        "application/x-javascript",
        "application/ecmascript",
        "application/x-www-form-urlencoded",
        "+json",
        "+xml",
    ];

    !text_types.iter().any(|t| ct.contains(t))
}

/// Decodes a response body into a JSON value.
///
/// Binary bodies become `{"encoding": "base64", "data": ...}`. Textual bodies
/// are parsed as JSON and fall back to a JSON string of the raw text.
pub fn decode_body(body_bytes: &[u8], content_type: Option<&str>) -> Value {
    if is_binary_content(content_type) {
        let b64 = base64::engine::general_purpose::STANDARD.encode(body_bytes);
        return json!({ "encoding": "base64", "data": b64 });
    }

    match serde_json::from_slice::<Value>(body_bytes) {
        Ok(value) => value,
        Err(_) => Value::String(String::from_utf8_lossy(body_bytes).to_string()),
    }
}

/// Builds the envelope for a response the target actually sent.
///
/// Any status code is accepted as-is.
pub fn build_response(raw: RawResponse, response_time_ms: u64) -> ResponseEnvelope {
    let RawResponse {
        status,
        headers,
        body_bytes,
    } = raw;

    let content_type = header_value(&headers, "content-type");
    let body = decode_body(&body_bytes, content_type);

    ResponseEnvelope {
        body,
        headers,
        status_code: status,
        status_text: status_text(status),
        response_time_ms,
    }
}

/// Builds the synthesized envelope for an outbound call that produced no response.
pub fn build_failure(error: &ExecutionError, response_time_ms: u64) -> ResponseEnvelope {
    let status_text = error.status_text();
    ResponseEnvelope {
        body: json!({
            "error": status_text,
            "code": error.code(),
            "message": error.to_string(),
        }),
        headers: HashMap::new(),
        status_code: 0,
        status_text,
        response_time_ms,
    }
}

/// UTF-8 byte length of the JSON-serialized body.
pub fn body_size(body: &Value) -> usize {
    serde_json::to_string(body).map(|s| s.len()).unwrap_or(0)
}

/// Case-insensitive header lookup.
pub fn header_value<'a>(headers: &'a HashMap<String, String>, name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(status: u16, content_type: Option<&str>, body: &[u8]) -> RawResponse {
        let mut headers = HashMap::new();
        if let Some(ct) = content_type {
            headers.insert("content-type".to_string(), ct.to_string());
        }
        RawResponse {
            status,
            headers,
            body_bytes: body.to_vec(),
        }
    }

    #[test]
    fn test_is_binary_content() {
        assert!(!is_binary_content(Some("text/html")));
        assert!(!is_binary_content(Some("application/json")));
        assert!(!is_binary_content(Some("application/xml")));
        assert!(!is_binary_content(Some("text/plain; charset=utf-8")));
        assert!(is_binary_content(Some("image/png")));
        assert!(is_binary_content(Some("application/octet-stream")));
        assert!(!is_binary_content(None));
    }

    #[test]
    fn test_json_body_is_parsed() {
        let env = build_response(raw(200, Some("application/json"), br#"{"userId":1}"#), 12);
        assert_eq!(env.body, json!({"userId": 1}));
        assert_eq!(env.status_code, 200);
        assert_eq!(env.status_text, "OK");
        assert_eq!(env.response_time_ms, 12);
    }

    #[test]
    fn test_text_body_falls_back_to_string() {
        let env = build_response(raw(500, Some("text/plain"), b"oops"), 3);
        assert_eq!(env.body, Value::String("oops".into()));
        assert_eq!(env.status_code, 500);
        assert_eq!(env.status_text, "Internal Server Error");
    }

    #[test]
    fn test_binary_body_is_base64() {
        let env = build_response(raw(200, Some("image/png"), &[0x89, 0x50]), 1);
        assert_eq!(env.body["encoding"], "base64");
        assert_eq!(env.body["data"], "iVA=");
    }

    #[test]
    fn test_failure_envelope() {
        let env = build_failure(&ExecutionError::Timeout, 30000);
        assert_eq!(env.status_code, 0);
        assert_eq!(env.status_text, "Request timeout");
        assert_eq!(env.body["code"], "TIMEOUT");
        assert!(env.headers.is_empty());
    }

    #[test]
    fn test_body_size_counts_utf8_bytes() {
        assert_eq!(body_size(&json!({"a": 1})), 7);
        assert_eq!(body_size(&json!("é")), 4);
        assert_eq!(body_size(&Value::Null), 4);
    }

    #[test]
    fn test_header_lookup_ignores_case() {
        let mut headers = HashMap::new();
        headers.insert("Content-Type".to_string(), "text/plain".to_string());
        assert_eq!(header_value(&headers, "content-type"), Some("text/plain"));
        assert_eq!(header_value(&headers, "etag"), None);
    }
}
