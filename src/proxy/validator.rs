//! Validation of client-submitted request descriptions.
//!
//! Only the shape is checked. The body is not parsed here; a body that is
//! not valid JSON fails later, at execution time.

use super::types::{HttpMethod, RequestConfig};
use crate::error::{FieldError, ValidationError};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Validates an untyped request description into a canonical `RequestConfig`.
///
/// Every offending field is reported, not just the first.
pub fn validate_request(input: &Value) -> Result<RequestConfig, ValidationError> {
    let Some(obj) = input.as_object() else {
        return Err(ValidationError {
            fields: vec![field_error("request", "expected a JSON object")],
        });
    };

    let mut errors = Vec::new();

    let method = match obj.get("method") {
        Some(Value::String(m)) => match HttpMethod::parse(m) {
            Some(method) => Some(method),
            None => {
                errors.push(field_error(
                    "method",
                    &format!("unsupported method '{}', expected one of GET, POST, PUT, DELETE, PATCH", m),
                ));
                None
            }
        },
        Some(Value::Null) | None => {
            errors.push(field_error("method", "is required"));
            None
        }
        Some(_) => {
            errors.push(field_error("method", "must be a string"));
            None
        }
    };

    let url = match obj.get("url") {
        Some(Value::String(u)) => match check_url(u) {
            Ok(()) => Some(u.clone()),
            Err(message) => {
                errors.push(field_error("url", &message));
                None
            }
        },
        Some(Value::Null) | None => {
            errors.push(field_error("url", "is required"));
            None
        }
        Some(_) => {
            errors.push(field_error("url", "must be a string"));
            None
        }
    };

    let headers = string_map(obj, "headers", &mut errors);
    let query_params = string_map(obj, "queryParams", &mut errors);

    let body = match obj.get("body") {
        Some(Value::String(b)) => Some(b.clone()),
        Some(Value::Null) | None => None,
        Some(_) => {
            errors.push(field_error("body", "must be a string"));
            None
        }
    };

    match (method, url) {
        (Some(method), Some(url)) if errors.is_empty() => Ok(RequestConfig {
            method,
            url,
            headers,
            query_params,
            body,
        }),
        _ => Err(ValidationError { fields: errors }),
    }
}

/// A URL must parse and carry both a scheme and a host.
fn check_url(url: &str) -> Result<(), String> {
    if url.trim().is_empty() {
        return Err("must not be empty".to_string());
    }
    let parsed = url::Url::parse(url).map_err(|e| format!("not a valid URL: {}", e))?;
    if parsed.host_str().map_or(true, str::is_empty) {
        return Err("URL has no host".to_string());
    }
    Ok(())
}

fn string_map(
    obj: &Map<String, Value>,
    field: &str,
    errors: &mut Vec<FieldError>,
) -> HashMap<String, String> {
    match obj.get(field) {
        Some(Value::Object(map)) => {
            let mut out = HashMap::with_capacity(map.len());
            for (key, value) in map {
                match value {
                    Value::String(s) => {
                        out.insert(key.clone(), s.clone());
                    }
                    _ => errors.push(field_error(
                        &format!("{}.{}", field, key),
                        "must be a string",
                    )),
                }
            }
            out
        }
        Some(Value::Null) | None => HashMap::new(),
        Some(_) => {
            errors.push(field_error(field, "must be an object of strings"));
            HashMap::new()
        }
    }
}

fn field_error(field: &str, message: &str) -> FieldError {
    FieldError {
        field: field.to_string(),
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rejects_unknown_method() {
        let err = validate_request(&json!({"method": "FETCH", "url": "https://x.com"})).unwrap_err();
        assert!(err.has_field("method"));
        assert_eq!(err.fields.len(), 1);
    }

    #[test]
    fn test_rejects_non_url() {
        let err = validate_request(&json!({"method": "GET", "url": "not-a-url"})).unwrap_err();
        assert!(err.has_field("url"));
    }

    #[test]
    fn test_rejects_url_without_host() {
        let err = validate_request(&json!({"method": "GET", "url": "mailto:someone"})).unwrap_err();
        assert!(err.has_field("url"));
    }

    #[test]
    fn test_applies_defaults() {
        let config = validate_request(&json!({"method": "GET", "url": "https://x.com"})).unwrap();
        assert_eq!(config.method, HttpMethod::Get);
        assert_eq!(config.url, "https://x.com");
        assert!(config.headers.is_empty());
        assert!(config.query_params.is_empty());
        assert!(config.body.is_none());
    }

    #[test]
    fn test_reports_all_offending_fields() {
        let err = validate_request(&json!({
            "url": 42,
            "headers": {"X-Num": 1},
            "queryParams": [],
            "body": {"a": 1}
        }))
        .unwrap_err();
        assert!(err.has_field("method"));
        assert!(err.has_field("url"));
        assert!(err.has_field("headers.X-Num"));
        assert!(err.has_field("queryParams"));
        assert!(err.has_field("body"));
    }

    #[test]
    fn test_body_content_is_not_checked() {
        let config = validate_request(&json!({
            "method": "POST",
            "url": "https://x.com/items",
            "headers": {"Content-Type": "application/json"},
            "queryParams": {"page": "2"},
            "body": "{not json"
        }))
        .unwrap();
        assert_eq!(config.body.as_deref(), Some("{not json"));
        assert_eq!(config.headers.get("Content-Type").unwrap(), "application/json");
        assert_eq!(config.query_params.get("page").unwrap(), "2");
    }

    #[test]
    fn test_rejects_non_object() {
        let err = validate_request(&json!("GET https://x.com")).unwrap_err();
        assert!(err.has_field("request"));
    }
}
