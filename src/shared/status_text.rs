//! Human-readable status lines for HTTP status codes.

use reqwest::StatusCode;

/// Returns the canonical reason phrase for a status code, or `"Unknown"`.
pub fn status_text(status: u16) -> String {
    StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("Unknown")
        .to_string()
}
