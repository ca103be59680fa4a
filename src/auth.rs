//! Authentication collaborator seam.
//!
//! An upstream authenticator (gateway or session middleware) resolves the
//! user and forwards the id in a trusted header. The core only reads it.

use crate::error::AppError;
use crate::routes::AppState;
use axum::{async_trait, extract::FromRequestParts, http::request::Parts, http::HeaderMap};
use std::fmt;

/// Opaque identifier of the authenticated user owning history records.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OwnerId(String);

impl OwnerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Reads the owner from `header`. Missing, blank or non-UTF-8 values are rejected.
    pub fn from_headers(headers: &HeaderMap, header: &str) -> Result<Self, AppError> {
        headers
            .get(header)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(OwnerId::new)
            .ok_or(AppError::Unauthorized)
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[async_trait]
impl FromRequestParts<AppState> for OwnerId {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Self::from_headers(&parts.headers, &state.owner_header)
    }
}
