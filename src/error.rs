use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

/// A single offending field in a rejected request description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Malformed request description. Lists every offending field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid request: {}", summarize(.fields))]
pub struct ValidationError {
    pub fields: Vec<FieldError>,
}

fn summarize(fields: &[FieldError]) -> String {
    fields
        .iter()
        .map(|f| format!("{}: {}", f.field, f.message))
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationError {
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            fields: vec![FieldError {
                field: field.into(),
                message: message.into(),
            }],
        }
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.fields.iter().any(|f| f.field == field)
    }
}

/// A request body axum could not read as JSON.
impl From<JsonRejection> for ValidationError {
    fn from(rejection: JsonRejection) -> Self {
        Self::single("request", rejection.body_text())
    }
}

/// Failure of the outbound call itself.
///
/// These never reach the HTTP caller as errors; the executor turns them into
/// a synthesized envelope with status code 0.
#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("The request took too long to complete")]
    Timeout,

    #[error("Could not connect to the API endpoint: {0}")]
    ConnectionFailure(String),

    #[error("Request body is not valid JSON: {0}")]
    BodyParseFailure(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl ExecutionError {
    /// Status text recorded for the synthesized envelope.
    pub fn status_text(&self) -> String {
        match self {
            ExecutionError::Timeout => "Request timeout".to_string(),
            ExecutionError::ConnectionFailure(_) => "Connection failed".to_string(),
            ExecutionError::BodyParseFailure(_) => "Network Error".to_string(),
            ExecutionError::Other(message) => message.clone(),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ExecutionError::Timeout => "TIMEOUT",
            ExecutionError::ConnectionFailure(_) => "CONNECTION_FAILED",
            ExecutionError::BodyParseFailure(_) => "BODY_PARSE_ERROR",
            ExecutionError::Other(_) => "REQUEST_FAILED",
        }
    }
}

impl From<reqwest::Error> for ExecutionError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ExecutionError::Timeout
        } else if e.is_connect() {
            ExecutionError::ConnectionFailure(e.to_string())
        } else {
            ExecutionError::Other(e.to_string())
        }
    }
}

/// History persistence failure.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Corrupt record {id}: {reason}")]
    Corrupt { id: String, reason: String },

    #[error("Lock error: {0}")]
    Lock(String),

    #[error("Storage task failed: {0}")]
    Task(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Missing authenticated owner")]
    Unauthorized,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Storage failure: {0}")]
    Storage(#[from] StorageError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_code) = match &self {
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            AppError::Storage(e) => {
                tracing::error!(error = %e, "History storage failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_ERROR")
            }
        };

        let mut error = json!({
            "message": self.to_string(),
            "code": error_code,
        });
        if let AppError::Validation(v) = &self {
            error["details"] = json!(v.fields);
        }

        let body = Json(json!({
            "success": false,
            "error": error,
        }));

        (status, body).into_response()
    }
}
