use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::analysis::{diff, DiffItem, DiffSummary};
use crate::auth::OwnerId;
use crate::error::{AppError, ValidationError};
use crate::routes::{history::owned_record, AppState};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompareRequest {
    pub previous_id: String,
    pub current_id: String,
}

#[derive(Debug, Serialize)]
pub struct CompareResponse {
    pub items: Vec<DiffItem>,
    pub summary: DiffSummary,
}

/// Diffs the response bodies of two of the caller's history records.
pub async fn compare_responses(
    State(state): State<AppState>,
    owner: OwnerId,
    payload: Result<Json<CompareRequest>, JsonRejection>,
) -> Result<Json<CompareResponse>, AppError> {
    let Json(request) = payload.map_err(ValidationError::from)?;
    let previous = owned_record(&state, &owner, &request.previous_id).await?;
    let current = owned_record(&state, &owner, &request.current_id).await?;

    let items = diff(&previous.response_body, &current.response_body);
    let summary = DiffSummary::from_items(&items);

    tracing::debug!(
        previous = %previous.id,
        current = %current.id,
        changes = summary.total_changes(),
        "Compared responses"
    );

    Ok(Json(CompareResponse { items, summary }))
}
