use axum::{
    extract::{Path, State},
    Json,
};

use crate::analysis::{analyze_record, AnalysisResult};
use crate::auth::OwnerId;
use crate::error::AppError;
use crate::history::HistoryRecord;
use crate::routes::AppState;

pub async fn list_history(
    State(state): State<AppState>,
    owner: OwnerId,
) -> Result<Json<Vec<HistoryRecord>>, AppError> {
    let records = state.store.list_by_owner(owner.as_str()).await?;
    tracing::debug!(owner = %owner, count = records.len(), "Listing history");
    Ok(Json(records))
}

pub async fn get_history(
    State(state): State<AppState>,
    owner: OwnerId,
    Path(id): Path<String>,
) -> Result<Json<HistoryRecord>, AppError> {
    Ok(Json(owned_record(&state, &owner, &id).await?))
}

pub async fn analyze_history(
    State(state): State<AppState>,
    owner: OwnerId,
    Path(id): Path<String>,
) -> Result<Json<AnalysisResult>, AppError> {
    let record = owned_record(&state, &owner, &id).await?;
    Ok(Json(analyze_record(&record)))
}

/// Looks up a record, treating other owners' records as missing.
pub(crate) async fn owned_record(
    state: &AppState,
    owner: &OwnerId,
    id: &str,
) -> Result<HistoryRecord, AppError> {
    match state.store.get_by_id(id).await? {
        Some(record) if record.owner_id == owner.as_str() => Ok(record),
        _ => Err(AppError::NotFound(format!("history record {}", id))),
    }
}
