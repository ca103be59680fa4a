use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde_json::Value;

use crate::auth::OwnerId;
use crate::error::{AppError, ValidationError};
use crate::proxy::{validate_request, ProxyResponse};
use crate::routes::AppState;

pub async fn proxy_request(
    State(state): State<AppState>,
    owner: OwnerId,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<ProxyResponse>, AppError> {
    let Json(input) = payload.map_err(ValidationError::from)?;
    let config = validate_request(&input)?;

    tracing::debug!(
        method = %config.method,
        url = %config.url,
        owner = %owner,
        "Proxying request"
    );

    let response = state.proxy.execute(config, owner).await?;

    if response.status == 0 {
        tracing::warn!(status_text = %response.status_text, "Request failed");
    } else {
        tracing::debug!(status = response.status, "Request succeeded");
    }

    Ok(Json(response))
}
