use axum::{
    extract::{Path, State},
    Extension, Json,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    error::AppResult,
    middleware::RequestId,
    models::{SwipeOutcome, SwipeRequest},
    routes::AppState,
};

pub async fn swipe(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Path(user_id): Path<Uuid>,
    Json(request): Json<SwipeRequest>,
) -> AppResult<Json<SwipeOutcome>> {
    tracing::info!(
        request_id = %request_id,
        user_id = %user_id,
        candidate_id = %request.candidate_id,
        action = ?request.action,
        "Processing swipe"
    );

    let outcome = state
        .matching
        .swipe(user_id, request.candidate_id, request.action)
        .await?;

    tracing::info!(
        request_id = %request_id,
        status = ?outcome.status,
        "Swipe recorded"
    );

    Ok(Json(outcome))
}
