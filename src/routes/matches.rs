use axum::{
    extract::{Path, State},
    Extension, Json,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    error::AppResult,
    middleware::RequestId,
    models::{ConsumptionLogEntry, MatchView, MealPlanRequest},
    routes::AppState,
};

/// Mutual matches, newest first
pub async fn list_matches(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<Vec<MatchView>>> {
    Ok(Json(state.matching.matches(user_id).await?))
}

/// Logs a mutual match as eaten on the requested day
pub async fn add_to_meal_plan(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Path((user_id, match_id)): Path<(Uuid, Uuid)>,
    Json(request): Json<MealPlanRequest>,
) -> AppResult<Json<ConsumptionLogEntry>> {
    tracing::info!(
        request_id = %request_id,
        user_id = %user_id,
        match_id = %match_id,
        date = %request.date,
        "Processing meal plan request"
    );

    let entry = state
        .meal_planner
        .add_to_meal_plan(user_id, match_id, request.date, request.meal_category)
        .await?;

    Ok(Json(entry))
}
