use axum::{
    extract::{Path, State},
    Extension, Json,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    error::AppResult,
    middleware::RequestId,
    models::DiscoverResponse,
    routes::AppState,
};

/// Next candidate for the discover screen, generating more when the user has seen everything
pub async fn discover(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<DiscoverResponse>> {
    let profile = state.profiles.require_completed(user_id).await?;

    tracing::info!(
        request_id = %request_id,
        user_id = %user_id,
        diet = %profile.diet,
        "Processing discover request"
    );

    let candidate = state.discovery.next_candidate(&profile).await?;

    tracing::info!(
        request_id = %request_id,
        candidate_id = ?candidate.as_ref().map(|c| c.id),
        "Discover completed"
    );

    Ok(Json(DiscoverResponse { candidate }))
}
