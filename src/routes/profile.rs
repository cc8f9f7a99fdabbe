use axum::{
    extract::{Path, State},
    Extension, Json,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    error::AppResult,
    middleware::RequestId,
    models::{DietaryProfile, DietaryProfileUpdate},
    routes::AppState,
};

/// Saves the user's dietary profile and marks setup as done
pub async fn setup_profile(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Path(user_id): Path<Uuid>,
    Json(update): Json<DietaryProfileUpdate>,
) -> AppResult<Json<DietaryProfile>> {
    tracing::info!(
        request_id = %request_id,
        user_id = %user_id,
        diet = %update.diet,
        "Processing profile setup"
    );

    let profile = state.profiles.setup(user_id, update).await?;

    Ok(Json(profile))
}

pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<DietaryProfile>> {
    Ok(Json(state.profiles.get(user_id).await?))
}
