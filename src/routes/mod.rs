use axum::{
    http::StatusCode,
    middleware,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{make_span_with_request_id, request_id_middleware};

pub mod discover;
pub mod matches;
pub mod profile;
pub mod state;
pub mod swipe;

pub use state::{AppState, Generation, Stores};

/// Creates the application router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes())
        .layer(
            // request id runs first so the trace span can pick it up
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

/// API routes under /api/v1
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/users/:user_id/profile",
            get(profile::get_profile).put(profile::setup_profile),
        )
        .route("/users/:user_id/discover", get(discover::discover))
        .route("/users/:user_id/swipe", post(swipe::swipe))
        .route("/users/:user_id/matches", get(matches::list_matches))
        .route(
            "/users/:user_id/matches/:match_id/meal-plan",
            post(matches::add_to_meal_plan),
        )
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
