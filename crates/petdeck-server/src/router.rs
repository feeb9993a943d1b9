use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::handler;
use crate::state::AppState;

/// Build the axum router with all petdeck endpoints.
///
/// Bodies are buffered up to [`AppState::body_limit`]; handlers report
/// anything larger as a 400 like any other oversized upload.
pub fn build_router(state: AppState) -> Router {
    let body_limit = state.body_limit();
    let pet_images = Router::new()
        .route("/types", get(handler::list_types))
        .route("/upload/:pet_type/:level", post(handler::upload_image))
        .route("/delete/:pet_type/:level", delete(handler::delete_image))
        .route("/create-type", post(handler::create_type))
        .route("/delete-type/:pet_type", delete(handler::delete_type));

    Router::new()
        .route("/api/health", get(handler::health_handler))
        .nest("/api/pet-images", pet_images)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
