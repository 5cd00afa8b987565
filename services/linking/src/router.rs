use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use botlink_core::middleware::{
    propagate_request_id_layer, request_id_layer, with_permissive_cors,
};

use crate::handlers::{
    linking::{generate_code, validate_code},
    status::{health, not_found, stats},
};
use crate::state::AppState;

/// Largest accepted request body. Settings may carry data-URL avatars.
pub const MAX_BODY_BYTES: usize = 64 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    let router = Router::new()
        // Linking codes
        .route("/api/generate-code", post(generate_code))
        .route("/api/validate-code", post(validate_code))
        // Status
        .route("/api/health", get(health))
        .route("/api/stats", get(stats))
        // Anything else, including a known path with the wrong method
        .fallback(not_found)
        .method_not_allowed_fallback(not_found)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state);

    with_permissive_cors(router)
        .layer(TraceLayer::new_for_http())
        .layer(propagate_request_id_layer())
        .layer(request_id_layer())
}
