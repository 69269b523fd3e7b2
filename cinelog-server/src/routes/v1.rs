use axum::{Router, routing::post};

use crate::{AppState, handlers};

/// Create all v1 API routes
pub fn create_v1_router(_state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/webhooks/movie",
            post(handlers::movie_webhook_handler),
        )
        .route(
            "/webhooks/episode",
            post(handlers::episode_webhook_handler),
        )
}
