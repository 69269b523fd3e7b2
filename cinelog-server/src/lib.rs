//! HTTP surface of Cinelog: configuration, router and handlers over
//! [`cinelog_core::webhook::WebhookGateway`].

pub mod handlers;
pub mod infra;
pub mod routes;

pub use infra::app_state::AppState;

use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

/// Full application router: `/health` plus the versioned API.
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_handler))
        .merge(routes::create_api_router(state.clone()))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
