//! HTTP route handlers — matches the existing Next.js API surface.

pub mod analysis;
pub mod analyze;
pub mod community;
pub mod posts;

use std::sync::Arc;

use axum::Router;
use tower_http::cors::CorsLayer;

use crate::state::AppState;

/// Build the main Axum router with all routes.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .nest("/api", api_routes())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .merge(analysis::routes())
        .merge(posts::routes())
        .merge(community::routes())
}
