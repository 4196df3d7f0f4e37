//! Route builders for the axum adapter.

mod common;

pub use common::common_routes;

use crate::handlers::dispatch;
use crate::state::AppState;
use axum::Router;
use tower_http::limit::RequestBodyLimitLayer;

/// Fixed routes plus the framework router as fallback, with request bodies capped at `body_limit` bytes.
pub fn app_routes(state: AppState, body_limit: usize) -> Router {
    Router::new()
        .merge(common_routes())
        .fallback(dispatch)
        .layer(RequestBodyLimitLayer::new(body_limit))
        .with_state(state)
}
