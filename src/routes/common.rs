//! Fixed endpoints next to the framework router: liveness and build info.

use crate::state::AppState;
use axum::extract::State;
use axum::http::Method;
use axum::{routing::get, Json, Router};
use serde::Serialize;

#[derive(Serialize)]
struct HealthBody {
    status: &'static str,
}

async fn health() -> Json<HealthBody> {
    Json(HealthBody { status: "ok" })
}

#[derive(Serialize)]
struct RouteCounts {
    #[serde(rename = "GET")]
    get: usize,
    #[serde(rename = "POST")]
    post: usize,
}

#[derive(Serialize)]
struct VersionBody {
    name: &'static str,
    version: &'static str,
    routes: RouteCounts,
}

/// Crate build info plus the size of each route table.
async fn version(State(state): State<AppState>) -> Json<VersionBody> {
    let router = state.app.router();
    Json(VersionBody {
        name: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        routes: RouteCounts {
            get: router.len(&Method::GET),
            post: router.len(&Method::POST),
        },
    })
}

/// GET /health, GET /version.
pub fn common_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/version", get(version))
}
