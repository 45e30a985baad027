//! HTTP API layer.
//!
//! Each submodule handles endpoints for a specific concern; the core
//! pipeline is reached only through the run service held in router state.

pub mod error;
pub mod health;
pub mod runs;

use std::sync::Arc;

use axum::{
    Router,
    routing::get,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::service::RunService;

/// Create the main API router with all endpoints
pub fn create_router(service: Arc<RunService>) -> Router {
    Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/runs", get(runs::list_runs).post(runs::create_run))
        .route("/api/runs/{id}", get(runs::get_run).put(runs::update_run))
        .with_state(service)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
