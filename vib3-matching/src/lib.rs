use std::sync::Arc;

use axum::routing::{get, post};
use axum::{middleware, Router};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use vib3_shared::clients::DbPool;
use vib3_shared::middleware::metrics_middleware;

pub mod config;
pub mod matching;
pub mod models;
pub mod routes;
pub mod schema;
pub mod services;

pub struct AppState {
    pub db: DbPool,
    pub config: config::AppConfig,
    pub metrics: PrometheusHandle,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/metrics", get(routes::health::metrics))
        .route("/match", get(routes::discovery::candidates))
        .route("/match/swipe", post(routes::swipe::swipe))
        .route("/match/history", get(routes::swipe::match_history))
        .route("/match/check-match/:user_id", get(routes::swipe::check_match))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
