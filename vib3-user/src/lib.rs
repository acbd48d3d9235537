use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get, post};
use axum::{middleware, Router};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use vib3_shared::clients::{DbPool, MediaStore};
use vib3_shared::middleware::metrics_middleware;

pub mod config;
pub mod models;
pub mod routes;
pub mod schema;
pub mod services;

use config::AppConfig;

pub struct AppState {
    pub db: DbPool,
    pub config: AppConfig,
    pub media: MediaStore,
    pub metrics: PrometheusHandle,
}

pub fn router(state: Arc<AppState>) -> Router {
    // Multipart framing on top of the largest accepted photo.
    let upload_limit = state.config.max_photo_bytes + 64 * 1024;

    Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/metrics", get(routes::health::metrics))
        .route("/auth/register", post(routes::auth::register))
        .route("/auth/login", post(routes::auth::login))
        .route(
            "/user/me",
            get(routes::profile::get_profile)
                .put(routes::profile::update_profile)
                .delete(routes::profile::delete_profile),
        )
        .route("/user/me/completeness", get(routes::profile::completeness))
        .route(
            "/user/me/photos",
            post(routes::photo::upload_photo).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/user/me/photos/:photo_id", delete(routes::photo::delete_photo))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
