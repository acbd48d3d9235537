use std::sync::Arc;

use axum::routing::{delete, get, post};
use axum::{middleware, Router};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use vib3_shared::clients::DbPool;
use vib3_shared::middleware::metrics_middleware;

pub mod chat;
pub mod config;
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
        // Chats
        .route("/chats", post(routes::chats::create_chat).get(routes::chats::list_chats))
        .route("/chats/:id", get(routes::chats::get_chat).delete(routes::chats::delete_chat))
        .route(
            "/chats/:id/messages",
            get(routes::messages::list_messages).post(routes::messages::send_message),
        )
        .route("/chats/:id/read", post(routes::messages::mark_as_read))
        .route("/chats/:id/participants", post(routes::chats::add_participant))
        .route(
            "/chats/:id/participants/:user_id",
            delete(routes::chats::remove_participant).patch(routes::chats::update_participant_role),
        )
        // Messages
        .route("/messages/:id", delete(routes::messages::delete_message))
        .route("/messages/:id/reactions", post(routes::messages::react))
        // Match threads
        .route("/chat", post(routes::match_thread::send))
        .route("/chat/:match_id", get(routes::match_thread::history))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
