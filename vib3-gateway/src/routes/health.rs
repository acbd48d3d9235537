use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use std::sync::Arc;
use std::time::Duration;

use vib3_shared::types::api::{HealthCheck, HealthResponse, HealthStatus};

use crate::config::Upstream;
use crate::AppState;

async fn probe(state: &AppState, upstream: Upstream) -> HealthCheck {
    let url = format!("{}/health", state.config.base_url(upstream));
    let (status, message) = match state.http_client.get(&url).timeout(Duration::from_secs(3)).send().await {
        Ok(resp) if resp.status().is_success() => (HealthStatus::Healthy, None),
        Ok(resp) => (HealthStatus::Degraded, Some(format!("status {}", resp.status()))),
        Err(e) => (HealthStatus::Unhealthy, Some(e.to_string())),
    };
    HealthCheck {
        name: upstream.name().to_string(),
        status,
        message,
    }
}

/// Health of the gateway and every upstream service.
pub async fn health_check(State(state): State<Arc<AppState>>) -> Response {
    let mut checks = Vec::with_capacity(Upstream::ALL.len());
    for upstream in Upstream::ALL {
        checks.push(probe(&state, upstream).await);
    }

    let response = HealthResponse::healthy("vib3-gateway", env!("CARGO_PKG_VERSION")).with_checks(checks);
    let status = match response.status {
        HealthStatus::Healthy | HealthStatus::Degraded => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status, Json(response)).into_response()
}

pub async fn metrics(State(state): State<Arc<AppState>>) -> String {
    state.metrics.render()
}
