use std::sync::Arc;
use std::time::Duration;

use vib3_gateway::config::AppConfig;
use vib3_gateway::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    vib3_shared::middleware::init_tracing("vib3-gateway");

    let config = AppConfig::load()?;
    let port = config.port;

    let metrics = vib3_shared::middleware::init_metrics()?;

    // One client for all upstream calls
    let http_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.upstream_timeout_secs))
        .build()?;

    let state = Arc::new(AppState { config, http_client, metrics });
    let app = vib3_gateway::router(state);

    let addr = format!("0.0.0.0:{port}");
    tracing::info!(addr = %addr, "vib3-gateway starting");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
