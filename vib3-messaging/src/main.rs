use std::sync::Arc;

use vib3_messaging::config::AppConfig;
use vib3_messaging::AppState;
use vib3_shared::clients::create_pool;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    vib3_shared::middleware::init_tracing("vib3-messaging");

    let config = AppConfig::load()?;
    let port = config.port;

    let metrics = vib3_shared::middleware::init_metrics()?;
    let db = create_pool(&config.database_url, config.db_pool_size)?;

    let state = Arc::new(AppState { db, config, metrics });
    let app = vib3_messaging::router(state);

    let addr = format!("0.0.0.0:{port}");
    tracing::info!(addr = %addr, "vib3-messaging starting");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
