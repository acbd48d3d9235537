use std::sync::Arc;

use vib3_shared::clients::{create_pool, MediaStore};
use vib3_user::config::AppConfig;
use vib3_user::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    vib3_shared::middleware::init_tracing("vib3-user");

    let config = AppConfig::load()?;
    let port = config.port;

    let metrics = vib3_shared::middleware::init_metrics()?;
    let db = create_pool(&config.database_url, config.db_pool_size)?;

    let media = MediaStore::new(&config.media);
    media.ensure_bucket().await;

    let state = Arc::new(AppState { db, config, media, metrics });
    let app = vib3_user::router(state);

    let addr = format!("0.0.0.0:{port}");
    tracing::info!(addr = %addr, "vib3-user starting");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
