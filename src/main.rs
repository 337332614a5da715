use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use clinidesk::api::server::start_server;
use clinidesk::api::types::ApiContext;
use clinidesk::config::{self, Config};
use clinidesk::db::open_database;
use clinidesk::documents::LocalDocumentStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let settings = Config::from_env();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(settings.log_filter.clone())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    if let Some(parent) = settings.database_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let conn = open_database(&settings.database_path)?;
    let store = LocalDocumentStore::new(settings.documents_dir.clone())?;

    let ctx = ApiContext::new(conn, Arc::new(store));
    let mut server = start_server(ctx, settings.bind_addr).await?;
    tracing::info!(addr = %server.addr, "listening");

    tokio::signal::ctrl_c().await?;
    server.shutdown();
    Ok(())
}
