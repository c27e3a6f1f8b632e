use std::sync::{Arc, Mutex};
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use salonbook::config::AppConfig;
use salonbook::db;
use salonbook::handlers;
use salonbook::models::Catalog;
use salonbook::services::cache::SqliteCache;
use salonbook::services::remote::rest::RestRemoteStore;
use salonbook::services::remote::RemoteStore;
use salonbook::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();

    let conn = db::init_db(&config.database_url)?;
    let cache = Arc::new(SqliteCache::new(Arc::new(Mutex::new(conn))));

    let catalog = Catalog::load(config.catalog_path.as_deref())?;
    tracing::info!(
        services = catalog.services.len(),
        decants = catalog.decants.len(),
        "catalog loaded"
    );

    let remote: Option<Arc<dyn RemoteStore>> = match &config.remote_url {
        Some(url) => {
            tracing::info!("using remote store at {url}");
            let store: Arc<dyn RemoteStore> = Arc::new(RestRemoteStore::new(
                url.clone(),
                config.remote_api_key.clone(),
                Duration::from_millis(config.remote_timeout_ms),
            )?);
            Some(store)
        }
        None => {
            tracing::warn!("REMOTE_URL not set, bookings are kept in the local cache only");
            None
        }
    };

    let port = config.port;
    let state = Arc::new(AppState::new(config, catalog, cache, remote));
    let app = handlers::router(state);

    let addr = format!("0.0.0.0:{port}");
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
