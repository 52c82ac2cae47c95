//! Storefront server: reads config from env (and `.env`), serves the entity API
//! from PostgreSQL when DATABASE_URL is set, otherwise from an in-memory store.

use storefront_api::{build_router, AppState, EntityStore, MemoryStore, PgStore, ServerConfig};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("storefront_api=info".parse()?))
        .init();

    let config = ServerConfig::from_env()?;
    if config.database_url.is_some() {
        let store = PgStore::connect(&config).await?;
        serve(&config, store).await
    } else {
        tracing::info!("DATABASE_URL not set, using in-memory store");
        serve(&config, MemoryStore::new()).await
    }
}

async fn serve<S: EntityStore>(config: &ServerConfig, store: S) -> Result<(), Box<dyn std::error::Error>> {
    store.ping().await?;
    let state = AppState::new(store).with_body_limit(config.body_limit);
    let app = build_router(state);

    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
