use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use catalog_core::config::Config;
use catalog_service::{router, AppState, QueryFacade};
use catalog_typesense::TypesenseClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let settings = Config::load()
        .and_then(|config| config.settings())
        .map_err(|e| {
            eprintln!("Error loading config: {}", e);
            e
        })?;
    let collection = settings.require_collection()?;

    let client = TypesenseClient::new(&settings.engine)?;
    tracing::info!(
        engine = client.base_url(),
        collection,
        "Using Typesense collection"
    );

    let facade = QueryFacade::new(Arc::new(client), collection, settings.mapping_mode)
        .with_query_by(settings.search.query_by.clone());
    let state = AppState::new(
        Arc::new(facade),
        settings.search.facet_fields.clone(),
        settings.search.default_page_size,
    );

    let bind = format!("{}:{}", settings.server.host, settings.server.port);
    let addr: SocketAddr = bind.parse()?;
    tracing::info!("HTTP server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router(state)).await?;
    Ok(())
}
