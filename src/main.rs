use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use catalog_sync::{
    catalog::CatalogClient,
    config::Config,
    enrich::DetailEnricher,
    store::{HttpAssetStore, HttpEntityStore},
    sync::{HttpImageSource, SyncService, SyncSettings},
    web::WebServer,
};

#[derive(Parser)]
#[command(name = "catalog-sync")]
#[command(version = "0.1.0")]
#[command(about = "Game catalog synchronization service with enrichment and media import")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Listening IP address
    #[arg(short = 'H', long, value_name = "IP")]
    host: Option<String>,

    /// Listening port
    #[arg(short, long, value_name = "PORT")]
    port: Option<u16>,

    /// Log level
    #[arg(short = 'v', long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging with specified level
    let log_filter = format!("catalog_sync={}", cli.log_level);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting catalog sync service v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration from specified file
    std::env::set_var("CONFIG_FILE", &cli.config);
    let mut config = Config::load()?;
    info!("Configuration loaded from: {}", cli.config);

    // Override config with CLI arguments
    if let Some(host) = cli.host {
        config.web.host = host;
    }
    if let Some(port) = cli.port {
        config.web.port = port;
    }

    info!("Using content store: {}", config.store.base_url);

    // Wire the collaborators around the pipeline
    let catalog = Arc::new(CatalogClient::new(config.catalog.base_url.clone()));
    let entity_store = Arc::new(HttpEntityStore::new(
        config.store.base_url.clone(),
        config.store.api_token.clone(),
    ));
    let asset_store = Arc::new(HttpAssetStore::new(
        config.store.base_url.clone(),
        config.store.api_token.clone(),
    ));
    let enricher = Arc::new(DetailEnricher::new(
        config.catalog.detail_base_url.clone(),
        config.sync.default_rating.clone(),
    ));
    let images = Arc::new(HttpImageSource::new());

    let sync = Arc::new(SyncService::new(
        catalog,
        entity_store,
        asset_store,
        enricher,
        images,
        SyncSettings::from(&config.sync),
    ));
    info!("Sync pipeline initialized");

    let web_server = WebServer::new(&config.web.host, config.web.port, sync)?;
    info!(
        "Starting web server on {}:{}",
        web_server.host(),
        web_server.port()
    );
    web_server.serve().await?;

    Ok(())
}
