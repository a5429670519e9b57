use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tracing::{error, info};

use geonimbus::{
    cache::SpatialIndex,
    config::Config,
    database::{Database, repositories::AddressSeaOrmRepository},
    geohash::Geohasher,
    observability::init_tracing,
    services::GeoQueryOrchestrator,
    web::{AppState, WebServer},
};

#[derive(Parser)]
#[command(name = "geonimbus")]
#[command(version)]
#[command(about = "Geocoding service with a geometry-indexed cache in front of a durable address store")]
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

    /// Database URL (overrides config file)
    #[arg(short = 'd', long, value_name = "URL")]
    database_url: Option<String>,

    /// Log level (overrides config file)
    #[arg(short = 'v', long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(&cli.config)?;

    // Override config with CLI arguments
    if let Some(host) = cli.host {
        config.web.host = host;
    }
    if let Some(port) = cli.port {
        config.web.port = port;
    }
    if let Some(database_url) = cli.database_url {
        config.database.url = database_url;
    }
    if let Some(log_level) = cli.log_level {
        config.logging.level = log_level;
    }

    init_tracing(&config.logging)?;

    info!("Starting GeoNimbus v{}", env!("CARGO_PKG_VERSION"));
    if std::path::Path::new(&cli.config).exists() {
        info!("Configuration loaded from: {}", cli.config);
    } else {
        info!(
            "Config file {} not found, using defaults and environment",
            cli.config
        );
    }
    info!("Using database: {}", config.database.url);

    let database = Database::new(&config.database).await?;
    database.migrate().await?;
    info!("Database connection established and migrations applied");

    let codec = Arc::new(Geohasher);
    let store = Arc::new(AddressSeaOrmRepository::with_codec(
        database.connection(),
        codec.clone(),
    ));
    let cache = Arc::new(SpatialIndex::new());
    let orchestrator = Arc::new(
        GeoQueryOrchestrator::new(store, cache, codec)
            .with_tolerance(config.cache.coordinate_tolerance),
    );
    info!(
        tolerance = config.cache.coordinate_tolerance,
        request_timeout = ?config.web.request_timeout,
        "Query orchestrator initialized"
    );

    let web_server = WebServer::new(AppState {
        orchestrator,
        database,
        config: config.clone(),
    })
    .context("Failed to configure web server")?;

    info!(
        "Starting web server on {}:{}",
        web_server.host(),
        web_server.port()
    );

    let (ready_tx, ready_rx) = tokio::sync::oneshot::channel();
    let server = tokio::spawn(web_server.serve_with_cancellation(ready_tx, None));

    match ready_rx.await {
        Ok(Ok(())) => info!("Web server is ready"),
        Ok(Err(e)) => {
            error!("Web server failed to start: {}", e);
            return Err(e);
        }
        Err(_) => anyhow::bail!("Web server exited before signalling readiness"),
    }

    server.await.context("Web server task panicked")??;
    info!("GeoNimbus stopped");
    Ok(())
}
