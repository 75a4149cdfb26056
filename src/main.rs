#![deny(clippy::all)]
#![deny(clippy::pedantic)]

use callcenter_gateway::infrastructure::{
    config::{AppConfig, LogFormat, LoggingConfig},
    http::start_server,
};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load().map_err(|e| {
        eprintln!("Failed to load configuration: {e}");
        e
    })?;

    init_tracing(&config.logging);

    info!(mode = %config.mode, "Starting Call-Center API Gateway");
    info!(
        "Configuration loaded: server will bind to {}:{}",
        config.server.host, config.server.port
    );

    // The account directory lives with the persistence layer; without it the
    // gateway serves authenticated routes but not the refresh exchange.
    if let Err(e) = start_server(config, None).await {
        error!("Server error: {}", e);
        return Err(e);
    }

    Ok(())
}

/// Initialize structured logging
fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("callcenter_gateway={},tower_http=info", logging.level))
    });

    let registry = tracing_subscriber::registry().with(filter);
    match logging.format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer().pretty()).init(),
    }
}
