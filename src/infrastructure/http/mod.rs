use axum::{response::Response, Router};
use serde_json::json;
use std::sync::Arc;
use tracing::info;

use crate::domain::repositories::AccountDirectory;
use crate::infrastructure::{config::AppConfig, jwt::JwtService};
use crate::presentation::middleware::{apply_global_stages, AppError};
use crate::presentation::response::Responder;
use crate::presentation::routes;

pub const SERVICE_NAME: &str = "callcenter-gateway";

/// Create the main application router
///
/// Global stages wrap the routes and the fallback alike, so unknown paths
/// still get a correlation id and a `NOT_FOUND` envelope.
pub fn create_app(config: &AppConfig, directory: Option<Arc<dyn AccountDirectory>>) -> Router {
    let tokens = Arc::new(JwtService::from_config(&config.jwt));
    let router = routes::create_routes(tokens, directory).fallback(not_found_handler);

    apply_global_stages(router, Arc::new(config.cors.clone()))
}

/// Health check endpoint for liveness probes
pub async fn health_check(responder: Responder) -> Response {
    responder.success(json!({
        "status": "ok",
        "service": SERVICE_NAME
    }))
}

/// Handler for 404 not found
async fn not_found_handler(responder: Responder) -> Response {
    responder.error(AppError::not_found("Route"))
}

/// Start the HTTP server
///
/// # Errors
/// Returns an error if the address is invalid or the listener fails
pub async fn start_server(
    config: AppConfig,
    directory: Option<Arc<dyn AccountDirectory>>,
) -> Result<(), Box<dyn std::error::Error>> {
    if directory.is_none() {
        info!("No account directory configured; token refresh endpoint disabled");
    }

    let app = create_app(&config, directory);
    let addr = config.server.socket_addr()?;

    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
