//! `sourcify-chains serve`: serve the registry over HTTP.
//!
//! Builds the registry once at startup; a registry that fails its integrity
//! checks aborts startup before the listener is bound.

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use axum::http::Method;
use sourcify_chains::Error;
use sourcify_chains::chain::EnvCredentials;
use tower_http::cors;

use crate::config::load_config;
use crate::routes;
use crate::signal::shutdown_token;
#[cfg(feature = "telemetry")]
use crate::telemetry::Telemetry;

/// Execute the `serve` command.
///
/// # Errors
///
/// Returns an error if configuration loading, registry construction, or
/// server binding fails.
#[allow(clippy::cognitive_complexity)]
pub async fn run(config_path: &Path) -> Result<(), Error> {
    let config = load_config(config_path)?;

    #[cfg(feature = "telemetry")]
    let telemetry = Telemetry::new()
        .with_name(env!("CARGO_PKG_NAME"))
        .with_version(env!("CARGO_PKG_VERSION"))
        .with_mode(config.mode())
        .register();
    #[cfg(not(feature = "telemetry"))]
    super::init_console_logging("info");

    let registry = config
        .load_registry(&EnvCredentials)
        .inspect_err(|e| tracing::error!(error = %e, "failed to build chain registry"))?;

    let app = routes::routes().with_state(Arc::new(registry));
    #[cfg(feature = "telemetry")]
    let app = app.layer(telemetry.http_tracing());
    let app = app.layer(
        cors::CorsLayer::new()
            .allow_origin(cors::Any)
            .allow_methods([Method::GET])
            .allow_headers(cors::Any),
    );

    let addr = SocketAddr::new(config.host(), config.port());
    tracing::info!("Starting server at http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .inspect_err(|e| tracing::error!("Failed to bind to {addr}: {e}"))
        .map_err(|e| Error::Server(format!("failed to bind {addr}: {e}")))?;

    let token = shutdown_token()
        .map_err(|e| Error::Server(format!("failed to install signal handlers: {e}")))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async move { token.cancelled().await })
        .await
        .map_err(|e| Error::Server(e.to_string()))?;

    tracing::info!("server stopped");
    Ok(())
}
