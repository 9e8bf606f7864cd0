//! HTTP route handlers for the chain registry.
//!
//! Read-only JSON endpoints over a shared [`Registry`]. Chains are rendered
//! through [`ChainView`], which leaves out RPC endpoints since they may
//! carry credentials.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router, response::IntoResponse};
use serde_json::json;
use sourcify_chains::{ChainView, Error, Registry, SourcifyChain};
#[cfg(feature = "telemetry")]
use tracing::instrument;

/// Shared registry state used by the route handlers.
pub type RegistryState = Arc<Registry>;

/// Creates the router with all registry endpoints.
pub fn routes() -> Router<RegistryState> {
    Router::new()
        .route("/", get(get_root))
        .route("/health", get(get_health))
        .route("/chains", get(get_chains))
        .route("/chains/supported", get(get_supported_chains))
        .route("/chains/{chain_id}", get(get_chain))
}

fn views(chains: &[Arc<SourcifyChain>]) -> Vec<ChainView<'_>> {
    chains.iter().map(|chain| ChainView::from(chain.as_ref())).collect()
}

/// `GET /`
#[cfg_attr(feature = "telemetry", instrument(skip_all))]
async fn get_root() -> impl IntoResponse {
    (
        StatusCode::OK,
        concat!("Hello from ", env!("CARGO_PKG_NAME"), "!"),
    )
}

/// `GET /health` — liveness check.
#[cfg_attr(feature = "telemetry", instrument(skip_all))]
async fn get_health() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({ "status": "ok" })))
}

/// `GET /chains` — every registered chain, display sorted.
#[cfg_attr(feature = "telemetry", instrument(skip_all))]
async fn get_chains(State(registry): State<RegistryState>) -> impl IntoResponse {
    Json(json!(views(registry.chains())))
}

/// `GET /chains/supported` — chains accepting new verifications.
#[cfg_attr(feature = "telemetry", instrument(skip_all))]
async fn get_supported_chains(State(registry): State<RegistryState>) -> impl IntoResponse {
    Json(json!(views(registry.supported_chains())))
}

/// `GET /chains/{chain_id}`
#[cfg_attr(feature = "telemetry", instrument(skip_all))]
async fn get_chain(
    State(registry): State<RegistryState>,
    Path(chain_id): Path<String>,
) -> impl IntoResponse {
    match registry.get(&chain_id) {
        Some(chain) => (StatusCode::OK, Json(json!(ChainView::from(chain)))).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": Error::UnknownChain(chain_id).to_string() })),
        )
            .into_response(),
    }
}
