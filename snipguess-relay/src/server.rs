//! HTTP server setup and routing
//!
//! Builds the Axum router: the two proxy routes, a static-file fallback
//! with standard MIME mapping, and permissive CORS on every response
//! (preflight OPTIONS short-circuits with 200 inside the CORS layer).

use axum::{routing::get, Router};
use snipguess_core::catalog::CatalogEndpoints;
use std::path::Path;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::handlers;

/// Connect timeout for upstream catalog requests.
///
/// No total request timeout: audio downloads are long-lived streams.
const CONNECT_TIMEOUT_SECS: u64 = 10;

const USER_AGENT: &str = concat!("snipguess-relay/", env!("CARGO_PKG_VERSION"));

/// Shared application context passed to all handlers
#[derive(Clone)]
pub struct RelayContext {
    pub http_client: reqwest::Client,
    pub catalog: CatalogEndpoints,
}

impl RelayContext {
    /// Context targeting the given catalog base URL
    pub fn new(catalog_base: &str) -> anyhow::Result<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            http_client,
            catalog: CatalogEndpoints::new(catalog_base),
        })
    }
}

/// Build the relay router over a static front-end directory.
pub fn create_router(ctx: RelayContext, static_dir: &Path) -> Router {
    Router::new()
        .route("/api/random", get(handlers::proxy_random))
        .route("/api/audio/*path", get(handlers::proxy_audio))
        .fallback_service(ServeDir::new(static_dir))
        .with_state(ctx)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
