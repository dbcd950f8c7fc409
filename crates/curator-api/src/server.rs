//! API server implementation.
//!
//! Provides health, ready, and tag-governance endpoints for Curator.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::http::{HeaderValue, Method, header};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use curator_core::{MemoryTagStore, PreferredTagStore};
use curator_governance::TagGovernanceService;
use curator_metadata::{FallbackMetadataClient, MetadataIndex, RouterConfig};

use crate::config::{Config, CorsConfig};
use crate::error::ApiError;

/// Health check response.
#[derive(Debug, Serialize)]
#[cfg_attr(test, derive(serde::Deserialize))]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
}

/// Readiness check response.
#[derive(Debug, Serialize)]
#[cfg_attr(test, derive(serde::Deserialize))]
pub struct ReadyResponse {
    /// Service readiness status.
    pub ready: bool,
}

/// Shared application state for all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Config,
    /// Governance service wired over the store and the metadata index.
    pub governance: TagGovernanceService,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .field("governance", &"<TagGovernanceService>")
            .finish()
    }
}

impl AppState {
    /// Creates application state over explicit collaborators.
    #[must_use]
    pub fn new(
        config: Config,
        store: Arc<dyn PreferredTagStore>,
        index: Arc<dyn MetadataIndex>,
    ) -> Self {
        Self {
            config,
            governance: TagGovernanceService::new(store, index),
        }
    }

    /// Creates application state with the fallback metadata client derived
    /// from configuration and an in-memory store.
    #[must_use]
    pub fn from_config(config: Config) -> Self {
        let router = RouterConfig::new(config.router_url())
            .with_timeout(config.request_timeout());
        let router = match &config.router_token {
            Some(token) => router.with_access_token(token),
            None => router,
        };
        let index = Arc::new(
            FallbackMetadataClient::new(router, config.registry())
                .with_resolve_timeout(config.resolve_timeout()),
        );
        Self::new(config, Arc::new(MemoryTagStore::new()), index)
    }
}

async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

async fn ready() -> impl IntoResponse {
    Json(ReadyResponse { ready: true })
}

async fn serve_openapi() -> Result<impl IntoResponse, ApiError> {
    let json = crate::openapi::openapi_json()
        .map_err(|e| ApiError::internal(format!("serializing OpenAPI spec: {e}")))?;
    Ok((
        [(header::CONTENT_TYPE, "application/json")],
        json,
    ))
}

fn cors_layer(config: &CorsConfig) -> Option<CorsLayer> {
    if config.allowed_origins.is_empty() {
        return None;
    }

    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers(Any)
        .max_age(Duration::from_secs(config.max_age_seconds));

    let layer = if config.allowed_origins.iter().any(|o| o == "*") {
        layer.allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|o| HeaderValue::from_str(o).ok())
            .collect();
        layer.allow_origin(AllowOrigin::list(origins))
    };

    Some(layer)
}

/// Builds the full application router over `state`.
pub fn build_router(state: Arc<AppState>) -> Router {
    let mut router = Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready))
        .route("/api-docs/openapi.json", get(serve_openapi))
        .nest("/v1", crate::routes::v1_routes());

    if let Some(cors) = cors_layer(&state.config.cors) {
        router = router.layer(cors);
    }

    router
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// The Curator API server.
pub struct Server {
    state: Arc<AppState>,
}

impl Server {
    /// Creates a server over pre-built application state.
    #[must_use]
    pub fn new(state: AppState) -> Self {
        Self {
            state: Arc::new(state),
        }
    }

    /// Creates a server wired from configuration.
    #[must_use]
    pub fn from_config(config: Config) -> Self {
        Self::new(AppState::from_config(config))
    }

    /// Returns the router without binding a listener (for tests).
    #[must_use]
    pub fn test_router(&self) -> Router {
        build_router(Arc::clone(&self.state))
    }

    /// Binds the configured port and serves until shutdown.
    ///
    /// # Errors
    ///
    /// Returns an error when binding or serving fails.
    pub async fn serve(self) -> std::io::Result<()> {
        let addr = SocketAddr::from(([0, 0, 0, 0], self.state.config.http_port));
        let router = build_router(Arc::clone(&self.state));

        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!(addr = %addr, "Curator API listening");
        axum::serve(listener, router).await
    }
}
