//! One-shot fallback from routed to direct-discovery mode.
//!
//! [`FallbackMetadataClient`] prefers the routed client. On first use it
//! probes the router with a lightweight ping; an I/O or auth failure pins a
//! direct-discovery client instead. The decision is taken at most once per
//! process: once a client is pinned it serves every subsequent call, and
//! there is no recovery back to routed mode.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::OnceCell;

use curator_core::EntityType;

use crate::client::{MetadataClient, MetadataIndex, RouterConfig};
use crate::error::{MetadataError, Result};
use crate::registry::HttpServiceRegistry;
use crate::resolver::{DEFAULT_RESOLVE_TIMEOUT, EndpointResolver};

/// Metadata client that decides its access mode on first use.
pub struct FallbackMetadataClient {
    router: RouterConfig,
    registry_connection: String,
    resolve_timeout: Duration,
    pinned: OnceCell<Arc<MetadataClient>>,
}

impl FallbackMetadataClient {
    /// Creates a selector over the given router configuration and registry
    /// connection string.
    #[must_use]
    pub fn new(router: RouterConfig, registry_connection: impl Into<String>) -> Self {
        Self {
            router,
            registry_connection: registry_connection.into(),
            resolve_timeout: DEFAULT_RESOLVE_TIMEOUT,
            pinned: OnceCell::new(),
        }
    }

    /// Overrides the endpoint-resolution timeout used in direct mode.
    #[must_use]
    pub fn with_resolve_timeout(mut self, timeout: Duration) -> Self {
        self.resolve_timeout = timeout;
        self
    }

    /// Returns the pinned client, deciding the access mode on first call.
    ///
    /// Concurrent first use constructs exactly one client; a transient probe
    /// failure pins direct mode permanently, the same as a lasting one.
    ///
    /// # Errors
    ///
    /// Propagates direct-client construction failures (e.g. an unusable
    /// registry connection string); no client is pinned in that case.
    pub async fn client(&self) -> Result<Arc<MetadataClient>> {
        self.pinned
            .get_or_try_init(|| async {
                match self.probe_router().await {
                    Ok(()) => {
                        tracing::debug!(router = %self.router.base_url, "router ping ok, using routed mode");
                        Ok(Arc::new(MetadataClient::routed(self.router.clone())))
                    }
                    Err(err) if err.triggers_fallback() => {
                        tracing::error!(
                            router = %self.router.base_url,
                            error = %err,
                            "router ping failed, falling back to direct discovery"
                        );
                        self.build_direct_client().map(Arc::new)
                    }
                    Err(err) => Err(err),
                }
            })
            .await
            .cloned()
    }

    /// Minimal liveness probe against the router.
    async fn probe_router(&self) -> Result<()> {
        let client = reqwest::Client::builder()
            .timeout(self.router.timeout)
            .build()
            .map_err(|e| MetadataError::transport(format!("building probe client: {e}")))?;

        let response = client.get(self.router.ping_url()).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(MetadataError::Unauthenticated {
                message: "router ping rejected credential".to_string(),
            });
        }
        Err(MetadataError::transport(format!(
            "router ping failed ({status})"
        )))
    }

    fn build_direct_client(&self) -> Result<MetadataClient> {
        let registry = HttpServiceRegistry::from_connection_string(&self.registry_connection)?;
        let resolver = EndpointResolver::for_metadata_service(Arc::new(registry));
        Ok(MetadataClient::direct_with_timeout(
            resolver,
            self.resolve_timeout,
        ))
    }
}

impl std::fmt::Debug for FallbackMetadataClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FallbackMetadataClient")
            .field("router", &self.router)
            .field("registry_connection", &self.registry_connection)
            .field("pinned", &self.pinned.initialized())
            .finish()
    }
}

#[async_trait]
impl MetadataIndex for FallbackMetadataClient {
    async fn entity_num(&self, tag: &str, namespace: &str) -> Result<usize> {
        self.client().await?.entity_num(tag, namespace).await
    }

    async fn discovered_tags(&self, namespace: &str) -> Result<BTreeSet<String>> {
        self.client().await?.discovered_tags(namespace).await
    }

    async fn entity_tags(
        &self,
        namespace: &str,
        entity_type: EntityType,
        entity_name: &str,
    ) -> Result<BTreeSet<String>> {
        self.client()
            .await?
            .entity_tags(namespace, entity_type, entity_name)
            .await
    }
}
