//! Endpoint resolution for direct-discovery mode.
//!
//! [`EndpointResolver`] turns a logical service name into a live
//! [`ServiceEndpoint`] through the registry. The selection strategy is
//! constructed lazily exactly once per resolver; the endpoint itself is
//! re-picked from current membership on every call.

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tokio::sync::OnceCell;
use tokio::time::Instant;

use curator_core::ServiceEndpoint;

use crate::error::{MetadataError, Result};
use crate::registry::ServiceRegistry;

/// Logical name of the metadata service in the registry.
pub const METADATA_SERVICE: &str = "metadata.service";

/// Default bound on how long a resolve call may block.
pub const DEFAULT_RESOLVE_TIMEOUT: Duration = Duration::from_secs(3);

/// Delay between membership polls while waiting for an instance to appear.
const POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Picks one live instance uniformly at random from current membership.
#[derive(Clone)]
pub struct RandomEndpointStrategy {
    registry: Arc<dyn ServiceRegistry>,
    service_name: String,
}

impl RandomEndpointStrategy {
    /// Creates a strategy over `registry` for `service_name`.
    #[must_use]
    pub fn new(registry: Arc<dyn ServiceRegistry>, service_name: impl Into<String>) -> Self {
        Self {
            registry,
            service_name: service_name.into(),
        }
    }

    /// Returns a random live endpoint, or `None` when membership is empty.
    ///
    /// # Errors
    ///
    /// Propagates registry lookup failures.
    pub async fn pick(&self) -> Result<Option<ServiceEndpoint>> {
        let mut endpoints = self.registry.discover(&self.service_name).await?;
        if endpoints.is_empty() {
            return Ok(None);
        }
        let index = rand::thread_rng().gen_range(0..endpoints.len());
        Ok(Some(endpoints.swap_remove(index)))
    }
}

impl std::fmt::Debug for RandomEndpointStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RandomEndpointStrategy")
            .field("service_name", &self.service_name)
            .finish_non_exhaustive()
    }
}

/// Resolves the network location of the metadata service.
///
/// The strategy cell initializes at most once even under concurrent first
/// use; every `resolve` call re-picks from the registry's current
/// membership.
pub struct EndpointResolver {
    registry: Arc<dyn ServiceRegistry>,
    service_name: String,
    strategy: OnceCell<RandomEndpointStrategy>,
}

impl EndpointResolver {
    /// Creates a resolver for `service_name` over `registry`.
    #[must_use]
    pub fn new(registry: Arc<dyn ServiceRegistry>, service_name: impl Into<String>) -> Self {
        Self {
            registry,
            service_name: service_name.into(),
            strategy: OnceCell::new(),
        }
    }

    /// Creates a resolver for the metadata service.
    #[must_use]
    pub fn for_metadata_service(registry: Arc<dyn ServiceRegistry>) -> Self {
        Self::new(registry, METADATA_SERVICE)
    }

    /// Resolves a live endpoint, blocking up to `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`MetadataError::ServiceUnavailable`] when no instance is
    /// registered within the timeout, and propagates registry failures.
    pub async fn resolve(&self, timeout: Duration) -> Result<ServiceEndpoint> {
        let strategy = self
            .strategy
            .get_or_init(|| async {
                RandomEndpointStrategy::new(
                    Arc::clone(&self.registry),
                    self.service_name.clone(),
                )
            })
            .await;

        let deadline = Instant::now() + timeout;
        loop {
            if let Some(endpoint) = strategy.pick().await? {
                return Ok(endpoint);
            }
            if Instant::now() + POLL_INTERVAL > deadline {
                return Err(MetadataError::ServiceUnavailable {
                    service: self.service_name.clone(),
                });
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }
}

impl std::fmt::Debug for EndpointResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EndpointResolver")
            .field("service_name", &self.service_name)
            .field("strategy_initialized", &self.strategy.initialized())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StaticRegistry {
        endpoints: Vec<ServiceEndpoint>,
        lookups: AtomicUsize,
    }

    impl StaticRegistry {
        fn new(endpoints: Vec<ServiceEndpoint>) -> Arc<Self> {
            Arc::new(Self {
                endpoints,
                lookups: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl ServiceRegistry for StaticRegistry {
        async fn discover(&self, _service_name: &str) -> Result<Vec<ServiceEndpoint>> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            Ok(self.endpoints.clone())
        }
    }

    #[tokio::test]
    async fn resolve_picks_a_registered_endpoint() {
        let members = vec![
            ServiceEndpoint::new("10.0.0.1", 11015),
            ServiceEndpoint::new("10.0.0.2", 11015),
        ];
        let registry = StaticRegistry::new(members.clone());
        let resolver = EndpointResolver::for_metadata_service(registry);

        let endpoint = resolver.resolve(Duration::from_secs(1)).await.unwrap();
        assert!(members.contains(&endpoint));
    }

    #[tokio::test]
    async fn resolve_repicks_membership_on_every_call() {
        let registry = StaticRegistry::new(vec![ServiceEndpoint::new("10.0.0.1", 11015)]);
        let resolver = EndpointResolver::for_metadata_service(registry.clone());

        resolver.resolve(Duration::from_secs(1)).await.unwrap();
        resolver.resolve(Duration::from_secs(1)).await.unwrap();
        assert_eq!(registry.lookups.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn resolve_times_out_on_empty_membership() {
        let registry = StaticRegistry::new(Vec::new());
        let resolver = EndpointResolver::for_metadata_service(registry);

        let err = resolver.resolve(Duration::from_millis(50)).await.unwrap_err();
        assert!(matches!(
            err,
            MetadataError::ServiceUnavailable { service } if service == METADATA_SERVICE
        ));
    }
}
