//! Dual-mode HTTP client for the metadata service.
//!
//! [`MetadataClient`] builds request URLs and executes requests uniformly
//! across both access modes. Routed mode delegates URL resolution to the
//! gateway configuration and attaches the caller's access token; direct mode
//! resolves the service address through [`EndpointResolver`] and calls it
//! unauthenticated.

use std::collections::BTreeSet;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};

use curator_core::{AccessMode, EntityRef, EntityType};

use crate::error::{MetadataError, Result};
use crate::resolver::{DEFAULT_RESOLVE_TIMEOUT, EndpointResolver};

/// Metadata API version prefix on the service and the gateway.
pub const API_VERSION: &str = "v3";

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Metadata scope attached tags are read from.
///
/// Only USER scope is consumed by the governance layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataScope {
    /// Caller-managed metadata.
    User,
    /// Service-managed metadata.
    System,
}

impl MetadataScope {
    /// Returns the wire value for the `scope` query parameter.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "USER",
            Self::System => "SYSTEM",
        }
    }
}

/// One hit from a metadata search: the entity plus its matched metadata.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResultRecord {
    /// The entity whose metadata matched the query.
    pub entity: EntityRef,
}

/// Gateway/router client configuration for routed mode.
#[derive(Clone)]
pub struct RouterConfig {
    /// Base URL of the router (e.g. `http://router:11015`).
    pub base_url: String,
    /// Access token attached as a bearer credential, when present.
    pub access_token: Option<String>,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl RouterConfig {
    /// Creates a router configuration with the default timeout.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            access_token: None,
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Attaches an access token.
    #[must_use]
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    /// Overrides the per-request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the router's liveness-probe URL.
    #[must_use]
    pub fn ping_url(&self) -> String {
        format!("{}/ping", self.base_url.trim_end_matches('/'))
    }
}

impl std::fmt::Debug for RouterConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouterConfig")
            .field("base_url", &self.base_url)
            .field(
                "access_token",
                &self.access_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// How a [`MetadataClient`] reaches the service. Fixed at construction.
enum ClientMode {
    Routed(RouterConfig),
    Direct {
        resolver: EndpointResolver,
        resolve_timeout: Duration,
    },
}

/// Dual-mode client for the metadata service.
pub struct MetadataClient {
    mode: ClientMode,
    http: reqwest::Client,
}

impl MetadataClient {
    /// Creates a routed-mode client executing through the gateway.
    #[must_use]
    pub fn routed(config: RouterConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            mode: ClientMode::Routed(config),
            http,
        }
    }

    /// Creates a direct-discovery-mode client over `resolver`.
    #[must_use]
    pub fn direct(resolver: EndpointResolver) -> Self {
        Self::direct_with_timeout(resolver, DEFAULT_RESOLVE_TIMEOUT)
    }

    /// Creates a direct-mode client with an explicit resolution timeout.
    #[must_use]
    pub fn direct_with_timeout(resolver: EndpointResolver, resolve_timeout: Duration) -> Self {
        let http = reqwest::Client::builder()
            .timeout(DEFAULT_REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            mode: ClientMode::Direct {
                resolver,
                resolve_timeout,
            },
            http,
        }
    }

    /// Returns which access mode this client was constructed with.
    #[must_use]
    pub fn access_mode(&self) -> AccessMode {
        match self.mode {
            ClientMode::Routed(_) => AccessMode::Routed,
            ClientMode::Direct { .. } => AccessMode::Direct,
        }
    }

    /// Builds the namespaced URL for `path` according to the access mode.
    ///
    /// # Errors
    ///
    /// In direct mode, propagates endpoint-resolution failures.
    pub async fn resolve_url(&self, namespace: &str, path: &str) -> Result<String> {
        match &self.mode {
            ClientMode::Routed(config) => Ok(format!(
                "{}/{API_VERSION}/namespaces/{namespace}/{path}",
                config.base_url.trim_end_matches('/')
            )),
            ClientMode::Direct {
                resolver,
                resolve_timeout,
            } => {
                let endpoint = resolver.resolve(*resolve_timeout).await?;
                Ok(format!(
                    "http://{}:{}/{API_VERSION}/namespaces/{namespace}/{path}",
                    endpoint.host, endpoint.port
                ))
            }
        }
    }

    /// Executes `request`, attaching the router credential in routed mode.
    ///
    /// Responses whose status is 2xx or listed in `allowed_error_codes` are
    /// returned as-is; anything else maps to a typed [`MetadataError`].
    ///
    /// # Errors
    ///
    /// Returns [`MetadataError::BadRequest`] / [`MetadataError::NotFound`] /
    /// [`MetadataError::Unauthenticated`] for 400/404/401 responses and
    /// [`MetadataError::Transport`] for I/O failures and other statuses.
    pub async fn execute(
        &self,
        request: RequestBuilder,
        allowed_error_codes: &[StatusCode],
    ) -> Result<Response> {
        let request = match &self.mode {
            ClientMode::Routed(config) => match &config.access_token {
                Some(token) => request.bearer_auth(token),
                None => request,
            },
            ClientMode::Direct { .. } => request,
        };

        let response = request.send().await?;
        let status = response.status();
        if status.is_success() || allowed_error_codes.contains(&status) {
            return Ok(response);
        }

        let message = response.text().await.unwrap_or_default();
        Err(match status {
            StatusCode::BAD_REQUEST => MetadataError::BadRequest { message },
            StatusCode::NOT_FOUND => MetadataError::NotFound { message },
            StatusCode::UNAUTHORIZED => MetadataError::Unauthenticated { message },
            _ => MetadataError::transport(format!("metadata request failed ({status}): {message}")),
        })
    }

    /// Searches the metadata index.
    ///
    /// Query `"*"` matches everything of the given target types. A 404 from
    /// the service (namespace not indexed yet) is treated as no matches.
    ///
    /// # Errors
    ///
    /// Propagates resolution and transport failures.
    pub async fn search_metadata(
        &self,
        namespace: &str,
        query: &str,
        target_types: &BTreeSet<EntityType>,
    ) -> Result<BTreeSet<SearchResultRecord>> {
        let url = self.resolve_url(namespace, "metadata/search").await?;
        let mut request = self.http.get(&url).query(&[("query", query)]);
        for target in target_types {
            request = request.query(&[("target", target.target())]);
        }

        let response = self.execute(request, &[StatusCode::NOT_FOUND]).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(BTreeSet::new());
        }

        let records: Vec<SearchResultRecord> = response
            .json()
            .await
            .map_err(|e| MetadataError::transport(format!("invalid search response: {e}")))?;
        Ok(records.into_iter().collect())
    }

    /// Fetches the tags attached to `entity` under `scope`.
    ///
    /// # Errors
    ///
    /// Propagates resolution and transport failures; an entity missing from
    /// the index is [`MetadataError::NotFound`].
    pub async fn entity_tags_scoped(
        &self,
        entity: &EntityRef,
        scope: MetadataScope,
    ) -> Result<BTreeSet<String>> {
        let path = format!(
            "{}/{}/metadata/tags",
            entity.entity_type.path_segment(),
            entity.name
        );
        let url = self.resolve_url(&entity.namespace, &path).await?;
        let request = self.http.get(&url).query(&[("scope", scope.as_str())]);

        let response = self.execute(request, &[]).await?;
        let tags: BTreeSet<String> = response
            .json()
            .await
            .map_err(|e| MetadataError::transport(format!("invalid tags response: {e}")))?;
        Ok(tags)
    }

    async fn aggregate_user_tags(
        &self,
        records: BTreeSet<SearchResultRecord>,
    ) -> Result<BTreeSet<String>> {
        let mut tags = BTreeSet::new();
        for record in records {
            tags.extend(
                self.entity_tags_scoped(&record.entity, MetadataScope::User)
                    .await?,
            );
        }
        Ok(tags)
    }
}

/// The uniform tag-search contract, independent of access mode.
#[async_trait]
pub trait MetadataIndex: Send + Sync + 'static {
    /// Counts dataset/stream entities whose metadata search matches `tag`.
    async fn entity_num(&self, tag: &str, namespace: &str) -> Result<usize>;

    /// Returns every USER-scope tag attached to any dataset or stream in
    /// `namespace`.
    async fn discovered_tags(&self, namespace: &str) -> Result<BTreeSet<String>>;

    /// Returns the USER-scope tags of the entity found by searching
    /// `entity_name` with the single matching target type.
    async fn entity_tags(
        &self,
        namespace: &str,
        entity_type: EntityType,
        entity_name: &str,
    ) -> Result<BTreeSet<String>>;
}

#[async_trait]
impl MetadataIndex for MetadataClient {
    async fn entity_num(&self, tag: &str, namespace: &str) -> Result<usize> {
        let targets: BTreeSet<EntityType> =
            [EntityType::Dataset, EntityType::Stream].into_iter().collect();
        let records = self.search_metadata(namespace, tag, &targets).await?;
        Ok(records.len())
    }

    async fn discovered_tags(&self, namespace: &str) -> Result<BTreeSet<String>> {
        let targets: BTreeSet<EntityType> =
            [EntityType::Dataset, EntityType::Stream].into_iter().collect();
        let records = self.search_metadata(namespace, "*", &targets).await?;
        self.aggregate_user_tags(records).await
    }

    async fn entity_tags(
        &self,
        namespace: &str,
        entity_type: EntityType,
        entity_name: &str,
    ) -> Result<BTreeSet<String>> {
        let targets: BTreeSet<EntityType> = [entity_type].into_iter().collect();
        let records = self.search_metadata(namespace, entity_name, &targets).await?;
        self.aggregate_user_tags(records).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ServiceRegistry;
    use axum::Router;
    use axum::extract::{Path, Query};
    use axum::http::HeaderMap;
    use axum::routing::get;
    use axum::Json;
    use serde_json::json;
    use std::collections::HashMap;
    use std::net::SocketAddr;
    use std::sync::Arc;

    async fn spawn_metadata_service() -> SocketAddr {
        // Namespace `default` holds dataset `orders` tagged {pii, finance}
        // and stream `clicks` tagged {clickstream}.
        let search = |Path(ns): Path<String>, Query(params): Query<HashMap<String, String>>| async move {
            let query = params.get("query").cloned().unwrap_or_default();
            if ns != "default" {
                return Json(json!([]));
            }
            match query.as_str() {
                "*" => Json(json!([
                    { "entity": { "namespace": "default", "entityType": "dataset", "name": "orders" } },
                    { "entity": { "namespace": "default", "entityType": "stream", "name": "clicks" } },
                ])),
                "pii" | "orders" => Json(json!([
                    { "entity": { "namespace": "default", "entityType": "dataset", "name": "orders" } },
                ])),
                "clicks" => Json(json!([
                    { "entity": { "namespace": "default", "entityType": "stream", "name": "clicks" } },
                ])),
                _ => Json(json!([])),
            }
        };

        let tags = |Path((_ns, kind, name)): Path<(String, String, String)>| async move {
            match (kind.as_str(), name.as_str()) {
                ("datasets", "orders") => Json(json!(["pii", "finance"])),
                ("streams", "clicks") => Json(json!(["clickstream"])),
                _ => Json(json!([])),
            }
        };

        let app = Router::new()
            .route("/v3/namespaces/{ns}/metadata/search", get(search))
            .route("/v3/namespaces/{ns}/{kind}/{name}/metadata/tags", get(tags));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        addr
    }

    struct OneShotRegistry(curator_core::ServiceEndpoint);

    #[async_trait]
    impl ServiceRegistry for OneShotRegistry {
        async fn discover(
            &self,
            _service_name: &str,
        ) -> Result<Vec<curator_core::ServiceEndpoint>> {
            Ok(vec![self.0.clone()])
        }
    }

    fn direct_client(addr: SocketAddr) -> MetadataClient {
        let registry = Arc::new(OneShotRegistry(curator_core::ServiceEndpoint::new(
            addr.ip().to_string(),
            addr.port(),
        )));
        MetadataClient::direct(EndpointResolver::for_metadata_service(registry))
    }

    #[tokio::test]
    async fn routed_mode_builds_gateway_urls() {
        let client = MetadataClient::routed(RouterConfig::new("http://router:11015/"));
        let url = client.resolve_url("default", "metadata/search").await.unwrap();
        assert_eq!(url, "http://router:11015/v3/namespaces/default/metadata/search");
        assert_eq!(client.access_mode(), AccessMode::Routed);
    }

    #[tokio::test]
    async fn direct_mode_builds_resolved_urls() {
        let addr = spawn_metadata_service().await;
        let client = direct_client(addr);
        let url = client.resolve_url("default", "metadata/search").await.unwrap();
        assert_eq!(
            url,
            format!("http://{}:{}/v3/namespaces/default/metadata/search", addr.ip(), addr.port())
        );
        assert_eq!(client.access_mode(), AccessMode::Direct);
    }

    #[tokio::test]
    async fn discovered_tags_unions_user_scope_tags() {
        let addr = spawn_metadata_service().await;
        let client = direct_client(addr);

        let tags = client.discovered_tags("default").await.unwrap();
        let expected: BTreeSet<String> = ["pii", "finance", "clickstream"]
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(tags, expected);
    }

    #[tokio::test]
    async fn entity_num_counts_search_hits() {
        let addr = spawn_metadata_service().await;
        let client = direct_client(addr);

        assert_eq!(client.entity_num("pii", "default").await.unwrap(), 1);
        assert_eq!(client.entity_num("nothing", "default").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn entity_tags_searches_single_target_type() {
        let addr = spawn_metadata_service().await;
        let client = direct_client(addr);

        let tags = client
            .entity_tags("default", EntityType::Stream, "clicks")
            .await
            .unwrap();
        let expected: BTreeSet<String> = ["clickstream".to_string()].into_iter().collect();
        assert_eq!(tags, expected);
    }

    #[tokio::test]
    async fn routed_mode_attaches_bearer_token() {
        let app = Router::new().route(
            "/v3/namespaces/default/metadata/search",
            get(|headers: HeaderMap| async move {
                let authorized = headers
                    .get("authorization")
                    .and_then(|v| v.to_str().ok())
                    .is_some_and(|v| v == "Bearer sekrit");
                if authorized {
                    Json(json!([]))
                } else {
                    Json(json!("missing token"))
                }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        let client = MetadataClient::routed(
            RouterConfig::new(format!("http://{addr}")).with_access_token("sekrit"),
        );
        let targets: BTreeSet<EntityType> = [EntityType::Dataset].into_iter().collect();
        let records = client
            .search_metadata("default", "*", &targets)
            .await
            .unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn execute_maps_statuses_to_typed_errors() {
        async fn status_client(status: axum::http::StatusCode) -> MetadataClient {
            let app = Router::new().route(
                "/v3/namespaces/default/metadata/search",
                get(move || async move { (status, "nope") }),
            );
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
                .await
                .expect("bind");
            let addr = listener.local_addr().expect("local addr");
            tokio::spawn(async move {
                let _ = axum::serve(listener, app).await;
            });
            MetadataClient::routed(RouterConfig::new(format!("http://{addr}")))
        }

        let client = status_client(axum::http::StatusCode::BAD_REQUEST).await;
        let targets: BTreeSet<EntityType> = [EntityType::Dataset].into_iter().collect();
        let err = client
            .search_metadata("default", "*", &targets)
            .await
            .unwrap_err();
        assert!(matches!(err, MetadataError::BadRequest { .. }));

        let client = status_client(axum::http::StatusCode::UNAUTHORIZED).await;
        let err = client
            .search_metadata("default", "*", &targets)
            .await
            .unwrap_err();
        assert!(matches!(err, MetadataError::Unauthenticated { .. }));

        let client = status_client(axum::http::StatusCode::INTERNAL_SERVER_ERROR).await;
        let err = client
            .search_metadata("default", "*", &targets)
            .await
            .unwrap_err();
        assert!(matches!(err, MetadataError::Transport { .. }));
    }

    #[tokio::test]
    async fn search_treats_not_found_as_empty() {
        let app = Router::new().route(
            "/v3/namespaces/empty/metadata/search",
            get(|| async { (axum::http::StatusCode::NOT_FOUND, "no index") }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        let client = MetadataClient::routed(RouterConfig::new(format!("http://{addr}")));
        let targets: BTreeSet<EntityType> = [EntityType::Dataset].into_iter().collect();
        let records = client.search_metadata("empty", "*", &targets).await.unwrap();
        assert!(records.is_empty());
    }
}
