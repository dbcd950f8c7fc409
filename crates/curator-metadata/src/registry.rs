//! Service-registry abstraction and HTTP registry client.
//!
//! The registry maps a logical service name to the set of currently live
//! network addresses. [`HttpServiceRegistry`] reaches a registry service
//! over HTTP; tests and embedders can substitute any [`ServiceRegistry`]
//! implementation.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use curator_core::ServiceEndpoint;

use crate::error::{MetadataError, Result};

const DEFAULT_REGISTRY_TIMEOUT: Duration = Duration::from_secs(5);

/// Point-in-time lookup of live instances for a logical service name.
#[async_trait]
pub trait ServiceRegistry: Send + Sync + 'static {
    /// Returns the current membership snapshot for `service_name`.
    ///
    /// An empty vector means no instance is registered right now; callers
    /// decide whether to retry.
    async fn discover(&self, service_name: &str) -> Result<Vec<ServiceEndpoint>>;
}

/// Normalizes a registry connection string into a base URL.
///
/// Connection strings may carry an embedded sub-path suffix (for example a
/// `/kafka` chroot inherited from shared configuration); everything from the
/// first `/` of the authority onwards is stripped before use. A scheme is
/// optional and defaults to `http`.
///
/// # Errors
///
/// Returns [`MetadataError::InvalidUrl`] when the string is empty or has no
/// authority part.
pub fn registry_base_url(connection_string: &str) -> Result<String> {
    let trimmed = connection_string.trim();
    if trimmed.is_empty() {
        return Err(MetadataError::invalid_url(
            "registry connection string is empty",
        ));
    }

    let (scheme, rest) = match trimmed.split_once("://") {
        Some((scheme, rest)) => (scheme, rest),
        None => ("http", trimmed),
    };

    let authority = rest.split('/').next().unwrap_or_default();
    if authority.is_empty() {
        return Err(MetadataError::invalid_url(format!(
            "registry connection string has no authority: {connection_string}"
        )));
    }

    Ok(format!("{scheme}://{authority}"))
}

/// Instance record as returned by the registry service.
#[derive(Debug, Deserialize)]
struct InstanceRecord {
    host: String,
    port: u16,
}

/// Registry client over HTTP.
///
/// Queries `GET {base}/v1/services/{name}/instances`, expecting a JSON array
/// of `{host, port}` records.
#[derive(Debug, Clone)]
pub struct HttpServiceRegistry {
    base_url: String,
    client: reqwest::Client,
}

impl HttpServiceRegistry {
    /// Creates a registry client from a connection string.
    ///
    /// # Errors
    ///
    /// Returns [`MetadataError::InvalidUrl`] when the connection string does
    /// not yield a usable base URL.
    pub fn from_connection_string(connection_string: &str) -> Result<Self> {
        let base_url = registry_base_url(connection_string)?;
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_REGISTRY_TIMEOUT)
            .build()
            .map_err(|e| MetadataError::transport(format!("building registry client: {e}")))?;
        Ok(Self { base_url, client })
    }

    fn instances_url(&self, service_name: &str) -> String {
        format!(
            "{}/v1/services/{service_name}/instances",
            self.base_url.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl ServiceRegistry for HttpServiceRegistry {
    async fn discover(&self, service_name: &str) -> Result<Vec<ServiceEndpoint>> {
        let response = self
            .client
            .get(self.instances_url(service_name))
            .send()
            .await
            .map_err(|e| MetadataError::transport(format!("registry lookup failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MetadataError::transport(format!(
                "registry lookup failed ({status}): {body}"
            )));
        }

        let records: Vec<InstanceRecord> = response
            .json()
            .await
            .map_err(|e| MetadataError::transport(format!("invalid registry response: {e}")))?;

        Ok(records
            .into_iter()
            .map(|r| ServiceEndpoint::new(r.host, r.port))
            .collect())
    }
}
