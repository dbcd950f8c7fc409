//! Server configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use curator_core::{Error, Result};

const DEFAULT_HTTP_PORT: u16 = 8080;
const DEFAULT_RESOLVE_TIMEOUT_SECS: u64 = 3;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Debug-mode default for the router base URL.
const DEBUG_ROUTER_URL: &str = "http://127.0.0.1:11015";
/// Debug-mode default for the registry connection string.
const DEBUG_REGISTRY: &str = "127.0.0.1:2181";

/// CORS configuration for browser-based access.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Allowed origins. Use `["*"]` to allow all origins (development only).
    /// Empty list disables CORS entirely.
    pub allowed_origins: Vec<String>,

    /// Max age for preflight cache (seconds).
    pub max_age_seconds: u64,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            // Default: disabled (secure-by-default).
            allowed_origins: Vec::new(),
            max_age_seconds: 3600,
        }
    }
}

/// Configuration for the Curator API server.
#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server port.
    pub http_port: u16,

    /// Enable debug mode.
    ///
    /// When enabled, missing router/registry settings fall back to local
    /// defaults and logs are pretty-printed instead of JSON.
    pub debug: bool,

    /// Base URL of the gateway/router (e.g. `http://router:11015`).
    /// Required when `debug` is false.
    #[serde(default)]
    pub router_url: Option<String>,

    /// Access token attached to routed-mode requests.
    #[serde(default)]
    pub router_token: Option<String>,

    /// Registry connection string for direct-discovery fallback; may carry
    /// an embedded sub-path suffix, which is stripped before use.
    /// Required when `debug` is false.
    #[serde(default)]
    pub registry: Option<String>,

    /// Bound on endpoint resolution in direct mode, in seconds.
    #[serde(default = "default_resolve_timeout_secs")]
    pub resolve_timeout_secs: u64,

    /// Per-request timeout for metadata calls, in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// CORS configuration.
    #[serde(default)]
    pub cors: CorsConfig,
}

fn default_resolve_timeout_secs() -> u64 {
    DEFAULT_RESOLVE_TIMEOUT_SECS
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http_port: DEFAULT_HTTP_PORT,
            debug: false,
            router_url: None,
            router_token: None,
            registry: None,
            resolve_timeout_secs: DEFAULT_RESOLVE_TIMEOUT_SECS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            cors: CorsConfig::default(),
        }
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("http_port", &self.http_port)
            .field("debug", &self.debug)
            .field("router_url", &self.router_url)
            .field(
                "router_token",
                &self.router_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("registry", &self.registry)
            .field("resolve_timeout_secs", &self.resolve_timeout_secs)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("cors", &self.cors)
            .finish()
    }
}

impl Config {
    /// Loads configuration from `CURATOR_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` for malformed values or for missing
    /// required settings when `debug` is false.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Some(port) = env_u16("CURATOR_HTTP_PORT")? {
            config.http_port = port;
        }
        if let Some(debug) = env_bool("CURATOR_DEBUG")? {
            config.debug = debug;
        }
        if let Some(url) = env_string("CURATOR_ROUTER_URL") {
            config.router_url = Some(url);
        }
        if let Some(token) = env_string("CURATOR_ROUTER_TOKEN") {
            config.router_token = Some(token);
        }
        if let Some(registry) = env_string("CURATOR_REGISTRY") {
            config.registry = Some(registry);
        }
        if let Some(secs) = env_u64("CURATOR_RESOLVE_TIMEOUT_SECS")? {
            config.resolve_timeout_secs = secs;
        }
        if let Some(secs) = env_u64("CURATOR_REQUEST_TIMEOUT_SECS")? {
            config.request_timeout_secs = secs;
        }
        if let Some(origins) = env_string("CURATOR_CORS_ALLOWED_ORIGINS") {
            config.cors.allowed_origins = origins
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
        }

        config.validate()?;
        Ok(config)
    }

    /// Validates cross-field constraints.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` when required settings are missing or
    /// out of range.
    pub fn validate(&self) -> Result<()> {
        if !self.debug && self.router_url.is_none() {
            return Err(Error::InvalidInput(
                "CURATOR_ROUTER_URL is required when CURATOR_DEBUG=false".to_string(),
            ));
        }
        if !self.debug && self.registry.is_none() {
            return Err(Error::InvalidInput(
                "CURATOR_REGISTRY is required when CURATOR_DEBUG=false".to_string(),
            ));
        }
        if self.resolve_timeout_secs == 0 {
            return Err(Error::InvalidInput(
                "CURATOR_RESOLVE_TIMEOUT_SECS must be positive".to_string(),
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err(Error::InvalidInput(
                "CURATOR_REQUEST_TIMEOUT_SECS must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Returns the router base URL, applying the debug-mode default.
    #[must_use]
    pub fn router_url(&self) -> String {
        self.router_url
            .clone()
            .unwrap_or_else(|| DEBUG_ROUTER_URL.to_string())
    }

    /// Returns the registry connection string, applying the debug-mode
    /// default.
    #[must_use]
    pub fn registry(&self) -> String {
        self.registry
            .clone()
            .unwrap_or_else(|| DEBUG_REGISTRY.to_string())
    }

    /// Returns the endpoint-resolution timeout.
    #[must_use]
    pub fn resolve_timeout(&self) -> Duration {
        Duration::from_secs(self.resolve_timeout_secs)
    }

    /// Returns the metadata request timeout.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn env_string(name: &str) -> Option<String> {
    std::env::var(name).ok().and_then(|v| {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

fn env_u16(name: &str) -> Result<Option<u16>> {
    let Some(v) = env_string(name) else {
        return Ok(None);
    };
    v.parse::<u16>()
        .map(Some)
        .map_err(|e| Error::InvalidInput(format!("{name} must be a u16: {e}")))
}

fn env_u64(name: &str) -> Result<Option<u64>> {
    let Some(v) = env_string(name) else {
        return Ok(None);
    };
    v.parse::<u64>()
        .map(Some)
        .map_err(|e| Error::InvalidInput(format!("{name} must be a u64: {e}")))
}

fn env_bool(name: &str) -> Result<Option<bool>> {
    let Some(v) = env_string(name) else {
        return Ok(None);
    };
    let value = v.trim().to_ascii_lowercase();
    match value.as_str() {
        "true" | "1" | "yes" | "y" => Ok(Some(true)),
        "false" | "0" | "no" | "n" => Ok(Some(false)),
        _ => Err(Error::InvalidInput(format!(
            "{name} must be a boolean (true/false/1/0)"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn production_config_requires_router_and_registry() {
        let config = Config::default();
        assert!(config.validate().is_err());

        let config = Config {
            router_url: Some("http://router:11015".to_string()),
            registry: Some("registry-1:2181/kafka".to_string()),
            ..Config::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn debug_config_falls_back_to_local_defaults() {
        let config = Config {
            debug: true,
            ..Config::default()
        };
        assert!(config.validate().is_ok());
        assert_eq!(config.router_url(), DEBUG_ROUTER_URL);
        assert_eq!(config.registry(), DEBUG_REGISTRY);
    }

    #[test]
    fn zero_timeouts_are_rejected() {
        let config = Config {
            debug: true,
            resolve_timeout_secs: 0,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }
}
