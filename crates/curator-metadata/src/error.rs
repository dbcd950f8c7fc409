//! Error types for the metadata access layer.

use thiserror::Error;

/// Result type alias for metadata access operations.
pub type Result<T> = std::result::Result<T, MetadataError>;

/// Errors that can occur while reaching the metadata service.
#[derive(Debug, Error)]
pub enum MetadataError {
    /// The metadata service rejected the request as malformed.
    #[error("bad request: {message}")]
    BadRequest {
        /// Response body or description of the rejection.
        message: String,
    },

    /// The requested entity or path does not exist in the metadata index.
    #[error("not found: {message}")]
    NotFound {
        /// Response body or description of what was missing.
        message: String,
    },

    /// The routed client's credential was rejected.
    #[error("unauthenticated: {message}")]
    Unauthenticated {
        /// Response body or description of the auth failure.
        message: String,
    },

    /// The registry has no live instance of the service within the timeout.
    #[error("service unavailable: {service}")]
    ServiceUnavailable {
        /// Logical name of the unreachable service.
        service: String,
    },

    /// A connection string or resolved address could not form a valid URL.
    #[error("invalid url: {message}")]
    InvalidUrl {
        /// Description of the malformed input.
        message: String,
    },

    /// An I/O failure or unexpected response status.
    #[error("transport error: {message}")]
    Transport {
        /// Description of the failure, including status and body when known.
        message: String,
    },
}

impl MetadataError {
    /// Creates a transport error with the given message.
    #[must_use]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Creates an invalid-url error with the given message.
    #[must_use]
    pub fn invalid_url(message: impl Into<String>) -> Self {
        Self::InvalidUrl {
            message: message.into(),
        }
    }

    /// Returns true for failures that trigger the one-shot fallback from
    /// routed to direct-discovery mode (I/O and auth failures).
    #[must_use]
    pub fn triggers_fallback(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::Unauthenticated { .. })
    }
}

impl From<reqwest::Error> for MetadataError {
    fn from(value: reqwest::Error) -> Self {
        Self::Transport {
            message: value.to_string(),
        }
    }
}
