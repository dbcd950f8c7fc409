//! API error types and HTTP response mapping.

use axum::Json;
use axum::http::HeaderValue;
use axum::http::StatusCode;
use axum::http::header::HeaderName;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

use curator_governance::GovernanceError;
use curator_metadata::MetadataError;

/// API result type.
pub type ApiResult<T> = Result<T, ApiError>;

/// Standard JSON error response body.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorBody {
    /// Stable machine-readable error code.
    pub code: String,
    /// Human-readable message (safe for clients).
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    /// Optional request ID for correlation.
    pub request_id: Option<String>,
}

/// HTTP API error with stable machine-readable code.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
    request_id: Option<String>,
}

impl ApiError {
    /// Returns an error response for invalid input.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "BAD_REQUEST", message)
    }

    /// Returns an error response for authentication failures.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", message)
    }

    /// Returns an error response for missing resources.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "NOT_FOUND", message)
    }

    /// Returns an error response for an unreachable upstream service.
    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_GATEWAY, "BAD_GATEWAY", message)
    }

    /// Returns an error response when a required service has no live
    /// instance.
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::SERVICE_UNAVAILABLE,
            "SERVICE_UNAVAILABLE",
            message,
        )
    }

    /// Returns an internal error response.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL", message)
    }

    /// Attaches a request ID for correlation.
    #[must_use]
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns the human-readable error message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the stable machine-readable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.code
    }

    fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
            request_id: None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let request_id = self.request_id;
        let mut response = (
            self.status,
            Json(ApiErrorBody {
                code: self.code.to_string(),
                message: self.message,
                request_id: request_id.clone(),
            }),
        )
            .into_response();

        if let Some(request_id) = request_id {
            if let Ok(value) = HeaderValue::from_str(&request_id) {
                response
                    .headers_mut()
                    .insert(HeaderName::from_static("x-request-id"), value);
            }
        }

        response
    }
}

impl From<MetadataError> for ApiError {
    fn from(value: MetadataError) -> Self {
        match value {
            MetadataError::BadRequest { message } => Self::bad_request(message),
            MetadataError::NotFound { message } => Self::not_found(message),
            MetadataError::Unauthenticated { message } => Self::unauthorized(message),
            MetadataError::ServiceUnavailable { service } => {
                Self::service_unavailable(format!("no live instance of {service}"))
            }
            MetadataError::InvalidUrl { message } => Self::internal(message),
            MetadataError::Transport { message } => Self::bad_gateway(message),
        }
    }
}

impl From<GovernanceError> for ApiError {
    fn from(value: GovernanceError) -> Self {
        match value {
            GovernanceError::InvalidTag { message }
            | GovernanceError::InvalidParameter { message } => Self::bad_request(message),
            GovernanceError::NotFound { tag } => {
                Self::not_found(format!("preferred tag not found: {tag}"))
            }
            GovernanceError::TagInUse { tag, entities } => Self::bad_request(format!(
                "not able to delete preferred tag {tag} with {entities} attached entities"
            )),
            GovernanceError::Store(err) => Self::internal(err.to_string()),
            GovernanceError::Metadata(err) => Self::from(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_in_use_maps_to_bad_request() {
        let err = ApiError::from(GovernanceError::TagInUse {
            tag: "pii".to_string(),
            entities: 2,
        });
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert!(err.message().contains("pii"));
    }

    #[test]
    fn missing_preferred_tag_maps_to_not_found() {
        let err = ApiError::from(GovernanceError::NotFound {
            tag: "ghost".to_string(),
        });
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn unavailable_service_maps_to_503() {
        let err = ApiError::from(MetadataError::ServiceUnavailable {
            service: "metadata.service".to_string(),
        });
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn transport_failure_maps_to_bad_gateway() {
        let err = ApiError::from(MetadataError::Transport {
            message: "connection refused".to_string(),
        });
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn response_carries_request_id_header() {
        let response = ApiError::bad_request("nope")
            .with_request_id("req-1")
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers().get("x-request-id").unwrap().to_str().unwrap(),
            "req-1"
        );
    }
}
