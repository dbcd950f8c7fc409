//! Request context extraction.
//!
//! Every request is scoped to a namespace, supplied via the `X-Namespace`
//! header and defaulting to `default`. The routed metadata client's
//! credential is ambient configuration, not per-request state; credential
//! validation belongs to the gateway, not this service.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{HeaderMap, HeaderValue};
use ulid::Ulid;

use crate::error::ApiError;

/// Header name for request IDs.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Header carrying the namespace scope.
pub const NAMESPACE_HEADER: &str = "X-Namespace";

/// Namespace used when the caller does not specify one.
pub const DEFAULT_NAMESPACE: &str = "default";

/// Per-request context derived from headers.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Namespace the request operates in.
    pub namespace: String,
    /// Request ID for tracing/correlation.
    pub request_id: String,
}

impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(existing) = parts.extensions.get::<Self>() {
            return Ok(existing.clone());
        }

        let headers = &parts.headers;
        let request_id =
            header_string(headers, REQUEST_ID_HEADER).unwrap_or_else(|| Ulid::new().to_string());
        let namespace = header_string(headers, NAMESPACE_HEADER)
            .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string());

        let ctx = Self {
            namespace,
            request_id,
        };
        parts.extensions.insert(ctx.clone());
        Ok(ctx)
    }
}

fn header_string(headers: &HeaderMap, name: &str) -> Option<String> {
    let value = headers.get(name)?;
    header_value_to_string(value)
}

fn header_value_to_string(value: &HeaderValue) -> Option<String> {
    value.to_str().ok().map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(request: Request<()>) -> RequestContext {
        let (mut parts, ()) = request.into_parts();
        RequestContext::from_request_parts(&mut parts, &())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn defaults_apply_without_headers() {
        let ctx = extract(Request::builder().body(()).unwrap()).await;
        assert_eq!(ctx.namespace, DEFAULT_NAMESPACE);
        assert!(!ctx.request_id.is_empty());
    }

    #[tokio::test]
    async fn headers_are_passed_through() {
        let request = Request::builder()
            .header(NAMESPACE_HEADER, "analytics")
            .header(REQUEST_ID_HEADER, "req-9")
            .body(())
            .unwrap();
        let ctx = extract(request).await;
        assert_eq!(ctx.namespace, "analytics");
        assert_eq!(ctx.request_id, "req-9");
    }
}
