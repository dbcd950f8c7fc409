//! `OpenAPI` (3.1) specification generation for `curator-api`.
//!
//! The generated spec is served at `/api-docs/openapi.json` and used to
//! generate external clients and to detect breaking API changes in CI.

use utoipa::OpenApi;

/// `OpenAPI` documentation for the Curator REST API (`/v1/*`).
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Curator API",
        version = env!("CARGO_PKG_VERSION"),
        description = "Tag governance REST API for the metadata catalog"
    ),
    paths(
        crate::routes::tags::promote_tags,
        crate::routes::tags::demote_tags,
        crate::routes::tags::validate_tags,
        crate::routes::tags::delete_preferred_tag,
        crate::routes::tags::list_tags,
        crate::routes::tags::entity_tags,
    ),
    components(
        schemas(
            crate::error::ApiErrorBody,
        )
    ),
    tags(
        (name = "tags", description = "Tag governance operations"),
    ),
)]
pub struct ApiDoc;

/// Returns the generated `OpenAPI` spec.
#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

/// Returns the generated `OpenAPI` spec serialized as pretty JSON.
///
/// # Errors
///
/// Returns an error if JSON serialization fails (should not happen).
pub fn openapi_json() -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&openapi())
}
