//! Tag governance API routes.
//!
//! ## Routes
//!
//! - `POST   /tags/promote` - Promote tags into the curated vocabulary
//! - `POST   /tags/demote` - Demote tags back to user tags
//! - `POST   /tags/validate` - Validate tag syntax
//! - `DELETE /tags/preferred?tag=T` - Delete a preferred tag with no entities
//! - `GET    /tags?type={all|user|preferred}&prefix=P` - List tags
//! - `GET    /tags/{type}/{name}` - Tags attached to one entity

use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use utoipa::IntoParams;

use curator_core::TagClassification;

use crate::context::RequestContext;
use crate::error::ApiError;
use crate::server::AppState;

const NO_TAGS_RECEIVED: &str = "no tags received";
const INVALID_TYPE_PARAMETER: &str = "invalid parameter for 'type' query";

/// Query parameters for the delete endpoint.
#[derive(Debug, Deserialize, IntoParams)]
pub struct DeleteTagParams {
    /// The preferred tag to delete.
    pub tag: Option<String>,
}

/// Query parameters for tag listings.
#[derive(Debug, Deserialize, IntoParams)]
pub struct ListTagsParams {
    /// Classification filter: `all`, `user`, or `preferred`.
    #[serde(rename = "type")]
    pub classification: Option<String>,
    /// Restrict results to tags starting with this prefix.
    pub prefix: Option<String>,
}

/// Creates tag routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/tags", get(list_tags))
        .route("/tags/promote", post(promote_tags))
        .route("/tags/demote", post(demote_tags))
        .route("/tags/validate", post(validate_tags))
        .route("/tags/preferred", axum::routing::delete(delete_preferred_tag))
        .route("/tags/{type}/{name}", get(entity_tags))
}

fn require_tags(body: Option<Json<Vec<String>>>) -> Result<BTreeSet<String>, ApiError> {
    let Some(Json(tags)) = body else {
        return Err(ApiError::bad_request(NO_TAGS_RECEIVED));
    };
    if tags.is_empty() {
        return Err(ApiError::bad_request(NO_TAGS_RECEIVED));
    }
    Ok(tags.into_iter().collect())
}

/// Promote tags into the curated vocabulary.
///
/// POST /v1/tags/promote
#[utoipa::path(
    post,
    path = "/v1/tags/promote",
    tag = "tags",
    request_body = Vec<String>,
    responses(
        (status = 200, description = "Resulting preferred set", body = BTreeSet<String>),
        (status = 400, description = "Missing body or invalid tag", body = crate::error::ApiErrorBody),
        (status = 500, description = "Internal error", body = crate::error::ApiErrorBody),
    )
)]
pub(crate) async fn promote_tags(
    ctx: RequestContext,
    State(state): State<Arc<AppState>>,
    body: Option<Json<Vec<String>>>,
) -> Result<impl IntoResponse, ApiError> {
    let tags = require_tags(body).map_err(|e| e.with_request_id(ctx.request_id.clone()))?;

    tracing::info!(
        namespace = %ctx.namespace,
        count = tags.len(),
        "Promoting tags"
    );

    let preferred = state
        .governance
        .promote(&tags)
        .await
        .map_err(|e| ApiError::from(e).with_request_id(ctx.request_id.clone()))?;
    Ok(Json(preferred))
}

/// Demote tags back to user tags.
///
/// POST /v1/tags/demote
#[utoipa::path(
    post,
    path = "/v1/tags/demote",
    tag = "tags",
    request_body = Vec<String>,
    responses(
        (status = 200, description = "Remaining preferred set", body = BTreeSet<String>),
        (status = 400, description = "Missing body", body = crate::error::ApiErrorBody),
        (status = 500, description = "Internal error", body = crate::error::ApiErrorBody),
    )
)]
pub(crate) async fn demote_tags(
    ctx: RequestContext,
    State(state): State<Arc<AppState>>,
    body: Option<Json<Vec<String>>>,
) -> Result<impl IntoResponse, ApiError> {
    let tags = require_tags(body).map_err(|e| e.with_request_id(ctx.request_id.clone()))?;

    tracing::info!(
        namespace = %ctx.namespace,
        count = tags.len(),
        "Demoting tags"
    );

    let preferred = state
        .governance
        .demote(&tags)
        .await
        .map_err(|e| ApiError::from(e).with_request_id(ctx.request_id.clone()))?;
    Ok(Json(preferred))
}

/// Validate tag syntax without touching the index.
///
/// POST /v1/tags/validate
#[utoipa::path(
    post,
    path = "/v1/tags/validate",
    tag = "tags",
    request_body = Vec<String>,
    responses(
        (status = 200, description = "Per-tag validity", body = BTreeMap<String, bool>),
        (status = 400, description = "Missing body", body = crate::error::ApiErrorBody),
    )
)]
pub(crate) async fn validate_tags(
    ctx: RequestContext,
    State(state): State<Arc<AppState>>,
    body: Option<Json<Vec<String>>>,
) -> Result<impl IntoResponse, ApiError> {
    let tags = require_tags(body).map_err(|e| e.with_request_id(ctx.request_id.clone()))?;

    let report = state
        .governance
        .validate(&tags)
        .map_err(|e| ApiError::from(e).with_request_id(ctx.request_id.clone()))?;
    Ok(Json(report))
}

/// Delete a preferred tag, provided no entity still carries it.
///
/// DELETE /v1/tags/preferred?tag=T
#[utoipa::path(
    delete,
    path = "/v1/tags/preferred",
    tag = "tags",
    params(DeleteTagParams),
    responses(
        (status = 200, description = "Tag deleted"),
        (status = 400, description = "Missing tag or tag still in use", body = crate::error::ApiErrorBody),
        (status = 404, description = "Tag not preferred", body = crate::error::ApiErrorBody),
        (status = 502, description = "Metadata service unreachable", body = crate::error::ApiErrorBody),
    )
)]
pub(crate) async fn delete_preferred_tag(
    ctx: RequestContext,
    State(state): State<Arc<AppState>>,
    Query(params): Query<DeleteTagParams>,
) -> Result<impl IntoResponse, ApiError> {
    let tag = params
        .tag
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| {
            ApiError::bad_request(NO_TAGS_RECEIVED).with_request_id(ctx.request_id.clone())
        })?;

    tracing::info!(
        namespace = %ctx.namespace,
        tag = tag,
        "Deleting preferred tag"
    );

    state
        .governance
        .delete_if_unused(tag, &ctx.namespace)
        .await
        .map_err(|e| ApiError::from(e).with_request_id(ctx.request_id.clone()))?;
    Ok(StatusCode::OK)
}

/// List tags by classification.
///
/// GET /v1/tags?type={all|user|preferred}&prefix=P
#[utoipa::path(
    get,
    path = "/v1/tags",
    tag = "tags",
    params(ListTagsParams),
    responses(
        (status = 200, description = "Matching tags", body = BTreeSet<String>),
        (status = 400, description = "Invalid classification", body = crate::error::ApiErrorBody),
        (status = 502, description = "Metadata service unreachable", body = crate::error::ApiErrorBody),
    )
)]
pub(crate) async fn list_tags(
    ctx: RequestContext,
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListTagsParams>,
) -> Result<impl IntoResponse, ApiError> {
    let classification = params.classification.as_deref().unwrap_or("all");
    let classification = TagClassification::from_str(classification).map_err(|_| {
        ApiError::bad_request(INVALID_TYPE_PARAMETER).with_request_id(ctx.request_id.clone())
    })?;
    let prefix = params.prefix.unwrap_or_default();

    tracing::debug!(
        namespace = %ctx.namespace,
        classification = %classification,
        prefix = %prefix,
        "Listing tags"
    );

    let tags = state
        .governance
        .list_tags(classification, &prefix, &ctx.namespace)
        .await
        .map_err(|e| ApiError::from(e).with_request_id(ctx.request_id.clone()))?;
    Ok(Json(tags))
}

/// Tags attached to a single entity.
///
/// GET /v1/tags/{type}/{name}
#[utoipa::path(
    get,
    path = "/v1/tags/{type}/{name}",
    tag = "tags",
    params(
        ("type" = String, Path, description = "Entity type: dataset or stream"),
        ("name" = String, Path, description = "Entity name"),
    ),
    responses(
        (status = 200, description = "Attached tags", body = BTreeSet<String>),
        (status = 400, description = "Invalid entity type", body = crate::error::ApiErrorBody),
        (status = 404, description = "Entity not found", body = crate::error::ApiErrorBody),
        (status = 502, description = "Metadata service unreachable", body = crate::error::ApiErrorBody),
    )
)]
pub(crate) async fn entity_tags(
    ctx: RequestContext,
    State(state): State<Arc<AppState>>,
    Path((entity_type, entity_name)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    tracing::debug!(
        namespace = %ctx.namespace,
        entity_type = %entity_type,
        entity_name = %entity_name,
        "Fetching entity tags"
    );

    let tags = state
        .governance
        .entity_tags(&entity_type, &entity_name, &ctx.namespace)
        .await
        .map_err(|e| ApiError::from(e).with_request_id(ctx.request_id.clone()))?;
    Ok(Json(tags))
}
