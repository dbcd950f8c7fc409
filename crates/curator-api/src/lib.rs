//! # curator-api
//!
//! HTTP composition layer for the Curator tag-governance service.
//!
//! This crate provides the API surface for Curator, handling:
//!
//! - **Routing**: the `/v1/tags` endpoint family
//! - **Request Context**: namespace scoping and credential passthrough
//! - **Service Wiring**: composition of the store, the metadata access
//!   layer, and the governance service
//! - **Observability**: request tracing and health checks
//!
//! ## Design Principles
//!
//! This crate is a thin composition layer with no domain policy. All
//! business logic lives in `curator-governance`; all metadata access lives
//! in `curator-metadata`.
//!
//! ## Endpoints
//!
//! ```text
//! GET    /health                    - Health check
//! GET    /ready                     - Readiness check
//! GET    /api-docs/openapi.json     - OpenAPI document
//! POST   /v1/tags/promote           - Promote tags into the vocabulary
//! POST   /v1/tags/demote            - Demote tags from the vocabulary
//! POST   /v1/tags/validate          - Validate tag syntax
//! DELETE /v1/tags/preferred?tag=T   - Delete an unused preferred tag
//! GET    /v1/tags                   - List tags by classification
//! GET    /v1/tags/{type}/{name}     - Tags attached to one entity
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rust_2018_idioms)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod context;
pub mod error;
pub mod openapi;
pub mod routes;
pub mod server;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::context::RequestContext;
    pub use crate::error::{ApiError, ApiResult};
    pub use crate::server::Server;
}
