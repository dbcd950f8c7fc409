//! HTTP route handlers.

pub mod tags;

use std::sync::Arc;

use axum::Router;

use crate::server::AppState;

/// `/v1` routes.
pub fn v1_routes() -> Router<Arc<AppState>> {
    tags::routes()
}
