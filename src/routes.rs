//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET  /redirect?code=` - Resolve a short code as JSON (public)
//! - `GET  /{code}`         - Short link redirect (public)
//! - `GET  /health`         - Health check: store, change feed (public)
//! - `/api/*`               - Link management and analytics
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **CORS** - Permissive, answers preflight requests
//! - **Path normalization** - Trailing slash handling

use crate::api;
use crate::api::handlers::{health_handler, redirect_handler, redirect_json_handler};
use crate::api::middleware::{cors, tracing};
use crate::state::AppState;
use axum::Router;
use axum::routing::get;
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

/// Routes and layers without path normalization.
///
/// Static paths (`/redirect`, `/health`) take priority over the `/{code}`
/// capture, so neither can be shadowed by a short code. Link creation also
/// rejects them as custom codes.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/redirect", get(redirect_json_handler))
        .route("/health", get(health_handler))
        .route("/{code}", get(redirect_handler))
        .nest("/api", api::routes::api_routes())
        .with_state(state)
        .layer(cors::layer())
        .layer(tracing::layer())
}

/// Constructs the application router with all routes and middleware.
///
/// Trailing slashes are trimmed before routing, so `/api/links/` and
/// `/api/links` hit the same handler.
pub fn app_router(state: AppState) -> NormalizePath<Router> {
    NormalizePathLayer::trim_trailing_slash().layer(router(state))
}
