//! Cross-origin access for browser dashboards.

use tower_http::cors::CorsLayer;

/// Allows any origin, method and header.
///
/// Preflight `OPTIONS` requests are answered by the layer itself and never
/// reach a handler.
pub fn layer() -> CorsLayer {
    CorsLayer::permissive()
}
