//! API route configuration.

use crate::api::handlers::{
    analytics_handler, create_link_handler, delete_link_handler, get_link_handler,
    list_links_handler, revision_handler,
};
use crate::state::AppState;
use axum::{Router, routing::get};

/// Routes mounted under `/api`.
///
/// # Endpoints
///
/// - `POST   /links`               - Create a short link
/// - `GET    /links`               - List links, newest first
/// - `GET    /links/{code}`        - Fetch one link by short code
/// - `DELETE /links/{id}`          - Delete a link and its click events
/// - `GET    /analytics`           - Click analytics (global or `?code=`)
/// - `GET    /analytics/revision`  - Change feed revision for polling
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/links", get(list_links_handler).post(create_link_handler))
        // One segment name for both: GET takes a short code, DELETE a numeric id.
        .route(
            "/links/{link}",
            get(get_link_handler).delete(delete_link_handler),
        )
        .route("/analytics", get(analytics_handler))
        .route("/analytics/revision", get(revision_handler))
}
