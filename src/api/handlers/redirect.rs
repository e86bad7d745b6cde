//! Handlers for short code resolution.

use axum::{
    Json,
    extract::State,
    http::HeaderMap,
    response::Redirect,
};
use serde_json::json;

use crate::api::dto::redirect::{RedirectQuery, RedirectResponse};
use crate::api::extract::{ApiPath, ApiQuery};
use crate::domain::click_event::ClickContext;
use crate::error::AppError;
use crate::state::AppState;

/// Resolves a short code and returns the destination as JSON.
///
/// # Endpoint
///
/// `GET /redirect?code={code}`
///
/// # Request Flow
///
/// 1. Reject a missing or blank `code` with 400
/// 2. Look up the link
/// 3. Increment its click counter and append a click event
/// 4. Return `{ "url", "clicks" }`
///
/// Bookkeeping failures in step 3 are logged and never change the response.
///
/// # Errors
///
/// Returns 400 `{"error": "Short code is required"}` for a missing code.
/// Returns 400 if the query string does not parse, e.g. a repeated `code`.
/// Returns 404 `{"error": "URL not found"}` for an unknown code.
/// Returns 500 if the store cannot be reached.
pub async fn redirect_json_handler(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<RedirectQuery>,
    headers: HeaderMap,
) -> Result<Json<RedirectResponse>, AppError> {
    let code = query
        .code
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .ok_or_else(|| AppError::bad_request("Short code is required", json!({})))?;

    let resolved = state
        .redirect_service
        .resolve(code, ClickContext::from_headers(&headers))
        .await?;

    Ok(Json(resolved.into()))
}

/// Redirects a short code to its original URL.
///
/// # Endpoint
///
/// `GET /{code}`
///
/// Same resolution and click accounting as [`redirect_json_handler`],
/// answered with `307 Temporary Redirect`.
///
/// # Errors
///
/// Returns 404 Not Found if the short code doesn't exist.
pub async fn redirect_handler(
    ApiPath(code): ApiPath<String>,
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Redirect, AppError> {
    let resolved = state
        .redirect_service
        .resolve(&code, ClickContext::from_headers(&headers))
        .await?;

    Ok(Redirect::temporary(&resolved.url))
}
