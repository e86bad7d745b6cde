//! Handlers for link management endpoints (create, list, get, delete).

use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use validator::Validate;

use crate::api::dto::links::{CreateLinkRequest, LinkListResponse, LinkResponse};
use crate::api::extract::{ApiJson, ApiPath};
use crate::error::AppError;
use crate::state::AppState;

/// Creates a short link.
///
/// # Endpoint
///
/// `POST /api/links`
///
/// # Request Body
///
/// ```json
/// {
///   "url": "https://example.com/a/b",
///   "custom_code": "my-link"   // optional
/// }
/// ```
///
/// Without `custom_code` a random 6-character code is drawn.
///
/// # Errors
///
/// Returns 400 Bad Request if the body is not JSON or the URL or custom code
/// is malformed.
/// Returns 409 Conflict if the custom code is taken.
/// Returns 500 if no unique random code could be found.
pub async fn create_link_handler(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CreateLinkRequest>,
) -> Result<(StatusCode, Json<LinkResponse>), AppError> {
    payload.validate()?;

    let link = state
        .link_service
        .create_link(payload.url, payload.custom_code)
        .await?;

    Ok((StatusCode::CREATED, Json(link.into())))
}

/// Lists all links, newest first.
///
/// `GET /api/links`
pub async fn list_links_handler(
    State(state): State<AppState>,
) -> Result<Json<LinkListResponse>, AppError> {
    let items: Vec<LinkResponse> = state
        .link_service
        .list_links()
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    Ok(Json(LinkListResponse {
        total: items.len(),
        items,
    }))
}

/// Returns one link by short code without counting a click.
///
/// `GET /api/links/{code}`
pub async fn get_link_handler(
    ApiPath(code): ApiPath<String>,
    State(state): State<AppState>,
) -> Result<Json<LinkResponse>, AppError> {
    let link = state.link_service.get_by_code(&code).await?;
    Ok(Json(link.into()))
}

/// Deletes a link and its click history.
///
/// # Endpoint
///
/// `DELETE /api/links/{id}`
///
/// # Errors
///
/// Returns 400 Bad Request if the id is not an integer.
/// Returns 404 Not Found if no link has this id.
pub async fn delete_link_handler(
    ApiPath(id): ApiPath<i64>,
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    state.link_service.delete_link(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
