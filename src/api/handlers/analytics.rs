//! Handlers for analytics endpoints.

use axum::{Json, extract::State};
use validator::Validate;

use crate::api::dto::analytics::{AnalyticsQuery, RevisionResponse};
use crate::api::extract::ApiQuery;
use crate::application::services::AnalyticsReport;
use crate::error::AppError;
use crate::state::AppState;

/// Returns click analytics over a trailing window.
///
/// # Endpoint
///
/// `GET /api/analytics?code={code}&days={days}`
///
/// Both parameters are optional. Without `code` the report covers every
/// link; `days` defaults to the configured window.
///
/// # Response
///
/// ```json
/// {
///   "window_days": 30,
///   "total_clicks": 12,
///   "total_links": 3,
///   "avg_clicks_per_link": 4.0,
///   "clicks_by_date": [{ "date": "2024-06-01", "clicks": 2 }],
///   "clicks_by_referrer": { "Direct": 5, "google.com": 7 },
///   "clicks_by_device": { "Desktop": 9, "Mobile": 3 }
/// }
/// ```
///
/// # Errors
///
/// Returns 400 Bad Request if `days` is not a number or is out of range.
/// Returns 404 Not Found if `code` does not exist.
pub async fn analytics_handler(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<AnalyticsQuery>,
) -> Result<Json<AnalyticsReport>, AppError> {
    query.validate()?;

    let report = state
        .analytics_service
        .report(query.code.as_deref(), query.days)
        .await?;

    Ok(Json(report))
}

/// Returns the change feed revision so dashboards can poll for updates.
///
/// `GET /api/analytics/revision`
pub async fn revision_handler(State(state): State<AppState>) -> Json<RevisionResponse> {
    Json(RevisionResponse {
        revision: state.feed.revision(),
    })
}
