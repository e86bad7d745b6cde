//! DTOs for link management endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::entities::Link;

/// Request to create a short link.
///
/// Format rules for `url` and `custom_code` are enforced by the link service
/// so that the admin CLI gets the same messages; only size limits live here.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateLinkRequest {
    #[validate(length(min = 1, max = 2048, message = "URL must be 1-2048 characters"))]
    pub url: String,

    /// Optional custom short code. Blank values are treated as absent.
    #[validate(length(max = 64, message = "Custom code is too long"))]
    pub custom_code: Option<String>,
}

/// JSON representation of a stored link.
#[derive(Debug, Serialize, Deserialize)]
pub struct LinkResponse {
    pub id: i64,
    pub short_code: String,
    pub original_url: String,
    pub clicks: i64,
    pub last_clicked_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<Link> for LinkResponse {
    fn from(link: Link) -> Self {
        Self {
            id: link.id,
            short_code: link.short_code,
            original_url: link.original_url,
            clicks: link.clicks,
            last_clicked_at: link.last_clicked_at,
            created_at: link.created_at,
        }
    }
}

/// Response for `GET /api/links`.
#[derive(Debug, Serialize, Deserialize)]
pub struct LinkListResponse {
    pub total: usize,
    pub items: Vec<LinkResponse>,
}
