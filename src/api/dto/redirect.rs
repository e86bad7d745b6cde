//! DTOs for the JSON redirect endpoint.

use serde::{Deserialize, Serialize};

use crate::application::services::Resolved;

/// Query string for `GET /redirect`.
#[derive(Debug, Deserialize)]
pub struct RedirectQuery {
    pub code: Option<String>,
}

/// Destination and updated click count.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct RedirectResponse {
    pub url: String,
    pub clicks: i64,
}

impl From<Resolved> for RedirectResponse {
    fn from(resolved: Resolved) -> Self {
        Self {
            url: resolved.url,
            clicks: resolved.clicks,
        }
    }
}
