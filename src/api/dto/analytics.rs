//! DTOs for analytics endpoints.

use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, serde_as};
use validator::Validate;

/// Query string for `GET /api/analytics`.
#[serde_as]
#[derive(Debug, Deserialize, Validate)]
pub struct AnalyticsQuery {
    /// Restricts the report to one short code.
    #[validate(length(min = 1, max = 20, message = "code must be 1-20 characters"))]
    pub code: Option<String>,

    /// Trailing window in days, server default when absent.
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    #[validate(range(min = 1, max = 366, message = "days must be between 1 and 366"))]
    pub days: Option<u32>,
}

/// Current change feed revision.
#[derive(Debug, Serialize, Deserialize)]
pub struct RevisionResponse {
    pub revision: u64,
}
