//! Link entity representing a short code to destination URL mapping.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A shortened URL with its click counter.
///
/// `short_code`, `original_url` and `created_at` never change after creation.
/// `clicks` and `last_clicked_at` are only ever moved forward by the store's
/// atomic increment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Link {
    pub id: i64,
    pub short_code: String,
    pub original_url: String,
    pub clicks: i64,
    pub last_clicked_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Link {
    /// Creates a new Link instance.
    pub fn new(
        id: i64,
        short_code: String,
        original_url: String,
        clicks: i64,
        last_clicked_at: Option<DateTime<Utc>>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            short_code,
            original_url,
            clicks,
            last_clicked_at,
            created_at,
        }
    }
}

/// Input data for creating a new link.
#[derive(Debug, Clone, PartialEq)]
pub struct NewLink {
    pub short_code: String,
    pub original_url: String,
}

/// Aggregate counters across every stored link.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkTotals {
    pub total_clicks: i64,
    pub total_links: i64,
}

impl LinkTotals {
    /// Mean clicks per link rounded to two decimals, `0.0` when there are no links.
    pub fn average_clicks(&self) -> f64 {
        if self.total_links == 0 {
            return 0.0;
        }

        let avg = self.total_clicks as f64 / self.total_links as f64;
        (avg * 100.0).round() / 100.0
    }
}
