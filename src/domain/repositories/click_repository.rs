//! Repository trait for the click event log.

use crate::domain::entities::{Click, NewClick, SlotCount, SourceCount};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Append-only access to `url_analytics`.
///
/// Events are never updated. Deletion only happens through the owning
/// link's cascade or an external retention policy.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClickRepository: Send + Sync {
    /// Appends one click event stamped with the store's current time.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the referenced link does not exist.
    /// Returns [`AppError::StoreUnavailable`] on transient store errors.
    async fn record(&self, new_click: NewClick) -> Result<Click, AppError>;

    /// Counts events with `occurred_at >= since` per
    /// [`CLICK_SLOT_SECONDS`](crate::domain::entities::CLICK_SLOT_SECONDS)
    /// slot, oldest slot first, optionally restricted to one link.
    ///
    /// The result size is bounded by the window length, not the event count.
    async fn counts_by_slot(
        &self,
        link_id: Option<i64>,
        since: DateTime<Utc>,
    ) -> Result<Vec<SlotCount>, AppError>;

    /// Counts events with `occurred_at >= since` per distinct raw
    /// referrer and user-agent pair, in no particular order.
    async fn counts_by_source(
        &self,
        link_id: Option<i64>,
        since: DateTime<Utc>,
    ) -> Result<Vec<SourceCount>, AppError>;

    /// Counts all events recorded for a link.
    async fn count_for_link(&self, link_id: i64) -> Result<i64, AppError>;
}
