//! Repository trait for short link data access.

use crate::domain::entities::{Link, LinkTotals, NewLink};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for managing short links.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgLinkRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::persistence::MemoryStore`] - in-process implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Inserts a new short link with `clicks = 0`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the short code already exists. The
    /// check must be enforced by the store itself (a uniqueness constraint or
    /// an equivalent critical section), never by a prior read.
    ///
    /// Returns [`AppError::StoreUnavailable`] or [`AppError::Internal`] on store errors.
    async fn create(&self, new_link: NewLink) -> Result<Link, AppError>;

    /// Finds a link by its short code.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Link))` if found
    /// - `Ok(None)` if not found
    async fn find_by_code(&self, short_code: &str) -> Result<Option<Link>, AppError>;

    /// Finds a link by id.
    async fn find_by_id(&self, id: i64) -> Result<Option<Link>, AppError>;

    /// Atomically sets `clicks = clicks + 1` and moves `last_clicked_at`
    /// forward to now, returning the updated row.
    ///
    /// Concurrent calls on the same id must never lose an increment.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no link has this id.
    async fn increment_clicks(&self, id: i64) -> Result<Link, AppError>;

    /// Lists every link, newest first.
    async fn list(&self) -> Result<Vec<Link>, AppError>;

    /// Removes a link and, through the store's cascade, its click events.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no link has this id.
    async fn delete(&self, id: i64) -> Result<(), AppError>;

    /// Sums `clicks` and counts links across the whole table.
    async fn totals(&self) -> Result<LinkTotals, AppError>;

    /// Cheap round trip used by the health check.
    async fn ping(&self) -> Result<(), AppError>;
}
