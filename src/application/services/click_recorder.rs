//! Appends click events to the analytics log.

use std::sync::Arc;
use std::time::Duration;

use tokio_retry::RetryIf;
use tokio_retry::strategy::ExponentialBackoff;

use crate::domain::click_event::ClickContext;
use crate::domain::entities::{Click, NewClick};
use crate::domain::repositories::ClickRepository;
use crate::error::AppError;
use crate::infrastructure::change_feed::{ChangeFeed, ChangeKind, Table};
use crate::utils::store_timeout::with_timeout;

pub const DEFAULT_RECORD_ATTEMPTS: usize = 3;

/// Writes one immutable [`Click`] per resolved redirect.
///
/// Transient store failures are retried with exponential backoff up to a
/// fixed number of attempts. Other failures are returned immediately. The
/// recorder never touches the click counter, so a failure here cannot undo
/// an increment that already happened.
pub struct ClickRecorder {
    repository: Arc<dyn ClickRepository>,
    feed: Arc<ChangeFeed>,
    max_attempts: usize,
    store_timeout: Duration,
}

impl ClickRecorder {
    pub fn new(repository: Arc<dyn ClickRepository>, feed: Arc<ChangeFeed>) -> Self {
        Self {
            repository,
            feed,
            max_attempts: DEFAULT_RECORD_ATTEMPTS,
            store_timeout: super::link_service::DEFAULT_STORE_TIMEOUT,
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn with_store_timeout(mut self, store_timeout: Duration) -> Self {
        self.store_timeout = store_timeout;
        self
    }

    /// Appends a click event for `link_id`.
    ///
    /// # Errors
    ///
    /// Returns the last error once retries are exhausted, or the first
    /// non-transient error.
    pub async fn record(&self, link_id: i64, context: ClickContext) -> Result<Click, AppError> {
        let new_click = NewClick {
            link_id,
            referrer: context.referrer,
            user_agent: context.user_agent,
        };

        let strategy = ExponentialBackoff::from_millis(2)
            .factor(10)
            .max_delay(Duration::from_millis(250))
            .take(self.max_attempts - 1);

        let click = RetryIf::spawn(
            strategy,
            || {
                let repository = self.repository.clone();
                let new_click = new_click.clone();
                let limit = self.store_timeout;
                async move { with_timeout(limit, "record_click", repository.record(new_click)).await }
            },
            |e: &AppError| {
                if e.is_transient() {
                    tracing::debug!(error = %e, link_id, "Retrying click event insert");
                }
                e.is_transient()
            },
        )
        .await?;

        self.feed
            .publish(Table::UrlAnalytics, ChangeKind::Insert, click.id);

        Ok(click)
    }
}
