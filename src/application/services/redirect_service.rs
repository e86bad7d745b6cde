//! Redirect resolution: lookup, click increment and event recording.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde_json::json;
use tracing::{debug, warn};

use crate::application::services::ClickRecorder;
use crate::domain::click_event::ClickContext;
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use crate::infrastructure::change_feed::{ChangeFeed, ChangeKind, Table};
use crate::utils::store_timeout::with_timeout;

/// Result of a successful resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolved {
    pub url: String,
    pub clicks: i64,
}

/// Request-facing orchestrator for the redirect path.
///
/// Only the lookup can fail a resolution. The counter increment and the
/// click event are independent best-effort side effects: their failures are
/// logged and counted, never returned. Both run on a spawned task, so a
/// client that disconnects mid-request does not cancel writes already
/// issued.
pub struct RedirectService {
    links: Arc<dyn LinkRepository>,
    recorder: Arc<ClickRecorder>,
    feed: Arc<ChangeFeed>,
    store_timeout: Duration,
}

impl RedirectService {
    pub fn new(
        links: Arc<dyn LinkRepository>,
        recorder: Arc<ClickRecorder>,
        feed: Arc<ChangeFeed>,
    ) -> Self {
        Self {
            links,
            recorder,
            feed,
            store_timeout: super::link_service::DEFAULT_STORE_TIMEOUT,
        }
    }

    pub fn with_store_timeout(mut self, store_timeout: Duration) -> Self {
        self.store_timeout = store_timeout;
        self
    }

    /// Resolves a short code to its destination and accounts for the click.
    ///
    /// # Flow
    ///
    /// 1. Blank code → [`AppError::NotFound`] without touching the store
    /// 2. `find_by_code`; miss → [`AppError::NotFound`]
    /// 3. Atomic `increment_clicks` (best effort)
    /// 4. Append click event (best effort)
    /// 5. Return the destination and the new click count
    ///
    /// When the increment fails, the returned count is the looked-up value
    /// plus one.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::StoreUnavailable`] if the lookup times out or the
    /// store is unreachable, so callers can retry instead of reporting 404.
    pub async fn resolve(&self, short_code: &str, context: ClickContext) -> Result<Resolved, AppError> {
        let short_code = short_code.trim();
        if short_code.is_empty() {
            metrics::counter!("redirects_not_found_total").increment(1);
            return Err(not_found(short_code));
        }

        debug!(short_code, "Looking up short code");

        let link = with_timeout(
            self.store_timeout,
            "find_by_code",
            self.links.find_by_code(short_code),
        )
        .await?
        .ok_or_else(|| {
            metrics::counter!("redirects_not_found_total").increment(1);
            not_found(short_code)
        })?;

        let links = self.links.clone();
        let recorder = self.recorder.clone();
        let feed = self.feed.clone();
        let limit = self.store_timeout;
        let link_id = link.id;

        let accounting = tokio::spawn(async move {
            let clicks = match with_timeout(limit, "increment_clicks", links.increment_clicks(link_id)).await {
                Ok(updated) => {
                    feed.publish(Table::Urls, ChangeKind::Update, link_id);
                    Some(updated.clicks)
                }
                Err(e) => {
                    metrics::counter!("click_increment_failures_total").increment(1);
                    warn!(error = %e, details = %e.details(), link_id, "Failed to increment click count");
                    None
                }
            };

            if let Err(e) = recorder.record(link_id, context).await {
                metrics::counter!("click_record_failures_total").increment(1);
                warn!(error = %e, details = %e.details(), link_id, "Failed to record click event");
            }

            clicks
        });

        let clicks = match accounting.await {
            Ok(Some(clicks)) => clicks,
            Ok(None) => link.clicks + 1,
            Err(e) => {
                warn!(error = %e, link_id, "Click accounting task aborted");
                link.clicks + 1
            }
        };

        metrics::counter!("redirects_resolved_total").increment(1);
        debug!(short_code, clicks, url = %link.original_url, "Redirect resolved");

        Ok(Resolved {
            url: link.original_url,
            clicks,
        })
    }
}

fn not_found(short_code: &str) -> AppError {
    AppError::not_found("URL not found", json!({ "code": short_code }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{Click, Link, LinkTotals, NewLink};
    use crate::domain::repositories::{ClickRepository, MockClickRepository, MockLinkRepository};
    use crate::infrastructure::persistence::MemoryStore;
    use chrono::Utc;

    fn link(clicks: i64) -> Link {
        Link::new(
            7,
            "abc123".to_string(),
            "https://example.com/a/b".to_string(),
            clicks,
            None,
            Utc::now(),
        )
    }

    fn resolver(links: MockLinkRepository, clicks: MockClickRepository) -> RedirectService {
        let feed = Arc::new(ChangeFeed::new());
        let recorder = Arc::new(ClickRecorder::new(Arc::new(clicks), feed.clone()).with_max_attempts(1));
        RedirectService::new(Arc::new(links), recorder, feed)
    }

    fn recording_ok() -> MockClickRepository {
        let mut clicks = MockClickRepository::new();
        clicks
            .expect_record()
            .times(1)
            .returning(|c| Ok(Click::new(1, c.link_id, Utc::now(), c.referrer, c.user_agent)));
        clicks
    }

    #[tokio::test]
    async fn test_resolve_success() {
        let mut links = MockLinkRepository::new();
        links
            .expect_find_by_code()
            .withf(|code| code == "abc123")
            .times(1)
            .returning(|_| Ok(Some(link(0))));
        links
            .expect_increment_clicks()
            .withf(|id| *id == 7)
            .times(1)
            .returning(|_| Ok(link(1)));

        let resolved = resolver(links, recording_ok())
            .resolve("abc123", ClickContext::default())
            .await
            .unwrap();

        assert_eq!(
            resolved,
            Resolved {
                url: "https://example.com/a/b".to_string(),
                clicks: 1,
            }
        );
    }

    #[tokio::test]
    async fn test_blank_code_is_not_found_without_lookup() {
        let mut links = MockLinkRepository::new();
        links.expect_find_by_code().times(0);
        let mut clicks = MockClickRepository::new();
        clicks.expect_record().times(0);

        let result = resolver(links, clicks).resolve("  ", ClickContext::default()).await;

        assert!(matches!(result.unwrap_err(), AppError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_unknown_code_is_not_found_and_records_nothing() {
        let mut links = MockLinkRepository::new();
        links.expect_find_by_code().times(1).returning(|_| Ok(None));
        links.expect_increment_clicks().times(0);
        let mut clicks = MockClickRepository::new();
        clicks.expect_record().times(0);

        let err = resolver(links, clicks)
            .resolve("nope", ClickContext::default())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NotFound { .. }));
        assert_eq!(err.to_string(), "URL not found");
    }

    #[tokio::test]
    async fn test_increment_failure_does_not_fail_redirect() {
        let mut links = MockLinkRepository::new();
        links.expect_find_by_code().returning(|_| Ok(Some(link(4))));
        links
            .expect_increment_clicks()
            .times(1)
            .returning(|_| Err(AppError::store_unavailable("Store unavailable", json!({}))));

        let resolved = resolver(links, recording_ok())
            .resolve("abc123", ClickContext::default())
            .await
            .unwrap();

        assert_eq!(resolved.url, "https://example.com/a/b");
        assert_eq!(resolved.clicks, 5);
    }

    #[tokio::test]
    async fn test_record_failure_does_not_fail_redirect() {
        let mut links = MockLinkRepository::new();
        links.expect_find_by_code().returning(|_| Ok(Some(link(1))));
        links.expect_increment_clicks().times(1).returning(|_| Ok(link(2)));

        let mut clicks = MockClickRepository::new();
        clicks
            .expect_record()
            .times(1)
            .returning(|_| Err(AppError::internal("Database error", json!({}))));

        let resolved = resolver(links, clicks)
            .resolve("abc123", ClickContext::default())
            .await
            .unwrap();

        assert_eq!(resolved.clicks, 2);
    }

    #[tokio::test]
    async fn test_lookup_failure_is_distinguishable_from_not_found() {
        let mut links = MockLinkRepository::new();
        links
            .expect_find_by_code()
            .returning(|_| Err(AppError::store_unavailable("Store unavailable", json!({}))));
        links.expect_increment_clicks().times(0);

        let err = resolver(links, MockClickRepository::new())
            .resolve("abc123", ClickContext::default())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::StoreUnavailable { .. }));
    }

    /// Delegates to [`MemoryStore`] but stalls every increment.
    struct SlowIncrementStore {
        inner: Arc<MemoryStore>,
        delay: Duration,
    }

    #[async_trait::async_trait]
    impl LinkRepository for SlowIncrementStore {
        async fn create(&self, new_link: NewLink) -> Result<Link, AppError> {
            self.inner.create(new_link).await
        }

        async fn find_by_code(&self, short_code: &str) -> Result<Option<Link>, AppError> {
            self.inner.find_by_code(short_code).await
        }

        async fn find_by_id(&self, id: i64) -> Result<Option<Link>, AppError> {
            self.inner.find_by_id(id).await
        }

        async fn increment_clicks(&self, id: i64) -> Result<Link, AppError> {
            tokio::time::sleep(self.delay).await;
            self.inner.increment_clicks(id).await
        }

        async fn list(&self) -> Result<Vec<Link>, AppError> {
            self.inner.list().await
        }

        async fn delete(&self, id: i64) -> Result<(), AppError> {
            self.inner.delete(id).await
        }

        async fn totals(&self) -> Result<LinkTotals, AppError> {
            self.inner.totals().await
        }

        async fn ping(&self) -> Result<(), AppError> {
            self.inner.ping().await
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_request_still_accounts_click() {
        let store = Arc::new(MemoryStore::new());
        let link = store
            .create(NewLink {
                short_code: "slow".to_string(),
                original_url: "https://example.com".to_string(),
            })
            .await
            .unwrap();

        let feed = Arc::new(ChangeFeed::new());
        let recorder = Arc::new(ClickRecorder::new(store.clone(), feed.clone()));
        let links = Arc::new(SlowIncrementStore {
            inner: store.clone(),
            delay: Duration::from_millis(500),
        });
        let service = RedirectService::new(links, recorder, feed);

        // The caller gives up while the increment is still in flight.
        let outcome = tokio::time::timeout(
            Duration::from_millis(100),
            service.resolve("slow", ClickContext::new(Some("https://t.co/x"), None)),
        )
        .await;
        assert!(outcome.is_err());

        tokio::time::sleep(Duration::from_secs(1)).await;

        let stored = store.find_by_id(link.id).await.unwrap().unwrap();
        assert_eq!(stored.clicks, 1);
        assert_eq!(store.count_for_link(link.id).await.unwrap(), 1);
    }
}
