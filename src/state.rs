//! Shared application state injected into every handler.

use std::sync::Arc;

use crate::application::services::{AnalyticsService, ClickRecorder, LinkService, RedirectService};
use crate::config::Config;
use crate::domain::repositories::{ClickRepository, LinkRepository};
use crate::infrastructure::change_feed::ChangeFeed;
use crate::infrastructure::persistence::MemoryStore;

#[derive(Clone)]
pub struct AppState {
    pub link_service: Arc<LinkService>,
    pub redirect_service: Arc<RedirectService>,
    pub analytics_service: Arc<AnalyticsService>,
    pub feed: Arc<ChangeFeed>,
}

impl AppState {
    /// Wires every service over the given repositories.
    ///
    /// Deadlines and attempt counts come from `config`; all services share one
    /// change feed.
    pub fn new(
        links: Arc<dyn LinkRepository>,
        clicks: Arc<dyn ClickRepository>,
        config: &Config,
    ) -> Self {
        let feed = Arc::new(ChangeFeed::new());
        let store_timeout = config.store_timeout();

        let link_service = LinkService::new(links.clone(), feed.clone())
            .with_max_attempts(config.code_generation_attempts)
            .with_store_timeout(store_timeout);

        let recorder = ClickRecorder::new(clicks.clone(), feed.clone())
            .with_max_attempts(config.click_record_attempts)
            .with_store_timeout(store_timeout);

        let redirect_service = RedirectService::new(links.clone(), Arc::new(recorder), feed.clone())
            .with_store_timeout(store_timeout);

        let analytics_service = AnalyticsService::new(links, clicks)
            .with_default_window(config.analytics_window_days)
            .with_store_timeout(store_timeout);

        Self {
            link_service: Arc::new(link_service),
            redirect_service: Arc::new(redirect_service),
            analytics_service: Arc::new(analytics_service),
            feed,
        }
    }

    /// State over a fresh [`MemoryStore`] with default settings.
    pub fn in_memory() -> Self {
        let store = Arc::new(MemoryStore::new());
        Self::new(store.clone(), store, &Config::default())
    }
}
