//! In-process store implementing both repository traits.
//!
//! Used for local development (`STORAGE_BACKEND=memory`) and HTTP tests. All
//! state sits behind one mutex, so the uniqueness check and insert, and the
//! click increment, each happen inside a single critical section, mirroring
//! the guarantees the PostgreSQL schema provides.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

use crate::domain::entities::{
    Click, Link, LinkTotals, NewClick, NewLink, SlotCount, SourceCount, slot_start,
};
use crate::domain::repositories::{ClickRepository, LinkRepository};
use crate::error::AppError;

#[derive(Debug, Default)]
struct Tables {
    urls: HashMap<i64, Link>,
    code_index: HashMap<String, i64>,
    analytics: Vec<Click>,
    next_url_id: i64,
    next_click_id: i64,
}

impl Tables {
    fn window(&self, link_id: Option<i64>, since: DateTime<Utc>) -> impl Iterator<Item = &Click> {
        self.analytics
            .iter()
            .filter(move |c| link_id.is_none_or(|id| c.link_id == id))
            .filter(move |c| c.occurred_at >= since)
    }
}

/// Mutex-guarded tables for `urls` and `url_analytics`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> Result<MutexGuard<'_, Tables>, AppError> {
        self.tables
            .lock()
            .map_err(|_| AppError::internal("Memory store lock poisoned", json!({})))
    }
}

#[async_trait]
impl LinkRepository for MemoryStore {
    async fn create(&self, new_link: NewLink) -> Result<Link, AppError> {
        let mut t = self.tables()?;

        if t.code_index.contains_key(&new_link.short_code) {
            return Err(AppError::conflict(
                "Short code already exists",
                json!({ "short_code": new_link.short_code }),
            ));
        }

        t.next_url_id += 1;
        let link = Link::new(
            t.next_url_id,
            new_link.short_code,
            new_link.original_url,
            0,
            None,
            Utc::now(),
        );

        t.code_index.insert(link.short_code.clone(), link.id);
        t.urls.insert(link.id, link.clone());

        Ok(link)
    }

    async fn find_by_code(&self, short_code: &str) -> Result<Option<Link>, AppError> {
        let t = self.tables()?;
        Ok(t.code_index
            .get(short_code)
            .and_then(|id| t.urls.get(id))
            .cloned())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Link>, AppError> {
        Ok(self.tables()?.urls.get(&id).cloned())
    }

    async fn increment_clicks(&self, id: i64) -> Result<Link, AppError> {
        let mut t = self.tables()?;
        let link = t
            .urls
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found("URL not found", json!({ "id": id })))?;

        let now = Utc::now();
        link.clicks += 1;
        link.last_clicked_at = Some(link.last_clicked_at.map_or(now, |prev| prev.max(now)));

        Ok(link.clone())
    }

    async fn list(&self) -> Result<Vec<Link>, AppError> {
        let mut links: Vec<Link> = self.tables()?.urls.values().cloned().collect();
        links.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(links)
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        let mut t = self.tables()?;
        let link = t
            .urls
            .remove(&id)
            .ok_or_else(|| AppError::not_found("URL not found", json!({ "id": id })))?;

        t.code_index.remove(&link.short_code);
        t.analytics.retain(|click| click.link_id != id);

        Ok(())
    }

    async fn totals(&self) -> Result<LinkTotals, AppError> {
        let t = self.tables()?;
        Ok(LinkTotals {
            total_clicks: t.urls.values().map(|l| l.clicks).sum(),
            total_links: t.urls.len() as i64,
        })
    }

    async fn ping(&self) -> Result<(), AppError> {
        self.tables().map(|_| ())
    }
}

#[async_trait]
impl ClickRepository for MemoryStore {
    async fn record(&self, new_click: NewClick) -> Result<Click, AppError> {
        let mut t = self.tables()?;

        if !t.urls.contains_key(&new_click.link_id) {
            return Err(AppError::not_found(
                "URL not found",
                json!({ "id": new_click.link_id }),
            ));
        }

        t.next_click_id += 1;
        let click = Click::new(
            t.next_click_id,
            new_click.link_id,
            Utc::now(),
            new_click.referrer,
            new_click.user_agent,
        );
        t.analytics.push(click.clone());

        Ok(click)
    }

    async fn counts_by_slot(
        &self,
        link_id: Option<i64>,
        since: DateTime<Utc>,
    ) -> Result<Vec<SlotCount>, AppError> {
        let t = self.tables()?;
        let mut slots: BTreeMap<DateTime<Utc>, i64> = BTreeMap::new();
        for click in t.window(link_id, since) {
            *slots.entry(slot_start(click.occurred_at)).or_insert(0) += 1;
        }

        Ok(slots
            .into_iter()
            .map(|(slot_start, clicks)| SlotCount { slot_start, clicks })
            .collect())
    }

    async fn counts_by_source(
        &self,
        link_id: Option<i64>,
        since: DateTime<Utc>,
    ) -> Result<Vec<SourceCount>, AppError> {
        let t = self.tables()?;
        let mut sources: HashMap<(Option<String>, Option<String>), i64> = HashMap::new();
        for click in t.window(link_id, since) {
            *sources
                .entry((click.referrer.clone(), click.user_agent.clone()))
                .or_insert(0) += 1;
        }

        Ok(sources
            .into_iter()
            .map(|((referrer, user_agent), clicks)| SourceCount {
                referrer,
                user_agent,
                clicks,
            })
            .collect())
    }

    async fn count_for_link(&self, link_id: i64) -> Result<i64, AppError> {
        let t = self.tables()?;
        Ok(t.analytics.iter().filter(|c| c.link_id == link_id).count() as i64)
    }
}
