//! PostgreSQL implementation of the click event log.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{CLICK_SLOT_SECONDS, Click, NewClick, SlotCount, SourceCount};
use crate::domain::repositories::ClickRepository;
use crate::error::AppError;

#[derive(Debug, sqlx::FromRow)]
struct AnalyticsRow {
    id: i64,
    url_id: i64,
    clicked_at: DateTime<Utc>,
    referrer: Option<String>,
    user_agent: Option<String>,
}

impl From<AnalyticsRow> for Click {
    fn from(r: AnalyticsRow) -> Self {
        Click::new(r.id, r.url_id, r.clicked_at, r.referrer, r.user_agent)
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SlotRow {
    slot_start: DateTime<Utc>,
    clicks: i64,
}

#[derive(Debug, sqlx::FromRow)]
struct SourceRow {
    referrer: Option<String>,
    user_agent: Option<String>,
    clicks: i64,
}

/// PostgreSQL repository for the append-only `url_analytics` table.
pub struct PgClickRepository {
    pool: Arc<PgPool>,
}

impl PgClickRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ClickRepository for PgClickRepository {
    async fn record(&self, new_click: NewClick) -> Result<Click, AppError> {
        let row = sqlx::query_as::<_, AnalyticsRow>(
            r#"
            INSERT INTO url_analytics (url_id, referrer, user_agent)
            VALUES ($1, $2, $3)
            RETURNING id, url_id, clicked_at, referrer, user_agent
            "#,
        )
        .bind(new_click.link_id)
        .bind(&new_click.referrer)
        .bind(&new_click.user_agent)
        .fetch_one(self.pool.as_ref())
        .await
        .map_err(|e| {
            let fk_violation = e
                .as_database_error()
                .is_some_and(|db| db.is_foreign_key_violation());

            if fk_violation {
                AppError::not_found("URL not found", json!({ "id": new_click.link_id }))
            } else {
                AppError::from(e)
            }
        })?;

        Ok(row.into())
    }

    async fn counts_by_slot(
        &self,
        link_id: Option<i64>,
        since: DateTime<Utc>,
    ) -> Result<Vec<SlotCount>, AppError> {
        let rows = sqlx::query_as::<_, SlotRow>(
            r#"
            SELECT to_timestamp(floor(extract(epoch FROM clicked_at)::FLOAT8 / $3) * $3) AS slot_start,
                   COUNT(*) AS clicks
            FROM url_analytics
            WHERE ($1::BIGINT IS NULL OR url_id = $1)
              AND clicked_at >= $2
            GROUP BY 1
            ORDER BY 1
            "#,
        )
        .bind(link_id)
        .bind(since)
        .bind(CLICK_SLOT_SECONDS as f64)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| SlotCount {
                slot_start: r.slot_start,
                clicks: r.clicks,
            })
            .collect())
    }

    async fn counts_by_source(
        &self,
        link_id: Option<i64>,
        since: DateTime<Utc>,
    ) -> Result<Vec<SourceCount>, AppError> {
        let rows = sqlx::query_as::<_, SourceRow>(
            r#"
            SELECT referrer, user_agent, COUNT(*) AS clicks
            FROM url_analytics
            WHERE ($1::BIGINT IS NULL OR url_id = $1)
              AND clicked_at >= $2
            GROUP BY referrer, user_agent
            "#,
        )
        .bind(link_id)
        .bind(since)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| SourceCount {
                referrer: r.referrer,
                user_agent: r.user_agent,
                clicks: r.clicks,
            })
            .collect())
    }

    async fn count_for_link(&self, link_id: i64) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM url_analytics WHERE url_id = $1")
            .bind(link_id)
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(count)
    }
}
