//! PostgreSQL implementation of link repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{Link, LinkTotals, NewLink};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;

const SELECT_COLUMNS: &str = "id, short_code, original_url, clicks, last_clicked_at, created_at";

#[derive(Debug, sqlx::FromRow)]
struct UrlRow {
    id: i64,
    short_code: String,
    original_url: String,
    clicks: i64,
    last_clicked_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl From<UrlRow> for Link {
    fn from(r: UrlRow) -> Self {
        Link::new(
            r.id,
            r.short_code,
            r.original_url,
            r.clicks,
            r.last_clicked_at,
            r.created_at,
        )
    }
}

/// PostgreSQL repository for the `urls` table.
///
/// Code uniqueness is enforced by the `urls_short_code_key` constraint and
/// click increments are single `UPDATE` statements, so neither depends on
/// application-side locking.
pub struct PgLinkRepository {
    pool: Arc<PgPool>,
}

impl PgLinkRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LinkRepository for PgLinkRepository {
    async fn create(&self, new_link: NewLink) -> Result<Link, AppError> {
        let row = sqlx::query_as::<_, UrlRow>(&format!(
            "INSERT INTO urls (short_code, original_url) VALUES ($1, $2) RETURNING {SELECT_COLUMNS}"
        ))
        .bind(&new_link.short_code)
        .bind(&new_link.original_url)
        .fetch_one(self.pool.as_ref())
        .await
        .map_err(|e| match AppError::from(e) {
            AppError::Conflict { .. } => AppError::conflict(
                "Short code already exists",
                json!({ "short_code": new_link.short_code }),
            ),
            other => other,
        })?;

        Ok(row.into())
    }

    async fn find_by_code(&self, short_code: &str) -> Result<Option<Link>, AppError> {
        let row = sqlx::query_as::<_, UrlRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM urls WHERE short_code = $1"
        ))
        .bind(short_code)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Link::from))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Link>, AppError> {
        let row = sqlx::query_as::<_, UrlRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM urls WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Link::from))
    }

    async fn increment_clicks(&self, id: i64) -> Result<Link, AppError> {
        // GREATEST ignores NULL, so the first click sets the timestamp and
        // later ones never move it backward.
        let row = sqlx::query_as::<_, UrlRow>(&format!(
            r#"
            UPDATE urls
            SET clicks = clicks + 1,
                last_clicked_at = GREATEST(last_clicked_at, NOW())
            WHERE id = $1
            RETURNING {SELECT_COLUMNS}
            "#
        ))
        .bind(id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        row.map(Link::from)
            .ok_or_else(|| AppError::not_found("URL not found", json!({ "id": id })))
    }

    async fn list(&self) -> Result<Vec<Link>, AppError> {
        let rows = sqlx::query_as::<_, UrlRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM urls ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.into_iter().map(Link::from).collect())
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM urls WHERE id = $1")
            .bind(id)
            .execute(self.pool.as_ref())
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("URL not found", json!({ "id": id })));
        }

        Ok(())
    }

    async fn totals(&self) -> Result<LinkTotals, AppError> {
        let (total_clicks, total_links): (i64, i64) = sqlx::query_as(
            "SELECT COALESCE(SUM(clicks), 0)::BIGINT, COUNT(*) FROM urls",
        )
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(LinkTotals {
            total_clicks,
            total_links,
        })
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(self.pool.as_ref())
            .await?;
        Ok(())
    }
}
