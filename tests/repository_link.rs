mod common;

use clickpath::AppError;
use clickpath::domain::entities::NewLink;
use clickpath::domain::repositories::LinkRepository;
use clickpath::infrastructure::persistence::PgLinkRepository;
use sqlx::PgPool;
use std::sync::Arc;

fn new_link(code: &str) -> NewLink {
    NewLink {
        short_code: code.to_string(),
        original_url: "https://example.com".to_string(),
    }
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_create_link(pool: PgPool) {
    let repo = PgLinkRepository::new(Arc::new(pool));

    let link = repo.create(new_link("test123")).await.unwrap();

    assert_eq!(link.short_code, "test123");
    assert_eq!(link.original_url, "https://example.com");
    assert_eq!(link.clicks, 0);
    assert!(link.last_clicked_at.is_none());
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_create_duplicate_code_conflicts(pool: PgPool) {
    let repo = PgLinkRepository::new(Arc::new(pool));

    repo.create(new_link("dup")).await.unwrap();
    let result = repo.create(new_link("dup")).await;

    assert!(matches!(result.unwrap_err(), AppError::Conflict { .. }));
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_find_by_code(pool: PgPool) {
    let id = common::create_test_link(&pool, "abc123", "https://example.com").await;
    let repo = PgLinkRepository::new(Arc::new(pool));

    let link = repo.find_by_code("abc123").await.unwrap().unwrap();
    assert_eq!(link.id, id);

    assert!(repo.find_by_code("notfound").await.unwrap().is_none());
    assert_eq!(repo.find_by_id(id).await.unwrap().unwrap().short_code, "abc123");
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_concurrent_increments_are_not_lost(pool: PgPool) {
    let id = common::create_test_link(&pool, "hot", "https://example.com").await;
    let repo = Arc::new(PgLinkRepository::new(Arc::new(pool)));

    let handles: Vec<_> = (0..50)
        .map(|_| {
            let repo = repo.clone();
            tokio::spawn(async move { repo.increment_clicks(id).await.unwrap() })
        })
        .collect();

    let mut latest = None;
    for handle in handles {
        let link = handle.await.unwrap();
        latest = latest.max(link.last_clicked_at);
    }

    let link = repo.find_by_id(id).await.unwrap().unwrap();
    assert_eq!(link.clicks, 50);
    assert_eq!(link.last_clicked_at, latest);
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_increment_unknown_id(pool: PgPool) {
    let repo = PgLinkRepository::new(Arc::new(pool));

    let result = repo.increment_clicks(999).await;

    assert!(matches!(result.unwrap_err(), AppError::NotFound { .. }));
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_list_and_totals(pool: PgPool) {
    let first = common::create_test_link(&pool, "first", "https://example.com/1").await;
    common::create_test_link(&pool, "second", "https://example.com/2").await;
    let repo = PgLinkRepository::new(Arc::new(pool));

    repo.increment_clicks(first).await.unwrap();
    repo.increment_clicks(first).await.unwrap();

    let links = repo.list().await.unwrap();
    assert_eq!(links.len(), 2);
    assert_eq!(links[0].short_code, "second");

    let totals = repo.totals().await.unwrap();
    assert_eq!(totals.total_links, 2);
    assert_eq!(totals.total_clicks, 2);
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_delete_cascades_events(pool: PgPool) {
    let id = common::create_test_link(&pool, "gone", "https://example.com").await;
    common::create_test_click(&pool, id, Some("https://google.com")).await;

    let repo = PgLinkRepository::new(Arc::new(pool.clone()));
    repo.delete(id).await.unwrap();

    let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM url_analytics WHERE url_id = $1")
        .bind(id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(remaining, 0);

    assert!(matches!(
        repo.delete(id).await.unwrap_err(),
        AppError::NotFound { .. }
    ));
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_ping(pool: PgPool) {
    let repo = PgLinkRepository::new(Arc::new(pool));

    assert!(repo.ping().await.is_ok());
}
