#![allow(dead_code)]

use axum_test::TestServer;
use clickpath::config::Config;
use clickpath::domain::entities::{Link, NewLink};
use clickpath::domain::repositories::LinkRepository;
use clickpath::infrastructure::persistence::MemoryStore;
use clickpath::routes::router;
use clickpath::state::AppState;
use sqlx::PgPool;
use std::sync::Arc;

/// State over a fresh in-memory store, returned alongside the store so tests
/// can inspect what the handlers wrote.
pub fn create_test_state() -> (AppState, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let state = AppState::new(store.clone(), store.clone(), &Config::default());
    (state, store)
}

/// Full router (all routes and layers) over an in-memory store.
pub fn create_test_server() -> (TestServer, Arc<MemoryStore>) {
    let (state, store) = create_test_state();
    let server = TestServer::new(router(state)).unwrap();
    (server, store)
}

pub async fn create_memory_link(store: &MemoryStore, code: &str, url: &str) -> Link {
    store
        .create(NewLink {
            short_code: code.to_string(),
            original_url: url.to_string(),
        })
        .await
        .unwrap()
}

pub async fn create_test_link(pool: &PgPool, code: &str, url: &str) -> i64 {
    sqlx::query_scalar("INSERT INTO urls (short_code, original_url) VALUES ($1, $2) RETURNING id")
        .bind(code)
        .bind(url)
        .fetch_one(pool)
        .await
        .unwrap()
}

pub async fn create_test_click(pool: &PgPool, url_id: i64, referrer: Option<&str>) {
    sqlx::query("INSERT INTO url_analytics (url_id, referrer) VALUES ($1, $2)")
        .bind(url_id)
        .bind(referrer)
        .execute(pool)
        .await
        .unwrap();
}
