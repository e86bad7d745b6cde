mod common;

use axum::http::{Method, StatusCode};
use clickpath::api::dto::links::LinkResponse;
use clickpath::api::dto::redirect::RedirectResponse;
use clickpath::domain::repositories::{ClickRepository, LinkRepository};
use serde_json::json;

#[tokio::test]
async fn test_create_then_redirect_counts_one_click() {
    let (server, store) = common::create_test_server();

    let created = server
        .post("/api/links")
        .json(&json!({ "url": "https://example.com/a/b" }))
        .await;
    created.assert_status(StatusCode::CREATED);

    let link = created.json::<LinkResponse>();
    assert_eq!(link.short_code.len(), 6);
    assert!(link.short_code.chars().all(|c| c.is_ascii_alphanumeric()));
    assert_eq!(link.clicks, 0);
    assert!(link.last_clicked_at.is_none());

    let response = server
        .get("/redirect")
        .add_query_param("code", &link.short_code)
        .await;

    response.assert_status_ok();
    assert_eq!(
        response.json::<RedirectResponse>(),
        RedirectResponse {
            url: "https://example.com/a/b".to_string(),
            clicks: 1,
        }
    );

    let stored = store.find_by_code(&link.short_code).await.unwrap().unwrap();
    assert_eq!(stored.clicks, 1);
    assert!(stored.last_clicked_at.is_some());
    assert_eq!(store.count_for_link(stored.id).await.unwrap(), 1);
}

#[tokio::test]
async fn test_redirect_not_found_records_nothing() {
    let (server, store) = common::create_test_server();
    let link = common::create_memory_link(&store, "exists", "https://example.com").await;

    let response = server
        .get("/redirect")
        .add_query_param("code", "never-created")
        .await;

    response.assert_status_not_found();
    response.assert_json(&json!({ "error": "URL not found" }));

    assert_eq!(store.count_for_link(link.id).await.unwrap(), 0);
    assert_eq!(store.totals().await.unwrap().total_clicks, 0);
}

#[tokio::test]
async fn test_redirect_missing_code() {
    let (server, _store) = common::create_test_server();

    let response = server.get("/redirect").await;
    response.assert_status_bad_request();
    response.assert_json(&json!({ "error": "Short code is required" }));

    let response = server.get("/redirect").add_query_param("code", "").await;
    response.assert_status_bad_request();
    response.assert_json(&json!({ "error": "Short code is required" }));
}

#[tokio::test]
async fn test_redirect_repeated_code_returns_json_error() {
    let (server, store) = common::create_test_server();
    let link = common::create_memory_link(&store, "twice", "https://example.com").await;

    let response = server.get("/redirect?code=twice&code=other").await;

    response.assert_status_bad_request();
    let body = response.json::<serde_json::Value>();
    assert!(body["error"].is_string());
    assert_eq!(store.find_by_id(link.id).await.unwrap().unwrap().clicks, 0);
}

#[tokio::test]
async fn test_redirect_records_referrer_and_user_agent() {
    let (server, store) = common::create_test_server();
    let link = common::create_memory_link(&store, "track", "https://example.com").await;

    server
        .get("/redirect")
        .add_query_param("code", "track")
        .add_header("Referer", "https://www.google.com/search?q=x")
        .add_header("User-Agent", "Mozilla/5.0 (iPad; CPU OS 17_0 like Mac OS X) Mobile")
        .await
        .assert_status_ok();

    let sources = store
        .counts_by_source(Some(link.id), chrono::DateTime::<chrono::Utc>::UNIX_EPOCH)
        .await
        .unwrap();

    assert_eq!(sources.len(), 1);
    assert_eq!(sources[0].clicks, 1);
    assert_eq!(
        sources[0].referrer.as_deref(),
        Some("https://www.google.com/search?q=x")
    );
    assert!(sources[0].user_agent.as_deref().unwrap().contains("iPad"));
}

#[tokio::test]
async fn test_repeated_redirects_increment() {
    let (server, store) = common::create_test_server();
    common::create_memory_link(&store, "again", "https://example.com").await;

    for expected in 1..=3 {
        let response = server.get("/redirect").add_query_param("code", "again").await;
        assert_eq!(response.json::<RedirectResponse>().clicks, expected);
    }
}

#[tokio::test]
async fn test_path_redirect() {
    let (server, store) = common::create_test_server();
    common::create_memory_link(&store, "redirect1", "https://example.com/target").await;

    let response = server.get("/redirect1").await;

    assert_eq!(response.status_code(), 307);
    assert_eq!(response.header("location"), "https://example.com/target");

    let stored = store.find_by_code("redirect1").await.unwrap().unwrap();
    assert_eq!(stored.clicks, 1);
}

#[tokio::test]
async fn test_path_redirect_not_found() {
    let (server, _store) = common::create_test_server();

    let response = server.get("/notfound").await;

    response.assert_status_not_found();
    response.assert_json(&json!({ "error": "URL not found" }));
}

#[tokio::test]
async fn test_cors_preflight() {
    let (server, _store) = common::create_test_server();

    let response = server
        .method(Method::OPTIONS, "/redirect")
        .add_header("Origin", "https://dashboard.example.com")
        .add_header("Access-Control-Request-Method", "GET")
        .add_header("Access-Control-Request-Headers", "content-type")
        .await;

    response.assert_status_ok();
    assert_eq!(response.header("access-control-allow-origin"), "*");
    assert!(response.text().is_empty());
}

#[tokio::test]
async fn test_cors_headers_on_error_response() {
    let (server, _store) = common::create_test_server();

    let response = server
        .get("/redirect")
        .add_query_param("code", "missing")
        .add_header("Origin", "https://dashboard.example.com")
        .await;

    response.assert_status_not_found();
    assert_eq!(response.header("access-control-allow-origin"), "*");
}
