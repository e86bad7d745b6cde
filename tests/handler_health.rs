mod common;

use serde_json::Value;

#[tokio::test]
async fn test_health_endpoint_success() {
    let (server, _store) = common::create_test_server();

    let response = server.get("/health").await;

    response.assert_status_ok();

    let json = response.json::<Value>();
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["checks"]["store"]["status"], "ok");
    assert_eq!(json["checks"]["change_feed"]["status"], "ok");
}

#[tokio::test]
async fn test_health_endpoint_structure() {
    let (server, _store) = common::create_test_server();

    let json = server.get("/health").await.json::<Value>();

    assert!(json.get("status").is_some());
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
    assert!(json["checks"].get("store").is_some());
    assert!(json["checks"].get("change_feed").is_some());
}

#[tokio::test]
async fn test_health_is_not_a_short_code() {
    let (server, store) = common::create_test_server();
    common::create_memory_link(&store, "healthy", "https://example.com").await;

    server.get("/health").await.assert_status_ok();
    assert_eq!(server.get("/healthy").await.status_code(), 307);
}
