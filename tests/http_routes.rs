//! HTTP Route Tests
//!
//! Drive the assembled router with `tower::ServiceExt::oneshot` and check
//! status codes, JSON shapes and side effects.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use secureguard::control::ControlApi;
use secureguard::http_server::{HttpServer, HttpServerConfig};

fn app() -> (Router, Arc<ControlApi>) {
    let api = Arc::new(ControlApi::new());
    let router = HttpServer::build_router(&HttpServerConfig::default(), api.clone());
    (router, api)
}

async fn send(router: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let (status, bytes) = send_raw(
        router,
        method,
        uri,
        body.map(|b| b.to_string()),
    )
    .await;
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn send_raw(
    router: &Router,
    method: Method,
    uri: &str,
    body: Option<String>,
) -> (StatusCode, Vec<u8>) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, bytes.to_vec())
}

#[tokio::test]
async fn test_health() {
    let (router, _) = app();
    let (status, body) = send(&router, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_get_settings_shape() {
    let (router, _) = app();
    let (status, body) = send(&router, Method::GET, "/api/security/settings", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], 1);
    assert_eq!(body["rdpEnabled"], false);
    assert_eq!(body["firewallDomainEnabled"], true);
    assert!(body["lastUpdated"].is_string());
}

#[tokio::test]
async fn test_patch_settings() {
    let (router, api) = app();
    let (status, body) = send(
        &router,
        Method::PATCH,
        "/api/security/settings",
        Some(json!({"sshEnabled": true, "firewallPublicEnabled": false})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sshEnabled"], true);
    assert_eq!(body["firewallPublicEnabled"], false);
    assert_eq!(body["rdpEnabled"], false);
    assert_eq!(api.store().activity_log_len().unwrap(), 1);
}

#[tokio::test]
async fn test_patch_settings_schema_violation() {
    let (router, api) = app();
    let (status, body) = send(
        &router,
        Method::PATCH,
        "/api/security/settings",
        Some(json!({"rdpEnabled": "definitely"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid security settings data");
    assert_eq!(body["code"], 400);
    assert_eq!(api.store().activity_log_len().unwrap(), 0);
    assert!(!api.settings().unwrap().rdp_enabled);
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let (router, _) = app();
    let (status, _) = send_raw(
        &router,
        Method::POST,
        "/api/security/remote-access/toggle",
        Some("{\"service\": \"rdp\",".to_string()),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Missing field
    let (status, _) = send(
        &router,
        Method::POST,
        "/api/security/remote-access/toggle",
        Some(json!({"service": "rdp"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_toggle_remote_access() {
    let (router, _) = app();
    let (status, body) = send(
        &router,
        Method::POST,
        "/api/security/remote-access/toggle",
        Some(json!({"service": "vnc", "enabled": true})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["vncEnabled"], true);
    assert_eq!(body["rdpEnabled"], false);

    let (status, body) = send(
        &router,
        Method::POST,
        "/api/security/remote-access/toggle",
        Some(json!({"service": "telnet", "enabled": true})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid service type");

    let (_, logs) = send(&router, Method::GET, "/api/security/logs", None).await;
    let logs = logs.as_array().unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0]["action"], "ENABLED");
    assert_eq!(logs[0]["details"], "VNC allowed on port 5900");
}

#[tokio::test]
async fn test_block_all_without_body() {
    let (router, _) = app();
    send(
        &router,
        Method::POST,
        "/api/security/remote-access/toggle",
        Some(json!({"service": "rdp", "enabled": true})),
    )
    .await;

    let (status, body) = send(&router, Method::POST, "/api/security/remote-access/block-all", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["rdpEnabled"], false);
    assert_eq!(body["sshEnabled"], false);
    assert_eq!(body["vncEnabled"], false);
}

#[tokio::test]
async fn test_firewall_routes() {
    let (router, _) = app();
    let (status, rules) = send(&router, Method::GET, "/api/security/firewall/rules", None).await;
    assert_eq!(status, StatusCode::OK);
    let rules = rules.as_array().unwrap();
    assert_eq!(rules.len(), 4);
    assert_eq!(rules[0]["name"], "Block RDP TCP");
    assert_eq!(rules[0]["protocol"], "tcp");
    assert_eq!(rules[0]["direction"], "inbound");
    assert_eq!(rules[0]["action"], "block");
    assert_eq!(rules[0]["isActive"], true);

    let (status, body) = send(
        &router,
        Method::POST,
        "/api/security/firewall/toggle",
        Some(json!({"profile": "domain", "enabled": false})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["firewallDomainEnabled"], false);

    let (status, _) = send(
        &router,
        Method::POST,
        "/api/security/firewall/toggle",
        Some(json!({"profile": "home", "enabled": false})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_service_control_routes() {
    let (router, api) = app();

    let (status, services) = send(&router, Method::GET, "/api/security/services", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(services[0]["displayName"], "Terminal Services");
    assert_eq!(services[0]["startupType"], "disabled");

    let (status, service) = send(
        &router,
        Method::POST,
        "/api/security/services/1/control",
        Some(json!({"action": "start"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(service["status"], "running");

    let (status, body) = send(
        &router,
        Method::POST,
        "/api/security/services/999/control",
        Some(json!({"action": "start"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 404);

    let (status, _) = send(
        &router,
        Method::POST,
        "/api/security/services/abc/control",
        Some(json!({"action": "stop"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &router,
        Method::POST,
        "/api/security/services/1/control",
        Some(json!({"action": "pause"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert_eq!(api.store().activity_log_len().unwrap(), 1);
}

#[tokio::test]
async fn test_bulk_action_route() {
    let (router, api) = app();
    send(
        &router,
        Method::POST,
        "/api/security/services/2/control",
        Some(json!({"action": "enable"})),
    )
    .await;

    let (status, services) = send(
        &router,
        Method::POST,
        "/api/security/services/bulk-action",
        Some(json!({"action": "stop-all"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let services = services.as_array().unwrap();
    assert_eq!(services.len(), 3);
    assert!(services.iter().all(|s| s["status"] == "stopped"));
    assert_eq!(services[1]["startupType"], "automatic");

    let (status, body) = send(
        &router,
        Method::POST,
        "/api/security/services/bulk-action",
        Some(json!({"action": "nuke-all"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid bulk action");

    assert_eq!(api.store().activity_log_len().unwrap(), 2);
}

#[tokio::test]
async fn test_logs_query_parameters() {
    let (router, _) = app();
    for _ in 0..12 {
        send(&router, Method::POST, "/api/security/remote-access/block-all", None).await;
    }
    send(
        &router,
        Method::POST,
        "/api/security/firewall/toggle",
        Some(json!({"profile": "public", "enabled": true})),
    )
    .await;

    let (_, page) = send(&router, Method::GET, "/api/security/logs?limit=10&offset=0", None).await;
    let page = page.as_array().unwrap();
    assert_eq!(page.len(), 10);
    assert_eq!(page[0]["component"], "Firewall");

    let (status, fallback) =
        send(&router, Method::GET, "/api/security/logs?limit=lots&offset=x", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fallback.as_array().unwrap().len(), 13);

    let (_, prefixed) =
        send(&router, Method::GET, "/api/security/logs?limit=3abc&offset=1.5", None).await;
    let prefixed = prefixed.as_array().unwrap();
    assert_eq!(prefixed.len(), 3);
    assert_eq!(prefixed[0]["component"], "Remote Access");

    let (_, beyond) = send(&router, Method::GET, "/api/security/logs?offset=100", None).await;
    assert!(beyond.as_array().unwrap().is_empty());

    let (_, firewall) =
        send(&router, Method::GET, "/api/security/logs?category=firewall", None).await;
    assert_eq!(firewall.as_array().unwrap().len(), 1);

    let (status, _) = send(&router, Method::GET, "/api/security/logs?category=dns", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_logs_export_csv() {
    let (router, _) = app();
    send(&router, Method::POST, "/api/security/remote-access/block-all", None).await;

    let request = Request::builder()
        .method(Method::GET)
        .uri("/api/security/logs/export?category=connections")
        .body(Body::empty())
        .unwrap();
    let response = router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/csv; charset=utf-8"
    );

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let csv = String::from_utf8(bytes.to_vec()).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0], "Timestamp,Action,Component,Status,Details");
    assert!(lines[1].ends_with(
        "\"BLOCKED\",\"Remote Access\",\"success\",\"All remote access connections blocked\""
    ));
}

#[tokio::test]
async fn test_status_route() {
    let (router, api) = app();
    let (status, body) = send(&router, Method::GET, "/api/security/status", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "remoteAccessBlocked": true,
            "firewallActive": true,
            "servicesStopped": true,
            "securityScore": 95,
            "activeBlockRules": 4,
            "systemOnline": true
        })
    );
    assert_eq!(api.store().activity_log_len().unwrap(), 0);
}
