//! End-to-end checks against a running server over HTTP.

#[path = "test_support/mod.rs"]
mod test_support;

use reqwest::StatusCode;
use serde_json::json;
use sessiongate_configs::VerifyMethod;
use test_support::http_server::{start_http_test_server, start_http_test_server_with, test_config};
use test_support::records;

const SESSION_ID: &str = "q8w7e6r5t4y3u2i1o0p9a8s7d6f5g4h3";

#[tokio::test]
async fn test_verify_allows_seeded_session() {
    let server = start_http_test_server().await.unwrap();
    server.seed(SESSION_ID, records::USER_42);

    let resp = reqwest::Client::new()
        .post(server.url("/verify"))
        .json(&json!({
            "client_ip": "203.0.113.9",
            "session_id": SESSION_ID,
            "method": "GET",
            "protocol": "https",
            "host": "app.example.com",
            "path": "/",
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()["x-auth-user-id"], "42");
    assert_eq!(resp.headers()["cache-control"], "no-store");
    assert!(resp.text().await.unwrap().is_empty());

    server.shutdown().await;
}

#[tokio::test]
async fn test_verify_denials_share_one_body() {
    let server = start_http_test_server().await.unwrap();
    server.seed("decodes-badly", records::WITH_DATE);
    server.seed("anonymous", records::ANONYMOUS);
    let client = reqwest::Client::new();

    for session_id in ["", "unknown", "decodes-badly", "anonymous"] {
        let resp = client
            .post(server.url("/verify"))
            .json(&json!({ "session_id": session_id, "accept": "application/json" }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "session {:?}", session_id);
        assert!(resp.headers().get("x-auth-user-id").is_none());
        let body: serde_json::Value = resp.json().await.unwrap();
        assert_eq!(
            body,
            json!({"code": 401, "error": "unauthorized", "message": "unauthorized", "data": null})
        );
    }

    server.shutdown().await;
}

#[tokio::test]
async fn test_verify_protocol0_record() {
    let server = start_http_test_server().await.unwrap();
    server.seed(SESSION_ID, records::USER_5_PROTOCOL0);

    let resp = reqwest::Client::new()
        .post(server.url("/verify"))
        .json(&json!({ "session_id": SESSION_ID }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()["x-auth-user-id"], "5");

    server.shutdown().await;
}

#[tokio::test]
async fn test_verify_rejects_bad_method_and_body() {
    let server = start_http_test_server().await.unwrap();
    let client = reqwest::Client::new();

    let resp = client.get(server.url("/verify")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(resp.text().await.unwrap(), "method not allowed");

    let resp = client
        .post(server.url("/verify"))
        .header("Content-Type", "application/json")
        .body("{\"session_id\": ")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(resp.text().await.unwrap(), "bad request");

    server.shutdown().await;
}

#[tokio::test]
async fn test_forward_auth_with_cookie() {
    let server = start_http_test_server().await.unwrap();
    server.seed(SESSION_ID, records::USER_42);

    let resp = reqwest::Client::new()
        .get(server.url("/forward-auth"))
        .header("Cookie", format!("sessionid={}", SESSION_ID))
        .header("X-Forwarded-Method", "GET")
        .header("X-Forwarded-Proto", "https")
        .header("X-Forwarded-Host", "app.example.com")
        .header("X-Forwarded-Uri", "/orders/7")
        .header("X-Forwarded-For", "198.51.100.4, 10.0.0.1")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()["x-auth-user-id"], "42");

    server.shutdown().await;
}

#[tokio::test]
async fn test_forward_auth_browser_gets_sign_in_page() {
    let server = start_http_test_server().await.unwrap();

    let resp = reqwest::Client::new()
        .get(server.url("/forward-auth"))
        .header("Accept", "text/html,application/xhtml+xml")
        .header("X-Forwarded-Proto", "https")
        .header("X-Forwarded-Host", "app.example.com")
        .header("X-Forwarded-Uri", "/orders?page=2")
        .header("X-Request-Id", "req-77")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(resp.headers()["content-type"], "text/html; charset=utf-8");
    let body = resp.text().await.unwrap();
    assert!(body.contains(
        "href=\"https://sso.example.com/login?next=https%3A%2F%2Fapp.example.com%2Forders%3Fpage%3D2\""
    ));
    assert!(body.contains("<p class=\"trace-id\">req-77</p>"));

    server.shutdown().await;
}

#[tokio::test]
async fn test_custom_cookie_and_methods() {
    let mut config = test_config();
    config.auth.session_cookie_name = "gate_sid".to_string();
    config.auth.verify_methods = vec![VerifyMethod::ForwardAuth];
    let server = start_http_test_server_with(config).await.unwrap();
    server.seed(SESSION_ID, records::USER_42);
    let client = reqwest::Client::new();

    let resp = client
        .get(server.url("/forward-auth"))
        .header("Cookie", format!("sessionid={}", SESSION_ID))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = client
        .get(server.url("/forward-auth"))
        .header("Cookie", format!("gate_sid={}", SESSION_ID))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = client
        .post(server.url("/verify"))
        .json(&json!({ "session_id": SESSION_ID }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    server.shutdown().await;
}

#[tokio::test]
async fn test_health() {
    let server = start_http_test_server().await.unwrap();

    let resp = reqwest::get(server.url("/health")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.text().await.unwrap().is_empty());

    server.shutdown().await;
}

#[tokio::test]
async fn test_concurrent_checks() {
    let server = start_http_test_server().await.unwrap();
    for i in 0..16 {
        server.seed(&format!("session-{:02}", i), records::USER_42);
    }
    let client = reqwest::Client::new();

    let mut handles = Vec::new();
    for i in 0..32 {
        let client = client.clone();
        let url = server.url("/verify");
        handles.push(tokio::spawn(async move {
            let resp = client
                .post(url)
                .json(&json!({ "session_id": format!("session-{:02}", i) }))
                .send()
                .await
                .unwrap();
            (i, resp.status())
        }));
    }

    for handle in handles {
        let (i, status) = handle.await.unwrap();
        let expected = if i < 16 {
            StatusCode::OK
        } else {
            StatusCode::UNAUTHORIZED
        };
        assert_eq!(status, expected, "request {}", i);
    }

    server.shutdown().await;
}
