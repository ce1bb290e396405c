//! API routes configuration

use crate::handlers;
use actix_web::web;
use sessiongate_configs::VerifyMethod;

/// Configure SessionGate routes
///
/// - POST /verify - mounted when `body` is enabled
/// - ANY /forward-auth - mounted when `forward_auth` is enabled
/// - GET /health - always mounted
pub fn configure_routes(cfg: &mut web::ServiceConfig, methods: &[VerifyMethod]) {
    if methods.contains(&VerifyMethod::Body) {
        cfg.service(
            web::resource("/verify")
                .app_data(handlers::verify_json_config())
                .route(web::post().to(handlers::verify_handler))
                .default_service(web::to(handlers::method_not_allowed)),
        );
    }
    if methods.contains(&VerifyMethod::ForwardAuth) {
        cfg.route("/forward-auth", web::route().to(handlers::forward_auth_handler));
    }
    cfg.route("/health", web::get().to(handlers::health_handler));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::USER_ID_HEADER;
    use crate::state::GateState;
    use actix_web::{http::StatusCode, test, App};
    use async_trait::async_trait;
    use sessiongate_auth::{LookupError, SessionStore};
    use sessiongate_configs::ServerConfig;
    use sessiongate_store::MemorySessionStore;
    use std::sync::Arc;

    const SESSION_ID: &str = "k3j4h5g6f7d8s9a0";
    const SESSION_KEY: &str = ":1:django.contrib.sessions.cachek3j4h5g6f7d8s9a0";
    // {'_auth_user_id': '42', '_auth_user_backend': 'pkg.Backend'} at protocol 4
    const SESSION_RECORD: &[u8] = b"\x80\x04\x95=\x00\x00\x00\x00\x00\x00\x00}\x94(\x8c\x0d_auth_user_id\x94\x8c\x0242\x94\x8c\x12_auth_user_backend\x94\x8c\x0bpkg.Backend\x94u.";

    struct DownStore;

    #[async_trait]
    impl SessionStore for DownStore {
        async fn fetch(&self, _key: &str) -> Result<Vec<u8>, LookupError> {
            Err(LookupError::other("connection refused"))
        }

        async fn ping(&self) -> Result<(), LookupError> {
            Err(LookupError::other("connection refused"))
        }
    }

    fn state_with(store: Arc<dyn SessionStore>, config: &ServerConfig) -> Arc<GateState> {
        Arc::new(GateState::from_config(store, config))
    }

    fn seeded_state() -> Arc<GateState> {
        let store = MemorySessionStore::new();
        store.insert(SESSION_KEY, SESSION_RECORD.to_vec());
        state_with(Arc::new(store), &ServerConfig::default())
    }

    macro_rules! init_app {
        ($state:expr, $methods:expr) => {{
            let methods: Vec<VerifyMethod> = $methods;
            test::init_service(
                App::new()
                    .app_data(web::Data::new($state))
                    .configure(move |cfg| configure_routes(cfg, &methods)),
            )
            .await
        }};
    }

    fn all_methods() -> Vec<VerifyMethod> {
        vec![VerifyMethod::Body, VerifyMethod::ForwardAuth]
    }

    #[actix_web::test]
    async fn test_verify_allows_known_session() {
        let app = init_app!(seeded_state(), all_methods());
        let req = test::TestRequest::post()
            .uri("/verify")
            .set_json(serde_json::json!({
                "session_id": SESSION_ID,
                "host": "app.example.com",
                "path": "/"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers().get(USER_ID_HEADER).unwrap(), "42");
        let body = test::read_body(resp).await;
        assert!(body.is_empty());
    }

    #[actix_web::test]
    async fn test_verify_denies_unknown_session_with_json() {
        let app = init_app!(seeded_state(), all_methods());
        let req = test::TestRequest::post()
            .uri("/verify")
            .set_json(serde_json::json!({ "session_id": "nope", "accept": "application/json" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert!(resp.headers().get(USER_ID_HEADER).is_none());
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(
            body,
            serde_json::json!({"code": 401, "error": "unauthorized", "message": "unauthorized", "data": null})
        );
    }

    #[actix_web::test]
    async fn test_verify_denies_browser_with_html() {
        let app = init_app!(seeded_state(), all_methods());
        let req = test::TestRequest::post()
            .uri("/verify")
            .set_json(serde_json::json!({
                "protocol": "https",
                "host": "app.example.com",
                "path": "/reports",
                "accept": "text/html",
                "trace_id": "t-1"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            resp.headers().get("content-type").unwrap(),
            "text/html; charset=utf-8"
        );
        let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
        assert!(body.contains("/accounts/login/?next=https%3A%2F%2Fapp.example.com%2Freports"));
        assert!(body.contains("t-1"));
    }

    #[actix_web::test]
    async fn test_verify_rejects_other_methods() {
        let app = init_app!(seeded_state(), all_methods());
        let req = test::TestRequest::get().uri("/verify").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(test::read_body(resp).await, "method not allowed");
    }

    #[actix_web::test]
    async fn test_verify_rejects_malformed_body() {
        let app = init_app!(seeded_state(), all_methods());
        for payload in ["", "{not json", "[1,2]"] {
            let req = test::TestRequest::post()
                .uri("/verify")
                .insert_header(("Content-Type", "application/json"))
                .set_payload(payload)
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "payload {:?}", payload);
            assert_eq!(test::read_body(resp).await, "bad request");
        }
    }

    #[actix_web::test]
    async fn test_verify_accepts_body_without_content_type() {
        let app = init_app!(seeded_state(), all_methods());
        let req = test::TestRequest::post()
            .uri("/verify")
            .set_payload(format!(r#"{{"session_id":"{}"}}"#, SESSION_ID))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn test_forward_auth_reads_cookie_and_headers() {
        let app = init_app!(seeded_state(), all_methods());
        let req = test::TestRequest::get()
            .uri("/forward-auth")
            .insert_header(("Cookie", format!("csrftoken=x; sessionid={}", SESSION_ID)))
            .insert_header(("X-Forwarded-Host", "app.example.com"))
            .insert_header(("X-Forwarded-Uri", "/"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers().get(USER_ID_HEADER).unwrap(), "42");
    }

    #[actix_web::test]
    async fn test_forward_auth_without_cookie_redirects_browser() {
        let app = init_app!(seeded_state(), all_methods());
        let req = test::TestRequest::default()
            .method(actix_web::http::Method::PUT)
            .uri("/forward-auth")
            .insert_header(("X-Forwarded-Proto", "https"))
            .insert_header(("X-Forwarded-Host", "app.example.com"))
            .insert_header(("X-Forwarded-Uri", "/a?b=c"))
            .insert_header(("Accept", "text/html"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
        assert!(body.contains("next=https%3A%2F%2Fapp.example.com%2Fa%3Fb%3Dc"));
    }

    #[actix_web::test]
    async fn test_disabled_method_is_not_mounted() {
        let app = init_app!(seeded_state(), vec![VerifyMethod::ForwardAuth]);
        let req = test::TestRequest::post()
            .uri("/verify")
            .set_json(serde_json::json!({ "session_id": SESSION_ID }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let app = init_app!(seeded_state(), vec![VerifyMethod::Body]);
        let req = test::TestRequest::get().uri("/forward-auth").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_health_reflects_store() {
        let app = init_app!(seeded_state(), all_methods());
        let resp = test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let down = state_with(Arc::new(DownStore), &ServerConfig::default());
        let app = init_app!(down, all_methods());
        let resp = test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(test::read_body(resp).await, "store unreachable");
    }

    #[actix_web::test]
    async fn test_store_failure_denies() {
        let down = state_with(Arc::new(DownStore), &ServerConfig::default());
        let app = init_app!(down, all_methods());
        let req = test::TestRequest::post()
            .uri("/verify")
            .set_json(serde_json::json!({ "session_id": SESSION_ID }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }
}
