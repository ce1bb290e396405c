//! `/forward-auth` handler
//!
//! For proxies that only forward headers (Traefik `forwardAuth`, nginx
//! `auth_request`). The original request is reconstructed from the
//! `X-Forwarded-*` family and the session id comes from the cookie.

use std::sync::Arc;

use actix_web::{web, HttpRequest, Responder};
use sessiongate_auth::RequestContext;

use super::response::decision_response;
use crate::state::GateState;

const FORWARDED_METHOD: &str = "X-Forwarded-Method";
const FORWARDED_PROTO: &str = "X-Forwarded-Proto";
const FORWARDED_HOST: &str = "X-Forwarded-Host";
const FORWARDED_URI: &str = "X-Forwarded-Uri";

/// ANY /forward-auth
pub async fn forward_auth_handler(
    state: web::Data<Arc<GateState>>,
    req: HttpRequest,
) -> impl Responder {
    let ctx = context_from_headers(&req, &state);
    let decision = state.verifier.decide(&ctx).await;
    decision_response(decision, &ctx, &state.renderer)
}

fn context_from_headers(req: &HttpRequest, state: &GateState) -> RequestContext {
    let auth = &state.auth;
    RequestContext {
        client_ip: client_ip(req, &auth.client_ip_header),
        session_id: req
            .cookie(&auth.session_cookie_name)
            .map(|cookie| cookie.value().to_string())
            .unwrap_or_default(),
        method: header_value(req, FORWARDED_METHOD),
        protocol: header_value(req, FORWARDED_PROTO),
        host: header_value(req, FORWARDED_HOST),
        path: header_value(req, FORWARDED_URI),
        user_agent: header_value(req, "User-Agent"),
        referer: header_value(req, "Referer"),
        accept: header_value(req, "Accept"),
        trace_id: header_value(req, &auth.trace_id_header),
    }
}

fn header_value(req: &HttpRequest, name: &str) -> String {
    req.headers()
        .get(name)
        .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
        .unwrap_or_default()
}

/// First entry of the configured client-IP header, else the peer address.
fn client_ip(req: &HttpRequest, header: &str) -> String {
    let forwarded = header_value(req, header);
    let first = forwarded.split(',').next().unwrap_or("").trim();
    if !first.is_empty() {
        return first.to_string();
    }
    req.peer_addr()
        .map(|addr| addr.ip().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test;

    #[::core::prelude::v1::test]
    fn test_client_ip_prefers_first_forwarded_entry() {
        let req = test::TestRequest::default()
            .insert_header(("X-Forwarded-For", " 203.0.113.7 , 10.0.0.1"))
            .peer_addr("10.0.0.2:5000".parse().unwrap())
            .to_http_request();
        assert_eq!(client_ip(&req, "X-Forwarded-For"), "203.0.113.7");
    }

    #[::core::prelude::v1::test]
    fn test_client_ip_falls_back_to_peer() {
        let req = test::TestRequest::default()
            .peer_addr("10.0.0.2:5000".parse().unwrap())
            .to_http_request();
        assert_eq!(client_ip(&req, "X-Forwarded-For"), "10.0.0.2");

        let req = test::TestRequest::default().to_http_request();
        assert_eq!(client_ip(&req, "X-Real-IP"), "");
    }

    #[::core::prelude::v1::test]
    fn test_missing_headers_read_as_empty() {
        let req = test::TestRequest::default().to_http_request();
        assert_eq!(header_value(&req, FORWARDED_HOST), "");
    }
}
