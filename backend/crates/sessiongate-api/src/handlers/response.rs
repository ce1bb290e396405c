//! Turns a [`Decision`] into an HTTP response.

use actix_web::http::header::HeaderValue;
use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use log::warn;
use sessiongate_auth::{Decision, DenialRenderer, RequestContext};

/// Carries the authenticated user id back to the gateway on Allow.
pub const USER_ID_HEADER: &str = "X-Auth-User-Id";

pub(crate) fn decision_response(
    decision: Decision,
    ctx: &RequestContext,
    renderer: &DenialRenderer,
) -> HttpResponse {
    match decision {
        Decision::Allow(identity) => {
            let mut response = HttpResponse::Ok();
            match HeaderValue::from_str(identity.user_id()) {
                Ok(value) => {
                    response.insert_header((USER_ID_HEADER, value));
                }
                Err(_) => warn!(
                    "User id {:?} is not a valid header value, omitting {}",
                    identity.user_id(),
                    USER_ID_HEADER
                ),
            }
            response.finish()
        }
        Decision::Deny(reason) => {
            let denial = renderer.render(ctx, reason);
            let status = StatusCode::from_u16(denial.status).unwrap_or(StatusCode::UNAUTHORIZED);
            HttpResponse::build(status)
                .content_type(denial.content_type)
                .body(denial.body)
        }
    }
}
