//! `POST /verify` handler

use std::sync::Arc;

use actix_web::error::{InternalError, JsonPayloadError};
use actix_web::{web, Error, HttpRequest, HttpResponse, Responder};
use log::warn;
use sessiongate_auth::RequestContext;

use super::response::decision_response;
use crate::models::VerifyRequest;
use crate::state::GateState;

/// Upper bound on a verify request body
pub const MAX_VERIFY_BODY_BYTES: usize = 64 * 1024;

/// POST /verify
///
/// The gateway describes the original request in the JSON body. Bodies are
/// accepted regardless of `Content-Type`.
pub async fn verify_handler(
    state: web::Data<Arc<GateState>>,
    body: web::Json<VerifyRequest>,
) -> impl Responder {
    let ctx = RequestContext::from(body.into_inner());
    let decision = state.verifier.decide(&ctx).await;
    decision_response(decision, &ctx, &state.renderer)
}

/// Any other method on `/verify`
pub async fn method_not_allowed() -> HttpResponse {
    HttpResponse::MethodNotAllowed()
        .content_type("text/plain; charset=utf-8")
        .body("method not allowed")
}

/// JSON extractor settings for `/verify`: size cap, no content-type check,
/// and a plain `bad request` for anything that fails to parse.
pub fn verify_json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(MAX_VERIFY_BODY_BYTES)
        .content_type_required(false)
        .error_handler(bad_request)
}

fn bad_request(err: JsonPayloadError, _req: &HttpRequest) -> Error {
    warn!("Failed to decode verify request body: {}", err);
    let response = HttpResponse::BadRequest()
        .content_type("text/plain; charset=utf-8")
        .body("bad request");
    InternalError::from_response(err, response).into()
}
