//! Store reachability probe

use std::sync::Arc;

use actix_web::{web, HttpResponse, Responder};
use log::warn;

use crate::state::GateState;

/// GET /health
///
/// 200 with an empty body when the session store answers a ping,
/// 503 `store unreachable` otherwise.
pub async fn health_handler(state: web::Data<Arc<GateState>>) -> impl Responder {
    match state.verifier.store().ping().await {
        Ok(()) => HttpResponse::Ok().finish(),
        Err(e) => {
            warn!("Health check failed: {}", e);
            HttpResponse::ServiceUnavailable()
                .content_type("text/plain; charset=utf-8")
                .body("store unreachable")
        }
    }
}
