//! Server-wide middleware constructors.
//!
//! Applied in order:
//! 1. **DefaultHeaders**: marks every check response as uncacheable
//! 2. **Logger**: request/response logging

use actix_web::http::header;
use actix_web::middleware;

/// Access log line per request.
///
/// The default format records the request line, status and timing. Cookies
/// and request bodies never appear in it.
pub fn request_logger() -> middleware::Logger {
    middleware::Logger::default()
}

/// Keep gateways and browsers from caching an Allow or Deny.
pub fn default_headers() -> middleware::DefaultHeaders {
    middleware::DefaultHeaders::new().add((header::CACHE_CONTROL, "no-store"))
}
