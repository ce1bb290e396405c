//! HTTP handlers
//!
//! ## Endpoints
//! - POST /verify - check a request described in a JSON body
//! - ANY /forward-auth - check a request described by proxy headers
//! - GET /health - store reachability probe
//!
//! Both check endpoints answer 200 on Allow and a rendered 401 on Deny.

mod forward_auth;
mod health;
mod response;
mod verify;

pub use forward_auth::forward_auth_handler;
pub use health::health_handler;
pub use verify::{method_not_allowed, verify_handler, verify_json_config};

pub use response::USER_ID_HEADER;
