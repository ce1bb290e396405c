// SessionGate authorization core
// Turns a request's session identifier into an Allow or Deny decision and
// renders the denial page or body.

pub mod context;
pub mod decision;
pub mod error;
pub mod key;
pub mod mask;
pub mod render;
pub mod store;

pub use context::RequestContext;
pub use decision::{Decision, DenyReason, SessionVerifier};
pub use error::LookupError;
pub use key::{format_key, format_key_with, SESSION_ID_PLACEHOLDER};
pub use mask::mask_session_id;
pub use render::{DenialRenderer, DenialResponse};
pub use store::SessionStore;
