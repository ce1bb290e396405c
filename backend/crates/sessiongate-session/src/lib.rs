//! # sessiongate-session
//!
//! Typed view of the authenticated identity stored in a session record.
//!
//! - [`SessionIdentity`]: user id, authentication backend and password hash
//!   fingerprint as written by the upstream web framework at login
//! - [`extract_identity`]: pulls those fields out of a decoded record
//!
//! The record keys are fixed by the framework that writes them
//! (`_auth_user_id`, `_auth_user_backend`, `_auth_user_hash`).

pub mod error;
pub mod extractor;
pub mod identity;

pub use error::{ExtractError, ExtractResult};
pub use extractor::{extract_identity, AUTH_USER_BACKEND_KEY, AUTH_USER_HASH_KEY, AUTH_USER_ID_KEY};
pub use identity::SessionIdentity;
