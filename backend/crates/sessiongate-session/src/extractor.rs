//! Identity extraction from a decoded session record.

use log::debug;
use sessiongate_pickle::DecodedValue;

use crate::error::{ExtractError, ExtractResult};
use crate::identity::SessionIdentity;

/// Key holding the authenticated user's primary key.
pub const AUTH_USER_ID_KEY: &str = "_auth_user_id";

/// Key holding the dotted path of the backend that authenticated the user.
pub const AUTH_USER_BACKEND_KEY: &str = "_auth_user_backend";

/// Key holding the session verification hash.
pub const AUTH_USER_HASH_KEY: &str = "_auth_user_hash";

/// Build a [`SessionIdentity`] from a decoded record.
///
/// Keys are matched as exact text. Text values are used as-is and byte
/// values are decoded as UTF-8 with invalid sequences replaced. Values of
/// any other type count as absent. A user id that is absent or empty is
/// reported as [`ExtractError::IdentityMissing`].
pub fn extract_identity(record: &DecodedValue) -> ExtractResult<SessionIdentity> {
    if record.as_mapping().is_none() {
        return Err(ExtractError::NotAMapping {
            found: record.kind(),
        });
    }

    let user_id = field(record, AUTH_USER_ID_KEY);
    if user_id.is_empty() {
        return Err(ExtractError::IdentityMissing {
            key: AUTH_USER_ID_KEY,
        });
    }

    Ok(SessionIdentity::new(
        user_id,
        field(record, AUTH_USER_BACKEND_KEY),
        field(record, AUTH_USER_HASH_KEY),
    ))
}

fn field(record: &DecodedValue, key: &str) -> String {
    match record.get(key) {
        Some(DecodedValue::Text(text)) => text.clone(),
        Some(DecodedValue::Bytes(bytes)) => String::from_utf8_lossy(bytes).into_owned(),
        Some(other) => {
            debug!("Ignoring session field {} of type {}", key, other.kind());
            String::new()
        },
        None => String::new(),
    }
}
