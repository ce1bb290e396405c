//! Store key construction.

/// Placeholder replaced by the session identifier in key templates.
pub const SESSION_ID_PLACEHOLDER: &str = "{session_id}";

/// Build the store key for `session_id` from `template`.
///
/// Only the first `{session_id}` is replaced. A template without the
/// placeholder is returned unchanged. The identifier is inserted raw.
pub fn format_key(template: &str, session_id: &str) -> String {
    format_key_with(template, SESSION_ID_PLACEHOLDER, session_id)
}

/// [`format_key`] with a caller-chosen placeholder token.
pub fn format_key_with(template: &str, placeholder: &str, session_id: &str) -> String {
    template.replacen(placeholder, session_id, 1)
}
