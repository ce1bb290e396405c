/// Identity of the user a session belongs to.
///
/// Only [`crate::extract_identity`] builds one, and it guarantees `user_id`
/// is non-empty. The optional fields are empty strings when the record did
/// not carry them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionIdentity {
    user_id: String,
    auth_backend: String,
    user_hash: String,
}

impl SessionIdentity {
    pub(crate) fn new(user_id: String, auth_backend: String, user_hash: String) -> Self {
        debug_assert!(!user_id.is_empty());
        Self {
            user_id,
            auth_backend,
            user_hash,
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Dotted path of the authentication backend, empty if unknown.
    pub fn auth_backend(&self) -> &str {
        &self.auth_backend
    }

    /// Session hash derived from the user's password, empty if unknown.
    pub fn user_hash(&self) -> &str {
        &self.user_hash
    }
}
