use thiserror::Error;

pub type ExtractResult<T> = Result<T, ExtractError>;

/// Why a decoded record did not yield an identity.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    /// The record decoded to something other than a mapping.
    #[error("session record is a {found}, expected a mapping")]
    NotAMapping { found: &'static str },

    /// The mapping has no usable user id.
    #[error("session record has no usable `{key}`")]
    IdentityMissing { key: &'static str },
}
