use thiserror::Error;

/// Failure of a session store lookup.
///
/// The decision engine only distinguishes "no such key" from everything
/// else; the message is kept for logging.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("session not found")]
    NotFound,

    #[error("session store error: {0}")]
    Other(String),
}

impl LookupError {
    pub fn other(message: impl Into<String>) -> Self {
        LookupError::Other(message.into())
    }
}
