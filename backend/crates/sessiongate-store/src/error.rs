use thiserror::Error;

pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised while setting up a store backend.
///
/// Per-request failures are reported as `LookupError` instead.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid store url: {0}")]
    InvalidUrl(String),

    #[error("failed to connect to session store: {0}")]
    Connect(String),

    #[error("timed out connecting to session store after {0} ms")]
    ConnectTimeout(u64),
}
