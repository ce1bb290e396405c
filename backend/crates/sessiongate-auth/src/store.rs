use async_trait::async_trait;

use crate::error::LookupError;

/// Read-only access to serialized session records.
///
/// Implementations must be safe to share across request handlers. The
/// decision engine never writes through this trait.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Raw record stored under `key`.
    ///
    /// A missing key must be reported as [`LookupError::NotFound`] so it can
    /// be told apart from transport failures.
    async fn fetch(&self, key: &str) -> Result<Vec<u8>, LookupError>;

    /// Round-trip to the backing store, used by the liveness probe.
    async fn ping(&self) -> Result<(), LookupError>;
}
