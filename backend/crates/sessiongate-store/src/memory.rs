use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use sessiongate_auth::{LookupError, SessionStore};

/// Map-backed store.
///
/// Lookups never fail except with [`LookupError::NotFound`].
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    records: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, key: impl Into<String>, record: impl Into<Vec<u8>>) {
        self.records.write().insert(key.into(), record.into());
    }

    pub fn remove(&self, key: &str) -> Option<Vec<u8>> {
        self.records.write().remove(key)
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn fetch(&self, key: &str) -> Result<Vec<u8>, LookupError> {
        self.records
            .read()
            .get(key)
            .cloned()
            .ok_or(LookupError::NotFound)
    }

    async fn ping(&self) -> Result<(), LookupError> {
        Ok(())
    }
}
