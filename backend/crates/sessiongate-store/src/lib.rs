//! Session store backends.
//!
//! - [`RedisSessionStore`]: the production backend, reading records the
//!   upstream framework's cache backend wrote
//! - [`MemorySessionStore`]: in-process map for tests and local runs

pub mod error;
pub mod memory;
pub mod redis_store;

pub use error::{StoreError, StoreResult};
pub use memory::MemorySessionStore;
pub use redis_store::{RedisSessionStore, RedisStoreOptions};
