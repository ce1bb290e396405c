//! Redis-backed session store.

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info};
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use sessiongate_auth::{LookupError, SessionStore};

use crate::error::{StoreError, StoreResult};

/// Connection settings for [`RedisSessionStore`].
#[derive(Debug, Clone)]
pub struct RedisStoreOptions {
    /// `redis://[:password@]host:port/db`
    pub url: String,
    pub connect_timeout: Duration,
    /// Upper bound on a single `GET` or `PING`.
    pub command_timeout: Duration,
}

/// Reads session records with `GET`.
///
/// Uses a multiplexed [`ConnectionManager`], which reconnects on its own
/// after transport errors. Cloning the manager is cheap and every request
/// works on its own clone.
pub struct RedisSessionStore {
    manager: ConnectionManager,
    command_timeout: Duration,
}

impl RedisSessionStore {
    /// Connect and verify the server answers `PING`.
    pub async fn connect(options: &RedisStoreOptions) -> StoreResult<Self> {
        let client = redis::Client::open(options.url.as_str())
            .map_err(|e| StoreError::InvalidUrl(e.to_string()))?;

        let connect_ms = options.connect_timeout.as_millis() as u64;
        let manager = tokio::time::timeout(options.connect_timeout, ConnectionManager::new(client))
            .await
            .map_err(|_| StoreError::ConnectTimeout(connect_ms))?
            .map_err(|e| StoreError::Connect(e.to_string()))?;

        let store = Self {
            manager,
            command_timeout: options.command_timeout,
        };
        store.ping().await.map_err(|e| StoreError::Connect(e.to_string()))?;

        info!("Connected to session store at {}", redact_url(&options.url));
        Ok(store)
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn fetch(&self, key: &str) -> Result<Vec<u8>, LookupError> {
        let mut conn = self.manager.clone();
        let record: Option<Vec<u8>> = tokio::time::timeout(self.command_timeout, conn.get(key))
            .await
            .map_err(|_| LookupError::other("GET timed out"))?
            .map_err(|e| LookupError::other(e.to_string()))?;

        match record {
            Some(record) => {
                debug!("Fetched session record ({} bytes)", record.len());
                Ok(record)
            },
            None => Err(LookupError::NotFound),
        }
    }

    async fn ping(&self) -> Result<(), LookupError> {
        let mut conn = self.manager.clone();
        let reply: String = tokio::time::timeout(
            self.command_timeout,
            redis::cmd("PING").query_async::<_, String>(&mut conn),
        )
        .await
        .map_err(|_| LookupError::other("PING timed out"))?
        .map_err(|e| LookupError::other(e.to_string()))?;

        if reply.eq_ignore_ascii_case("PONG") {
            Ok(())
        } else {
            Err(LookupError::other(format!("unexpected PING reply: {reply}")))
        }
    }
}

/// Hide the password part of a redis URL.
fn redact_url(url: &str) -> String {
    match (url.find("://"), url.rfind('@')) {
        (Some(scheme_end), Some(at)) if at > scheme_end => {
            format!("{}://****{}", &url[..scheme_end], &url[at..])
        },
        _ => url.to_string(),
    }
}
