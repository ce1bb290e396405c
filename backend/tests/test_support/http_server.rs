use anyhow::Result;
use sessiongate_configs::ServerConfig;
use sessiongate_server::lifecycle::{run_for_tests, ApplicationComponents, RunningTestHttpServer};
use sessiongate_store::MemorySessionStore;
use std::sync::Arc;

/// A near-production HTTP server instance for tests.
///
/// Uses the real `run_for_tests()` wiring over an in-memory session store
/// the test can seed.
pub struct HttpTestServer {
    pub base_url: String,
    pub config: ServerConfig,
    pub store: Arc<MemorySessionStore>,
    running: RunningTestHttpServer,
}

impl HttpTestServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Store `record` under the key the gate derives from `session_id`.
    pub fn seed(&self, session_id: &str, record: &[u8]) {
        let key = sessiongate_auth::format_key(&self.config.store.session_key_format, session_id);
        self.store.insert(key, record.to_vec());
    }

    pub async fn shutdown(self) {
        self.running.shutdown().await;
    }
}

pub fn test_config() -> ServerConfig {
    let mut config = ServerConfig::default();
    config.server.host = "127.0.0.1".to_string();
    config.server.port = 0;
    config.auth.login_url = "https://sso.example.com/login".to_string();
    config
}

/// Start a server with the default test configuration.
pub async fn start_http_test_server() -> Result<HttpTestServer> {
    start_http_test_server_with(test_config()).await
}

pub async fn start_http_test_server_with(config: ServerConfig) -> Result<HttpTestServer> {
    let store = Arc::new(MemorySessionStore::new());
    let components = ApplicationComponents::new(store.clone(), &config);
    let running = run_for_tests(&config, components).await?;
    let base_url = running.base_url.clone();

    Ok(HttpTestServer {
        base_url,
        config,
        store,
        running,
    })
}
