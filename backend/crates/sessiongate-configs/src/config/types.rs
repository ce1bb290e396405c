use super::defaults::*;
use serde::{Deserialize, Serialize};
use sessiongate_pickle::DecodeLimits;
use std::collections::HashMap;
use std::time::Duration;

/// Main server configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
    #[serde(default)]
    pub store: StoreSettings,
    #[serde(default)]
    pub auth: AuthSettings,
    /// Resource ceilings for decoding session records
    #[serde(default)]
    pub decoder: DecodeLimits,
}

/// HTTP listener settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Worker threads (default: 0 = one per CPU core)
    #[serde(default = "default_workers")]
    pub workers: usize,
    /// Keep-alive timeout in seconds (default: 75)
    #[serde(default = "default_keepalive_timeout")]
    pub keepalive_timeout: u64,
    /// Time allowed for a client to send request headers, in seconds (default: 5)
    #[serde(default = "default_client_request_timeout")]
    pub client_request_timeout: u64,
    /// Client disconnect timeout in seconds (default: 2)
    #[serde(default = "default_client_disconnect_timeout")]
    pub client_disconnect_timeout: u64,
    /// Grace period for in-flight requests on shutdown, in seconds (default: 30)
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: default_workers(),
            keepalive_timeout: default_keepalive_timeout(),
            client_request_timeout: default_client_request_timeout(),
            client_disconnect_timeout: default_client_disconnect_timeout(),
            shutdown_timeout: default_shutdown_timeout(),
        }
    }
}

impl ServerSettings {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Directory for log files (default: "./logs")
    #[serde(default = "default_logs_path")]
    pub logs_path: String,
    /// Also write `server.log` under `logs_path` (default: false)
    #[serde(default)]
    pub log_to_file: bool,
    #[serde(default = "default_true")]
    pub log_to_console: bool,
    /// "compact" or "json"
    #[serde(default = "default_log_format")]
    pub format: String,
    /// Optional per-target log level overrides
    /// Configure via a TOML table:
    /// [logging.targets]
    /// sessiongate_auth = "debug"
    /// redis = "info"
    #[serde(default)]
    pub targets: HashMap<String, String>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            logs_path: default_logs_path(),
            log_to_file: false,
            log_to_console: true,
            format: default_log_format(),
            targets: HashMap::new(),
        }
    }
}

/// Session store connection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSettings {
    /// redis://[:password@]host:port/db
    #[serde(default = "default_store_url")]
    pub url: String,
    /// Lookup key template, must contain `{session_id}` exactly once
    #[serde(default = "default_session_key_format")]
    pub session_key_format: String,
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    /// Upper bound on a single store command (default: 1000ms)
    #[serde(default = "default_command_timeout_ms")]
    pub command_timeout_ms: u64,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            url: default_store_url(),
            session_key_format: default_session_key_format(),
            connect_timeout_ms: default_connect_timeout_ms(),
            command_timeout_ms: default_command_timeout_ms(),
        }
    }
}

impl StoreSettings {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_millis(self.command_timeout_ms)
    }
}

/// Which check endpoints are mounted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerifyMethod {
    /// `POST /verify` with a JSON description of the request
    Body,
    /// `/forward-auth` reading `X-Forwarded-*` headers and the session cookie
    ForwardAuth,
}

fn default_verify_methods() -> Vec<VerifyMethod> {
    vec![VerifyMethod::Body, VerifyMethod::ForwardAuth]
}

/// Request interpretation and denial rendering
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSettings {
    /// Header carrying the original client address (default: "X-Forwarded-For")
    #[serde(default = "default_client_ip_header")]
    pub client_ip_header: String,
    #[serde(default = "default_session_cookie_name")]
    pub session_cookie_name: String,
    /// Sign-in page for browsers; empty makes the sign-in link relative to the denied page
    #[serde(default = "default_login_url")]
    pub login_url: String,
    #[serde(default = "default_login_redirect_param")]
    pub login_redirect_param: String,
    #[serde(default = "default_trace_id_header")]
    pub trace_id_header: String,
    #[serde(default = "default_verify_methods")]
    pub verify_methods: Vec<VerifyMethod>,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            client_ip_header: default_client_ip_header(),
            session_cookie_name: default_session_cookie_name(),
            login_url: default_login_url(),
            login_redirect_param: default_login_redirect_param(),
            trace_id_header: default_trace_id_header(),
            verify_methods: default_verify_methods(),
        }
    }
}

impl AuthSettings {
    pub fn is_enabled(&self, method: VerifyMethod) -> bool {
        self.verify_methods.contains(&method)
    }
}
