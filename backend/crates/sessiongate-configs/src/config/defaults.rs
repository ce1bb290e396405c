// Default value functions

pub fn default_host() -> String {
    "127.0.0.1".to_string()
}

pub fn default_port() -> u16 {
    8080
}

pub fn default_workers() -> usize {
    0 // 0 = one worker per CPU core
}

pub fn default_keepalive_timeout() -> u64 {
    75
}

pub fn default_client_request_timeout() -> u64 {
    5
}

pub fn default_client_disconnect_timeout() -> u64 {
    2 // 2 seconds for graceful disconnect
}

pub fn default_shutdown_timeout() -> u64 {
    30
}

pub fn default_true() -> bool {
    true
}

pub fn default_log_level() -> String {
    "info".to_string()
}

pub fn default_log_format() -> String {
    "compact".to_string()
}

pub fn default_logs_path() -> String {
    "./logs".to_string() // Normalized to absolute at load time
}

pub fn default_store_url() -> String {
    "redis://127.0.0.1:6379/0".to_string()
}

/// Key layout of the framework's cache session backend: cache key prefix,
/// cache version and the session engine's own prefix.
pub fn default_session_key_format() -> String {
    ":1:django.contrib.sessions.cache{session_id}".to_string()
}

pub fn default_connect_timeout_ms() -> u64 {
    5_000
}

pub fn default_command_timeout_ms() -> u64 {
    1_000
}

pub fn default_client_ip_header() -> String {
    "X-Forwarded-For".to_string()
}

pub fn default_session_cookie_name() -> String {
    "sessionid".to_string()
}

pub fn default_login_url() -> String {
    "/accounts/login/".to_string()
}

pub fn default_login_redirect_param() -> String {
    "next".to_string()
}

pub fn default_trace_id_header() -> String {
    "X-Request-Id".to_string()
}

/// Resolve `workers = 0` to the number of CPU cores.
pub fn effective_workers(configured: usize) -> usize {
    if configured == 0 {
        num_cpus::get()
    } else {
        configured
    }
}
