use super::types::ServerConfig;
use crate::file_helpers::normalize_dir_path;
use std::fs;
use std::path::Path;

/// Environment variable naming the config file.
pub const ENV_CONFIG_PATH: &str = "SESSIONGATE_CONFIG";

const VALID_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];
const VALID_FORMATS: [&str; 2] = ["compact", "json"];
const SESSION_ID_PLACEHOLDER: &str = "{session_id}";
/// Materialization recurses once per nesting level on a worker thread.
pub const MAX_DECODER_DEPTH: usize = 512;

impl ServerConfig {
    /// Load configuration from a TOML file
    ///
    /// Environment overrides are applied on top of the file, then the result
    /// is normalized and validated.
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            anyhow::anyhow!("Failed to read config file {}: {}", path.as_ref().display(), e)
        })?;

        let mut config = Self::from_toml_str(&content)?;
        config.apply_env_overrides()?;
        config.finalize()?;

        Ok(config)
    }

    /// Parse without touching the environment or validating.
    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        toml::from_str(content).map_err(|e| anyhow::anyhow!("Failed to parse config file: {}", e))
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - SESSIONGATE_SERVER_HOST: Override server.host
    /// - SESSIONGATE_SERVER_PORT: Override server.port
    /// - SESSIONGATE_LOG_LEVEL: Override logging.level
    /// - SESSIONGATE_STORE_URL: Override store.url
    ///
    /// Environment variables take precedence over config.toml values
    pub fn apply_env_overrides(&mut self) -> anyhow::Result<()> {
        use std::env;

        if let Ok(host) = env::var("SESSIONGATE_SERVER_HOST") {
            self.server.host = host;
        }

        if let Ok(port_str) = env::var("SESSIONGATE_SERVER_PORT") {
            self.server.port = port_str.parse().map_err(|_| {
                anyhow::anyhow!("Invalid SESSIONGATE_SERVER_PORT value: {}", port_str)
            })?;
        }

        if let Ok(level) = env::var("SESSIONGATE_LOG_LEVEL") {
            self.logging.level = level.to_lowercase();
        }

        if let Ok(url) = env::var("SESSIONGATE_STORE_URL") {
            self.store.url = url;
        }

        Ok(())
    }

    /// Normalize local filesystem paths and validate configuration.
    ///
    /// Call this after applying environment overrides.
    pub fn finalize(&mut self) -> anyhow::Result<()> {
        self.logging.logs_path = normalize_dir_path(&self.logging.logs_path);
        self.validate()
    }

    /// Validate configuration settings
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.server.port == 0 {
            return Err(anyhow::anyhow!("Server port cannot be 0"));
        }

        if self.server.host.trim().is_empty() {
            return Err(anyhow::anyhow!("Server host cannot be empty"));
        }

        if !VALID_LEVELS.contains(&self.logging.level.as_str()) {
            return Err(anyhow::anyhow!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                VALID_LEVELS.join(", ")
            ));
        }

        if !VALID_FORMATS.contains(&self.logging.format.as_str()) {
            return Err(anyhow::anyhow!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                VALID_FORMATS.join(", ")
            ));
        }

        for (target, level) in &self.logging.targets {
            if !VALID_LEVELS.contains(&level.as_str()) {
                return Err(anyhow::anyhow!(
                    "Invalid log level '{}' for target '{}'. Must be one of: {}",
                    level,
                    target,
                    VALID_LEVELS.join(", ")
                ));
            }
        }

        if self.store.url.trim().is_empty() {
            return Err(anyhow::anyhow!("store.url cannot be empty"));
        }

        let placeholders = self.store.session_key_format.matches(SESSION_ID_PLACEHOLDER).count();
        if placeholders != 1 {
            return Err(anyhow::anyhow!(
                "store.session_key_format must contain {} exactly once (found {})",
                SESSION_ID_PLACEHOLDER,
                placeholders
            ));
        }

        if self.store.connect_timeout_ms == 0 || self.store.command_timeout_ms == 0 {
            return Err(anyhow::anyhow!("store timeouts cannot be 0"));
        }

        if self.auth.session_cookie_name.trim().is_empty() {
            return Err(anyhow::anyhow!("auth.session_cookie_name cannot be empty"));
        }

        if self.auth.client_ip_header.trim().is_empty() {
            return Err(anyhow::anyhow!("auth.client_ip_header cannot be empty"));
        }

        if self.auth.login_redirect_param.trim().is_empty() {
            return Err(anyhow::anyhow!("auth.login_redirect_param cannot be empty"));
        }

        if self.auth.verify_methods.is_empty() {
            return Err(anyhow::anyhow!(
                "auth.verify_methods must enable at least one of: body, forward_auth"
            ));
        }

        for (kind, max) in self.decoder.entries() {
            if max == 0 {
                return Err(anyhow::anyhow!("decoder.{} cannot be 0", kind));
            }
        }

        if self.decoder.max_depth > MAX_DECODER_DEPTH {
            return Err(anyhow::anyhow!(
                "decoder.max_depth cannot exceed {} (got {})",
                MAX_DECODER_DEPTH,
                self.decoder.max_depth
            ));
        }

        Ok(())
    }
}
