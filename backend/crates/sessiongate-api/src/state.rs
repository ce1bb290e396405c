//! Shared handler state.

use std::sync::Arc;

use sessiongate_auth::{DenialRenderer, SessionStore, SessionVerifier};
use sessiongate_configs::{AuthSettings, ServerConfig};

/// Everything the check handlers need, built once and shared by all workers.
pub struct GateState {
    pub verifier: SessionVerifier,
    pub renderer: DenialRenderer,
    pub auth: AuthSettings,
}

impl GateState {
    pub fn new(verifier: SessionVerifier, renderer: DenialRenderer, auth: AuthSettings) -> Self {
        Self {
            verifier,
            renderer,
            auth,
        }
    }

    /// Wire a verifier and renderer over `store` from the loaded configuration.
    pub fn from_config(store: Arc<dyn SessionStore>, config: &ServerConfig) -> Self {
        let verifier = SessionVerifier::new(store, config.store.session_key_format.clone())
            .with_limits(config.decoder.clone());
        let renderer = DenialRenderer::new(
            config.auth.login_url.clone(),
            config.auth.login_redirect_param.clone(),
        );
        Self::new(verifier, renderer, config.auth.clone())
    }
}
