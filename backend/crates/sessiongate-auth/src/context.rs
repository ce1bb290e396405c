//! Per-request input to the decision engine.

/// What the gateway told us about the request being authorized.
///
/// Every field may be empty. An empty `session_id` means the caller sent no
/// session at all and always yields a denial without touching the store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    pub client_ip: String,
    pub session_id: String,
    pub method: String,
    /// URL scheme of the original request (`http` / `https`).
    pub protocol: String,
    pub host: String,
    /// Path and query of the original request.
    pub path: String,
    pub user_agent: String,
    pub referer: String,
    pub accept: String,
    pub trace_id: String,
}

impl RequestContext {
    /// Absolute URL of the original request, used as the post-login target.
    pub fn original_url(&self) -> String {
        format!("{}://{}{}", self.protocol, self.host, self.path)
    }

    /// Whether the caller prefers an HTML page over JSON.
    pub fn wants_html(&self) -> bool {
        self.accept.contains("text/html")
    }
}
