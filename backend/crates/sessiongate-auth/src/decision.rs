//! Authorization decision engine.
//!
//! ```text
//! RequestContext ─► empty session id? ──yes──► Deny(NoSessionId)
//!                        │ no
//!                        ▼
//!                  store.fetch(key) ──NotFound──► Deny(StoreMiss)
//!                        │         └─Other─────► Deny(StoreError)
//!                        ▼
//!                     decode ──error──► Deny(DecodeFailure)
//!                        ▼
//!                 extract_identity ──NotAMapping──► Deny(DecodeFailure)
//!                        │         └─IdentityMissing─► Deny(UserFieldMissing)
//!                        ▼
//!                  Allow(SessionIdentity)
//! ```
//!
//! The store lookup is the only await point. Dropping the future returned by
//! [`SessionVerifier::decide`] before the lookup resolves abandons the
//! decision and nothing is decoded.

use std::fmt;
use std::sync::Arc;

use log::{info, warn};
use sessiongate_pickle::{decode_with_limits, DecodeLimits};
use sessiongate_session::{extract_identity, ExtractError, SessionIdentity};

use crate::context::RequestContext;
use crate::error::LookupError;
use crate::key::format_key;
use crate::mask::mask_session_id;
use crate::store::SessionStore;

/// Why a request was denied. Never shown to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DenyReason {
    NoSessionId,
    StoreMiss,
    StoreError,
    DecodeFailure,
    UserFieldMissing,
}

impl DenyReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DenyReason::NoSessionId => "no_session_id",
            DenyReason::StoreMiss => "store_miss",
            DenyReason::StoreError => "store_error",
            DenyReason::DecodeFailure => "decode_failure",
            DenyReason::UserFieldMissing => "user_field_missing",
        }
    }
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a single check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow(SessionIdentity),
    Deny(DenyReason),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow(_))
    }
}

/// Resolves session identifiers against a [`SessionStore`].
///
/// Holds no per-request state; one instance serves every worker.
pub struct SessionVerifier {
    store: Arc<dyn SessionStore>,
    key_template: String,
    limits: DecodeLimits,
}

impl SessionVerifier {
    pub fn new(store: Arc<dyn SessionStore>, key_template: impl Into<String>) -> Self {
        Self {
            store,
            key_template: key_template.into(),
            limits: DecodeLimits::default(),
        }
    }

    pub fn with_limits(mut self, limits: DecodeLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }

    /// Decide whether the request described by `ctx` may proceed.
    pub async fn decide(&self, ctx: &RequestContext) -> Decision {
        info!(
            "Verifying request from {}: {} {} trace_id={} user_agent={:?} referer={:?}",
            ctx.client_ip,
            ctx.method,
            ctx.original_url(),
            ctx.trace_id,
            ctx.user_agent,
            ctx.referer
        );

        let decision = self.resolve(ctx).await;
        match &decision {
            Decision::Allow(identity) => info!(
                "Request authorized for {} ({})",
                identity.user_id(),
                mask_session_id(&ctx.session_id)
            ),
            Decision::Deny(DenyReason::NoSessionId) => info!("Request denied: no session id"),
            Decision::Deny(reason) => info!(
                "Request denied: {} ({})",
                reason,
                mask_session_id(&ctx.session_id)
            ),
        }
        decision
    }

    async fn resolve(&self, ctx: &RequestContext) -> Decision {
        if ctx.session_id.is_empty() {
            return Decision::Deny(DenyReason::NoSessionId);
        }

        let key = format_key(&self.key_template, &ctx.session_id);
        let record = match self.store.fetch(&key).await {
            Ok(record) => record,
            Err(LookupError::NotFound) => return Decision::Deny(DenyReason::StoreMiss),
            Err(err) => {
                warn!(
                    "Failed to get session {} from store: {}",
                    mask_session_id(&ctx.session_id),
                    err
                );
                return Decision::Deny(DenyReason::StoreError);
            },
        };

        let value = match decode_with_limits(&record, &self.limits) {
            Ok(value) => value,
            Err(err) => {
                warn!(
                    "Failed to decode session {} ({}): {}",
                    mask_session_id(&ctx.session_id),
                    err.kind(),
                    err
                );
                return Decision::Deny(DenyReason::DecodeFailure);
            },
        };

        match extract_identity(&value) {
            Ok(identity) => Decision::Allow(identity),
            Err(err) => {
                warn!(
                    "Failed to read identity from session {}: {}",
                    mask_session_id(&ctx.session_id),
                    err
                );
                match err {
                    ExtractError::IdentityMissing { .. } => {
                        Decision::Deny(DenyReason::UserFieldMissing)
                    },
                    ExtractError::NotAMapping { .. } => Decision::Deny(DenyReason::DecodeFailure),
                }
            },
        }
    }
}
