//! Verify request model

use serde::{Deserialize, Serialize};
use sessiongate_auth::RequestContext;

/// Maximum session id length (real ids are 32 characters)
const MAX_SESSION_ID_LENGTH: usize = 1024;
/// Maximum length of any other descriptive field
const MAX_FIELD_LENGTH: usize = 8192;

/// Body of `POST /verify`
///
/// Every field is optional. Missing fields and JSON `null` become empty
/// strings; unknown fields are ignored.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct VerifyRequest {
    #[serde(default, deserialize_with = "validate_field_length")]
    pub client_ip: String,
    #[serde(default, deserialize_with = "validate_session_id_length")]
    pub session_id: String,
    #[serde(default, deserialize_with = "validate_field_length")]
    pub method: String,
    #[serde(default, deserialize_with = "validate_field_length")]
    pub protocol: String,
    #[serde(default, deserialize_with = "validate_field_length")]
    pub host: String,
    #[serde(default, deserialize_with = "validate_field_length")]
    pub path: String,
    #[serde(default, deserialize_with = "validate_field_length")]
    pub user_agent: String,
    #[serde(default, deserialize_with = "validate_field_length")]
    pub referer: String,
    #[serde(default, deserialize_with = "validate_field_length")]
    pub accept: String,
    #[serde(default, deserialize_with = "validate_field_length")]
    pub trace_id: String,
}

impl From<VerifyRequest> for RequestContext {
    fn from(req: VerifyRequest) -> Self {
        RequestContext {
            client_ip: req.client_ip,
            session_id: req.session_id,
            method: req.method,
            protocol: req.protocol,
            host: req.host,
            path: req.path,
            user_agent: req.user_agent,
            referer: req.referer,
            accept: req.accept,
            trace_id: req.trace_id,
        }
    }
}

pub(crate) fn validate_session_id_length<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = Option::<String>::deserialize(deserializer)?.unwrap_or_default();
    if s.len() > MAX_SESSION_ID_LENGTH {
        return Err(serde::de::Error::custom(format!(
            "session_id exceeds maximum length of {} characters",
            MAX_SESSION_ID_LENGTH
        )));
    }
    Ok(s)
}

pub(crate) fn validate_field_length<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = Option::<String>::deserialize(deserializer)?.unwrap_or_default();
    if s.len() > MAX_FIELD_LENGTH {
        return Err(serde::de::Error::custom(format!(
            "field exceeds maximum length of {} characters",
            MAX_FIELD_LENGTH
        )));
    }
    Ok(s)
}
