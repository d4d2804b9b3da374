//! Campaign ⇄ token conversion.
//!
//! A token is `percent_escape(base64(json(campaign)))`. The base64 alphabet
//! includes `+`, `/` and `=`, which are escaped so the token survives being
//! pasted into chat clients and mail bodies that rewrite URL fragments.
//!
//! Links shared by the earlier web app used `base64(percent_escape(json))`
//! with the base64 characters left raw; those still decode.

use std::string::FromUtf8Error;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use thiserror::Error;
use tracing::debug;

use crate::model::Campaign;

/// Why a token could not be turned back into a campaign.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("token is empty")]
    Empty,

    #[error("token percent-escaping is invalid: {0}")]
    Percent(#[source] FromUtf8Error),

    #[error("token is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("decoded token is not UTF-8: {0}")]
    Utf8(#[source] FromUtf8Error),

    #[error("decoded token is not a campaign: {0}")]
    Json(#[from] serde_json::Error),
}

/// Encode a campaign into a URL-fragment-safe token.
///
/// Deterministic: serde emits struct fields in declaration order.
pub fn encode(campaign: &Campaign) -> String {
    // Serializing plain strings and vectors into a String cannot fail.
    let json = serde_json::to_string(campaign).unwrap_or_default();
    let b64 = STANDARD.encode(json.as_bytes());
    let token = urlencoding::encode(&b64).into_owned();

    debug!(
        targets = campaign.mps.len(),
        json_length = json.len(),
        token_length = token.len(),
        "campaign_encoded"
    );

    token
}

/// Decode a token produced by [`encode`] (or by the legacy web app).
pub fn decode(token: &str) -> Result<Campaign, DecodeError> {
    if token.is_empty() {
        return Err(DecodeError::Empty);
    }

    let b64 = urlencoding::decode(token).map_err(DecodeError::Percent)?;
    let bytes = STANDARD.decode(b64.as_bytes())?;
    let text = String::from_utf8(bytes).map_err(DecodeError::Utf8)?;

    // A JSON campaign always starts with `{`; a leading `%` means the legacy
    // layout where the JSON was escaped before base64.
    let campaign = if text.starts_with('%') {
        let json = urlencoding::decode(&text).map_err(DecodeError::Percent)?;
        serde_json::from_str(&json)?
    } else {
        serde_json::from_str(&text)?
    };

    Ok(campaign)
}
