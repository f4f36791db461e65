//! Reading claims out of bearer tokens.
//!
//! Tokens are never verified here; the backend does that. The client only
//! peeks at `exp` to avoid sending a token it knows is stale, and at `sub`
//! to name the signed-in user.

use base64::engine::general_purpose::{STANDARD_NO_PAD, URL_SAFE_NO_PAD};
use base64::Engine;
use serde_json::Value;

/// Decodes the payload segment of a `header.payload.signature` token.
///
/// Returns `None` for anything that is not three segments with a base64
/// JSON object in the middle.
#[must_use]
pub fn decode_claims(token: &str) -> Option<serde_json::Map<String, Value>> {
    let mut segments = token.trim().split('.');
    let (_, payload, _) = (segments.next()?, segments.next()?, segments.next()?);
    if segments.next().is_some() || payload.is_empty() {
        return None;
    }

    let payload = payload.trim_end_matches('=');
    let bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .or_else(|_| STANDARD_NO_PAD.decode(payload))
        .ok()?;

    match serde_json::from_slice::<Value>(&bytes).ok()? {
        Value::Object(map) => Some(map),
        _ => None,
    }
}

/// Returns the `exp` claim in seconds since the epoch.
#[must_use]
pub fn expires_at(token: &str) -> Option<f64> {
    decode_claims(token)?.get("exp")?.as_f64()
}

/// Returns true if the token carries an `exp` strictly after `now_secs`.
///
/// A token without a readable expiry counts as invalid.
#[must_use]
pub fn is_unexpired_at(token: &str, now_secs: i64) -> bool {
    expires_at(token).is_some_and(|exp| exp > now_secs as f64)
}

/// [`is_unexpired_at`] against the current wall clock.
#[must_use]
pub fn is_unexpired(token: &str) -> bool {
    is_unexpired_at(token, chrono::Utc::now().timestamp())
}

/// Returns the `sub` claim as text, whether it was encoded as a string or number.
#[must_use]
pub fn subject(token: &str) -> Option<String> {
    match decode_claims(token)?.get("sub")? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
