//! Reads the `exp` claim out of a bearer JWT. The signature is the server's
//! business; the client only needs to know whether the token is still live.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token is not a three-part JWT")]
    Malformed,

    #[error("token payload is not base64url: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("token payload is not JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("token has no numeric exp claim")]
    MissingExp,
}

/// Expiry timestamp carried by the token.
pub fn decode_expiry(token: &str) -> Result<DateTime<Utc>, TokenError> {
    let mut parts = token.split('.');
    let (Some(_header), Some(payload), Some(_sig), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(TokenError::Malformed);
    };

    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('='))?;
    let claims: Value = serde_json::from_slice(&bytes)?;
    let exp = claims
        .get("exp")
        .and_then(Value::as_f64)
        .ok_or(TokenError::MissingExp)?;

    DateTime::from_timestamp(exp.floor() as i64, 0).ok_or(TokenError::MissingExp)
}

/// A token is expired once its `exp` is strictly before `now`.
pub fn is_expired(token: &str, now: DateTime<Utc>) -> Result<bool, TokenError> {
    Ok(decode_expiry(token)? < now)
}

/// Builds an unsigned token carrying `claims`, for tests.
#[cfg(test)]
pub(crate) fn unsigned_token(claims: &Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{header}.{payload}.c2lnbmF0dXJl")
}
