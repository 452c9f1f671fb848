//! Bearer token expiry.
//!
//! Tokens are JWT-shaped: `header.payload.signature`, with a base64url JSON
//! payload carrying a numeric `exp` in seconds since the epoch. The
//! signature is not verified here; the product API does that. Anything that
//! does not yield an `exp` counts as already expired.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use serde::Deserialize;

#[derive(Deserialize)]
struct Claims {
    exp: Option<i64>,
}

/// When `token` expires, or `None` if it cannot be decoded.
#[must_use]
pub fn expires_at(token: &str) -> Option<DateTime<Utc>> {
    let mut segments = token.split('.');
    let (Some(_header), Some(payload), Some(_signature), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return None;
    };

    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .ok()?;
    let claims: Claims = serde_json::from_slice(&bytes).ok()?;
    DateTime::from_timestamp(claims.exp?, 0)
}

/// Whether `token` is expired at `now`. Expiry is inclusive: a token whose
/// `exp` equals `now` is expired.
#[must_use]
pub fn is_expired(token: &str, now: DateTime<Utc>) -> bool {
    expires_at(token).is_none_or(|exp| now >= exp)
}
