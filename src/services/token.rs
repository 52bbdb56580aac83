// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Decode-only access to token payloads.
//!
//! Nothing here verifies a signature, issuer or audience. The results are
//! good for expiry checks and display; the API re-validates the raw token on
//! every call and is the only place trust decisions are made.

use crate::error::{AuthError, AuthErrorCode};
use crate::models::IdentityClaims;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;

/// Claims of interest from a token payload, plus everything else.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenPayload {
    /// Expiry (epoch seconds)
    pub exp: i64,
    #[serde(flatten)]
    pub extra: BTreeMap<String, JsonValue>,
}

impl TokenPayload {
    /// String claim by name.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.extra.get(key).and_then(|v| v.as_str())
    }

    /// True iff the token expires strictly after `now` (epoch seconds).
    pub fn is_live_at(&self, now: i64) -> bool {
        self.exp > now
    }
}

fn malformed(msg: impl Into<String>) -> AuthError {
    AuthError::new(AuthErrorCode::MalformedToken, msg)
}

/// Decode the payload (middle) segment of a three-part token.
pub fn decode_payload(token: &str) -> Result<TokenPayload, AuthError> {
    let mut parts = token.split('.');
    let payload = match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(_), Some(payload), Some(_), None) if !payload.is_empty() => payload,
        _ => return Err(malformed("token must have three non-empty segments")),
    };

    // URL-safe alphabet back to standard, then restore padding.
    let mut b64: String = payload
        .chars()
        .map(|c| match c {
            '-' => '+',
            '_' => '/',
            c => c,
        })
        .collect();
    while b64.len() % 4 != 0 {
        b64.push('=');
    }

    let bytes = STANDARD
        .decode(b64.as_bytes())
        .map_err(|e| malformed(format!("invalid payload encoding: {}", e)))?;

    serde_json::from_slice(&bytes).map_err(|e| malformed(format!("invalid payload: {}", e)))
}

/// Display claims from an identity token.
pub fn extract_identity_claims(id_token: &str) -> Result<IdentityClaims, AuthError> {
    let payload = decode_payload(id_token)?;
    let field = |name: &str| payload.get_str(name).unwrap_or_default().to_string();

    Ok(IdentityClaims {
        email: field("email"),
        given_name: field("given_name"),
        family_name: field("family_name"),
        exp: Some(payload.exp),
        extra: BTreeMap::new(),
    })
}
