// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Token decoding tests.
//!
//! Tokens are minted with jsonwebtoken so the decoder is checked against the
//! encoding real issuers use (base64url without padding).

use cognito_session::services::{decode_payload, extract_identity_claims};
use cognito_session::AuthErrorCode;
use serde_json::json;

mod common;
use common::{id_token, make_token, now, TEST_EMAIL};

#[test]
fn test_decode_minted_token() {
    let token = make_token(600, json!({ "token_use": "access", "scope": "aws.cognito.signin.user.admin" }));

    let payload = decode_payload(&token).unwrap();

    assert!(payload.exp > now());
    assert_eq!(payload.get_str("token_use"), Some("access"));
    assert_eq!(payload.get_str("sub"), Some("user-1"));
    assert!(payload.is_live_at(now()));
    assert!(!payload.is_live_at(payload.exp));
}

#[test]
fn test_decode_every_padding_length() {
    // Payload lengths that leave 0, 2 and 3 trailing base64 characters
    for filler in ["", "x", "xx", "xxx"] {
        let token = make_token(60, json!({ "f": filler }));
        let payload = decode_payload(&token).unwrap();
        assert_eq!(payload.get_str("f"), Some(filler));
    }
}

#[test]
fn test_identity_claims_from_id_token() {
    let claims = extract_identity_claims(&id_token(3600, "Ada")).unwrap();

    assert_eq!(claims.email, TEST_EMAIL);
    assert_eq!(claims.given_name, "Ada");
    assert_eq!(claims.family_name, "Lovelace");
    assert!(claims.exp.unwrap() > now());
    assert_eq!(claims.initials(), "AL");
}

#[test]
fn test_identity_claims_missing_names_default_empty() {
    let token = make_token(3600, json!({ "email": TEST_EMAIL }));
    let claims = extract_identity_claims(&token).unwrap();

    assert_eq!(claims.given_name, "");
    assert_eq!(claims.family_name, "");
}

#[test]
fn test_malformed_tokens_rejected() {
    for token in ["", "abc", "a.b", "a..c", "a.!!!.c", "a.bm90IGpzb24.c"] {
        let err = decode_payload(token).unwrap_err();
        assert_eq!(err.code, AuthErrorCode::MalformedToken, "token {:?}", token);
    }
}

#[test]
fn test_payload_without_exp_rejected() {
    // {"sub":"x"}
    let token = "eyJhbGciOiJIUzI1NiJ9.eyJzdWIiOiJ4In0.sig";
    let err = decode_payload(token).unwrap_err();
    assert_eq!(err.code, AuthErrorCode::MalformedToken);
}
