// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use cognito_session::error::StoreError;
use cognito_session::services::{IdpError, IdpErrorKind};
use cognito_session::{AuthError, AuthErrorCode, Error, ValidationError};

#[test]
fn test_provider_errors_keep_known_codes() {
    let err: AuthError =
        IdpError::service(IdpErrorKind::UserNotConfirmed, "User is not confirmed.").into();
    assert_eq!(err.code, AuthErrorCode::UserNotConfirmed);
    assert_eq!(err.code.as_str(), "UserNotConfirmedException");
    assert_eq!(err.message, "User is not confirmed.");

    let err: AuthError =
        IdpError::service(IdpErrorKind::InvalidPassword, "Password too short").into();
    assert_eq!(err.code.as_str(), "InvalidPasswordException");
}

#[test]
fn test_other_provider_errors_pass_through_by_name() {
    let err: AuthError = IdpError::service(IdpErrorKind::CodeMismatch, "Bad code").into();
    assert_eq!(
        err.code,
        AuthErrorCode::Provider("CodeMismatchException".to_string())
    );

    let err: AuthError =
        IdpError::service(IdpErrorKind::from_type("BrandNewException"), "?").into();
    assert_eq!(err.code.as_str(), "BrandNewException");
}

#[test]
fn test_transport_errors_are_network_errors() {
    let err: AuthError = IdpError::Transport("connection refused".to_string()).into();
    assert_eq!(err.code, AuthErrorCode::Network);
    assert!(!err.requires_login());
}

#[test]
fn test_store_errors_are_storage_errors() {
    let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
    let err: AuthError = StoreError::from(io).into();
    assert_eq!(err.code, AuthErrorCode::Storage);
    assert_eq!(err.code.as_str(), "StorageError");
    assert!(err.message.contains("read-only"));
}

#[test]
fn test_requires_login() {
    assert!(AuthError::no_refresh_token().requires_login());
    assert!(AuthError::no_access_token().requires_login());
    assert!(AuthError::new(AuthErrorCode::SessionExpired, "expired").requires_login());

    assert!(!AuthError::new(AuthErrorCode::InvalidCredentials, "bad").requires_login());
    assert!(!AuthError::new(AuthErrorCode::IncompleteRefreshResult, "x").requires_login());
}

#[test]
fn test_local_preconditions() {
    assert!(AuthError::no_access_token().is_local_precondition());
    assert!(AuthError::no_refresh_token().is_local_precondition());
    assert!(!AuthError::new(AuthErrorCode::SessionExpired, "x").is_local_precondition());
}

#[test]
fn test_display_includes_code() {
    let err = AuthError::no_refresh_token();
    assert_eq!(err.to_string(), "No refresh token found (NoRefreshToken)");

    let err: Error = ValidationError::new("Invalid email").into();
    assert_eq!(err.to_string(), "Validation failed: Invalid email");

    let err: Error = AuthError::no_access_token().into();
    assert_eq!(err.to_string(), "No access token found (NoAccessToken)");
}
