// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session error types with stable, machine-readable codes.

use crate::services::idp::{IdpError, IdpErrorKind};
use std::fmt;

/// Stable error codes surfaced to callers.
///
/// UI code branches on these instead of on provider exception names.
/// `as_str()` values are part of the public contract and must not change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthErrorCode {
    UserNotConfirmed,
    InvalidCredentials,
    /// New password violates the provider's password policy.
    InvalidPassword,
    /// Old password rejected during a password change.
    IncorrectPassword,
    /// Refresh token rejected (expired or revoked); log in again.
    SessionExpired,
    IncompleteAuthResult,
    IncompleteRefreshResult,
    NoAccessToken,
    NoRefreshToken,
    MalformedToken,
    GetAttributesFailed,
    Storage,
    Network,
    /// Any other provider exception, carried by name.
    Provider(String),
}

impl AuthErrorCode {
    pub fn as_str(&self) -> &str {
        match self {
            AuthErrorCode::UserNotConfirmed => "UserNotConfirmedException",
            AuthErrorCode::InvalidCredentials => "InvalidCredentials",
            AuthErrorCode::InvalidPassword => "InvalidPasswordException",
            AuthErrorCode::IncorrectPassword => "IncorrectPassword",
            AuthErrorCode::SessionExpired => "SessionExpired",
            AuthErrorCode::IncompleteAuthResult => "IncompleteAuthResult",
            AuthErrorCode::IncompleteRefreshResult => "IncompleteRefreshResult",
            AuthErrorCode::NoAccessToken => "NoAccessToken",
            AuthErrorCode::NoRefreshToken => "NoRefreshToken",
            AuthErrorCode::MalformedToken => "MalformedToken",
            AuthErrorCode::GetAttributesFailed => "GetAttributesFailed",
            AuthErrorCode::Storage => "StorageError",
            AuthErrorCode::Network => "NetworkError",
            AuthErrorCode::Provider(name) => name,
        }
    }
}

impl fmt::Display for AuthErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error from the identity provider boundary or a violated local precondition.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message} ({code})")]
pub struct AuthError {
    pub code: AuthErrorCode,
    pub message: String,
}

impl AuthError {
    pub fn new(code: AuthErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn no_access_token() -> Self {
        Self::new(AuthErrorCode::NoAccessToken, "No access token found")
    }

    pub fn no_refresh_token() -> Self {
        Self::new(AuthErrorCode::NoRefreshToken, "No refresh token found")
    }

    /// True for errors raised locally before any network call.
    pub fn is_local_precondition(&self) -> bool {
        matches!(
            self.code,
            AuthErrorCode::NoAccessToken | AuthErrorCode::NoRefreshToken
        )
    }

    /// True when the caller has to prompt for a password again.
    pub fn requires_login(&self) -> bool {
        matches!(
            self.code,
            AuthErrorCode::SessionExpired
                | AuthErrorCode::NoRefreshToken
                | AuthErrorCode::NoAccessToken
        )
    }
}

/// Default normalization of provider errors.
///
/// Operation-specific mappings (login, change password, refresh) are applied
/// at the call site before falling back to this.
impl From<IdpError> for AuthError {
    fn from(err: IdpError) -> Self {
        match err {
            IdpError::Service { kind, message } => {
                let code = match kind {
                    IdpErrorKind::UserNotConfirmed => AuthErrorCode::UserNotConfirmed,
                    IdpErrorKind::InvalidPassword => AuthErrorCode::InvalidPassword,
                    other => AuthErrorCode::Provider(other.as_str().to_string()),
                };
                AuthError::new(code, message)
            }
            IdpError::Transport(msg) => AuthError::new(AuthErrorCode::Network, msg),
        }
    }
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        AuthError::new(AuthErrorCode::Storage, err.to_string())
    }
}

/// Client-side shape validation failure, raised before contacting the provider.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ValidationError {
    pub message: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Persistent store failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Store serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Top-level error for operations that validate input before calling the provider.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),
}

/// Result type alias for session operations.
pub type Result<T, E = AuthError> = std::result::Result<T, E>;
