// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Identity provider boundary.
//!
//! The session manager talks to the provider only through
//! [`IdentityProvider`]. Failures come back as a closed [`IdpError`] so call
//! sites match on kinds instead of exception name strings.

use crate::models::SignUpRequest;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Authentication flow for `initiate_auth`.
#[derive(Clone)]
pub enum AuthFlow {
    UserPassword { username: String, password: String },
    RefreshToken { refresh_token: String },
}

impl AuthFlow {
    /// Provider name of the flow.
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthFlow::UserPassword { .. } => "USER_PASSWORD_AUTH",
            AuthFlow::RefreshToken { .. } => "REFRESH_TOKEN_AUTH",
        }
    }
}

impl std::fmt::Debug for AuthFlow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tokens returned by a successful `initiate_auth`.
///
/// Any field may be missing (e.g. when the provider answers with a challenge
/// instead of tokens, or omits the refresh token on a refresh flow).
#[derive(Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct AuthenticationResult {
    pub access_token: Option<String>,
    pub id_token: Option<String>,
    pub refresh_token: Option<String>,
    pub expires_in: Option<i64>,
    pub token_type: Option<String>,
}

impl std::fmt::Debug for AuthenticationResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthenticationResult")
            .field("access_token", &self.access_token.is_some())
            .field("id_token", &self.id_token.is_some())
            .field("refresh_token", &self.refresh_token.is_some())
            .field("expires_in", &self.expires_in)
            .finish()
    }
}

/// Name/value pair used for user attributes and validation data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UserAttribute {
    pub name: String,
    pub value: String,
}

impl UserAttribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Provider exception kinds the session layer knows about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdpErrorKind {
    UserNotConfirmed,
    UserNotFound,
    NotAuthorized,
    InvalidPassword,
    InvalidParameter,
    CodeMismatch,
    ExpiredCode,
    UsernameExists,
    LimitExceeded,
    TooManyRequests,
    Other(String),
}

impl IdpErrorKind {
    /// Parse an exception name, with or without a `namespace#` prefix.
    pub fn from_type(raw: &str) -> Self {
        let name = raw.rsplit('#').next().unwrap_or(raw);
        // Some error headers carry a trailing ":<url>" segment.
        let name = name.split(':').next().unwrap_or(name).trim();
        match name {
            "UserNotConfirmedException" => IdpErrorKind::UserNotConfirmed,
            "UserNotFoundException" => IdpErrorKind::UserNotFound,
            "NotAuthorizedException" => IdpErrorKind::NotAuthorized,
            "InvalidPasswordException" => IdpErrorKind::InvalidPassword,
            "InvalidParameterException" => IdpErrorKind::InvalidParameter,
            "CodeMismatchException" => IdpErrorKind::CodeMismatch,
            "ExpiredCodeException" => IdpErrorKind::ExpiredCode,
            "UsernameExistsException" => IdpErrorKind::UsernameExists,
            "LimitExceededException" => IdpErrorKind::LimitExceeded,
            "TooManyRequestsException" => IdpErrorKind::TooManyRequests,
            other => IdpErrorKind::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            IdpErrorKind::UserNotConfirmed => "UserNotConfirmedException",
            IdpErrorKind::UserNotFound => "UserNotFoundException",
            IdpErrorKind::NotAuthorized => "NotAuthorizedException",
            IdpErrorKind::InvalidPassword => "InvalidPasswordException",
            IdpErrorKind::InvalidParameter => "InvalidParameterException",
            IdpErrorKind::CodeMismatch => "CodeMismatchException",
            IdpErrorKind::ExpiredCode => "ExpiredCodeException",
            IdpErrorKind::UsernameExists => "UsernameExistsException",
            IdpErrorKind::LimitExceeded => "LimitExceededException",
            IdpErrorKind::TooManyRequests => "TooManyRequestsException",
            IdpErrorKind::Other(name) => name,
        }
    }
}

/// Error returned by an [`IdentityProvider`].
#[derive(Debug, Clone, thiserror::Error)]
pub enum IdpError {
    /// The provider answered and rejected the request.
    #[error("{}: {message}", .kind.as_str())]
    Service { kind: IdpErrorKind, message: String },

    /// The request did not get a well-formed answer.
    #[error("Identity provider request failed: {0}")]
    Transport(String),
}

impl IdpError {
    pub fn service(kind: IdpErrorKind, message: impl Into<String>) -> Self {
        IdpError::Service {
            kind,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> Option<&IdpErrorKind> {
        match self {
            IdpError::Service { kind, .. } => Some(kind),
            IdpError::Transport(_) => None,
        }
    }
}

/// Command/response operations of the identity provider.
///
/// Each call is a single request; there are no retries or timeouts at this
/// layer beyond what the transport applies.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn initiate_auth(&self, flow: AuthFlow) -> Result<AuthenticationResult, IdpError>;

    async fn sign_up(
        &self,
        request: &SignUpRequest,
        validation_data: &[UserAttribute],
    ) -> Result<(), IdpError>;

    async fn confirm_sign_up(&self, username: &str, code: &str) -> Result<(), IdpError>;

    async fn forgot_password(&self, username: &str) -> Result<(), IdpError>;

    async fn confirm_forgot_password(
        &self,
        username: &str,
        code: &str,
        new_password: &str,
    ) -> Result<(), IdpError>;

    /// Invalidate every token issued for the user, not only this client's.
    async fn global_sign_out(&self, access_token: &str) -> Result<(), IdpError>;

    async fn resend_confirmation_code(&self, username: &str) -> Result<(), IdpError>;

    async fn change_password(
        &self,
        access_token: &str,
        previous_password: &str,
        proposed_password: &str,
    ) -> Result<(), IdpError>;

    async fn update_user_attributes(
        &self,
        access_token: &str,
        attributes: &[UserAttribute],
    ) -> Result<(), IdpError>;
}
