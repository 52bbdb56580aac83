// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - session logic and its collaborators.

pub mod api;
pub mod cognito;
pub mod idp;
pub mod session;
pub mod token;
pub mod validation;

pub use api::{ApiClient, ApiError};
pub use cognito::CognitoClient;
pub use idp::{AuthFlow, AuthenticationResult, IdentityProvider, IdpError, IdpErrorKind, UserAttribute};
pub use session::SessionManager;
pub use token::{decode_payload, extract_identity_claims, TokenPayload};
pub use validation::{
    validate_confirmation_code, validate_new_password, validate_password_policy, PasswordChecks,
};
