// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Cognito user pool client over the JSON 1.1 protocol.
//!
//! Handles:
//! - Password and refresh-token authentication
//! - Sign-up, confirmation and password reset
//! - Global sign-out, password change and attribute updates
//! - Mapping error responses to [`IdpErrorKind`]
//!
//! All operations used here are unauthenticated at the transport level (app
//! client without a secret), so no request signing is needed.

use crate::config::Config;
use crate::models::SignUpRequest;
use crate::services::idp::{
    AuthFlow, AuthenticationResult, IdentityProvider, IdpError, IdpErrorKind, UserAttribute,
};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;

const TARGET_PREFIX: &str = "AWSCognitoIdentityProviderService";
const CONTENT_TYPE: &str = "application/x-amz-json-1.1";
const ERROR_TYPE_HEADER: &str = "x-amzn-errortype";

/// Cognito identity provider client.
#[derive(Clone)]
pub struct CognitoClient {
    http: reqwest::Client,
    endpoint: String,
    client_id: String,
}

impl CognitoClient {
    /// Create a client for the regional user pool endpoint.
    pub fn new(region: &str, client_id: impl Into<String>) -> Self {
        Self::with_endpoint(
            format!("https://cognito-idp.{}.amazonaws.com/", region),
            client_id,
        )
    }

    /// Create a client against an explicit endpoint (local emulators, tests).
    pub fn with_endpoint(endpoint: impl Into<String>, client_id: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
            client_id: client_id.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        match &config.cognito_endpoint {
            Some(endpoint) => Self::with_endpoint(endpoint.clone(), config.client_id.clone()),
            None => Self::new(&config.region, config.client_id.clone()),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Send one operation and parse its JSON response.
    async fn call<T: DeserializeOwned>(
        &self,
        operation: &str,
        body: serde_json::Value,
    ) -> Result<T, IdpError> {
        tracing::debug!(operation, "Cognito request");

        let response = self
            .http
            .post(&self.endpoint)
            .header("X-Amz-Target", format!("{}.{}", TARGET_PREFIX, operation))
            .header(reqwest::header::CONTENT_TYPE, CONTENT_TYPE)
            .body(body.to_string())
            .send()
            .await
            .map_err(|e| IdpError::Transport(format!("{} request failed: {}", operation, e)))?;

        let response = self.check_response(operation, response).await?;

        let text = response
            .text()
            .await
            .map_err(|e| IdpError::Transport(format!("{} response read failed: {}", operation, e)))?;

        // Operations without output answer with "{}" or an empty body.
        let body = if text.trim().is_empty() {
            "{}"
        } else {
            text.as_str()
        };
        serde_json::from_str(body)
            .map_err(|e| IdpError::Transport(format!("{} JSON parse error: {}", operation, e)))
    }

    /// Send one operation whose response carries nothing we need.
    async fn call_unit(&self, operation: &str, body: serde_json::Value) -> Result<(), IdpError> {
        let _: serde_json::Value = self.call(operation, body).await?;
        Ok(())
    }

    /// Check response status and turn provider errors into [`IdpError`].
    async fn check_response(
        &self,
        operation: &str,
        response: reqwest::Response,
    ) -> Result<reqwest::Response, IdpError> {
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let header_type = response
            .headers()
            .get(ERROR_TYPE_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.text().await.unwrap_or_default();
        let parsed: ErrorBody = serde_json::from_str(&body).unwrap_or_default();

        let Some(raw_type) = parsed.error_type.or(header_type) else {
            return Err(IdpError::Transport(format!("HTTP {}: {}", status, body)));
        };

        let kind = IdpErrorKind::from_type(&raw_type);
        if matches!(kind, IdpErrorKind::TooManyRequests | IdpErrorKind::LimitExceeded) {
            tracing::warn!(operation, kind = kind.as_str(), "Cognito rate limit hit");
        } else {
            tracing::debug!(operation, status = %status, kind = kind.as_str(), "Cognito rejected request");
        }

        let message = parsed
            .message
            .unwrap_or_else(|| format!("{} failed with status {}", operation, status));
        Err(IdpError::Service { kind, message })
    }
}

/// Error body of a JSON 1.1 response.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(rename = "__type")]
    error_type: Option<String>,
    #[serde(alias = "Message")]
    message: Option<String>,
}

/// `InitiateAuth` output.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InitiateAuthResponse {
    authentication_result: Option<AuthenticationResult>,
    challenge_name: Option<String>,
}

#[async_trait]
impl IdentityProvider for CognitoClient {
    async fn initiate_auth(&self, flow: AuthFlow) -> Result<AuthenticationResult, IdpError> {
        let parameters = match &flow {
            AuthFlow::UserPassword { username, password } => {
                json!({ "USERNAME": username, "PASSWORD": password })
            }
            AuthFlow::RefreshToken { refresh_token } => {
                json!({ "REFRESH_TOKEN": refresh_token })
            }
        };

        let response: InitiateAuthResponse = self
            .call(
                "InitiateAuth",
                json!({
                    "AuthFlow": flow.as_str(),
                    "ClientId": self.client_id,
                    "AuthParameters": parameters,
                }),
            )
            .await?;

        if let Some(challenge) = &response.challenge_name {
            // Challenges (MFA, forced password change) are not handled; the
            // caller sees an incomplete result.
            tracing::warn!(challenge = %challenge, "Cognito answered with an auth challenge");
        }

        Ok(response.authentication_result.unwrap_or_default())
    }

    async fn sign_up(
        &self,
        request: &SignUpRequest,
        validation_data: &[UserAttribute],
    ) -> Result<(), IdpError> {
        let attributes = [
            UserAttribute::new("email", &request.email),
            UserAttribute::new("given_name", &request.first_name),
            UserAttribute::new("family_name", &request.last_name),
        ];

        self.call_unit(
            "SignUp",
            json!({
                "ClientId": self.client_id,
                "Username": request.email,
                "Password": request.password,
                "UserAttributes": attributes,
                "ValidationData": validation_data,
            }),
        )
        .await
    }

    async fn confirm_sign_up(&self, username: &str, code: &str) -> Result<(), IdpError> {
        self.call_unit(
            "ConfirmSignUp",
            json!({
                "ClientId": self.client_id,
                "Username": username,
                "ConfirmationCode": code,
            }),
        )
        .await
    }

    async fn forgot_password(&self, username: &str) -> Result<(), IdpError> {
        self.call_unit(
            "ForgotPassword",
            json!({ "ClientId": self.client_id, "Username": username }),
        )
        .await
    }

    async fn confirm_forgot_password(
        &self,
        username: &str,
        code: &str,
        new_password: &str,
    ) -> Result<(), IdpError> {
        self.call_unit(
            "ConfirmForgotPassword",
            json!({
                "ClientId": self.client_id,
                "Username": username,
                "ConfirmationCode": code,
                "Password": new_password,
            }),
        )
        .await
    }

    async fn global_sign_out(&self, access_token: &str) -> Result<(), IdpError> {
        self.call_unit("GlobalSignOut", json!({ "AccessToken": access_token }))
            .await
    }

    async fn resend_confirmation_code(&self, username: &str) -> Result<(), IdpError> {
        self.call_unit(
            "ResendConfirmationCode",
            json!({ "ClientId": self.client_id, "Username": username }),
        )
        .await
    }

    async fn change_password(
        &self,
        access_token: &str,
        previous_password: &str,
        proposed_password: &str,
    ) -> Result<(), IdpError> {
        self.call_unit(
            "ChangePassword",
            json!({
                "AccessToken": access_token,
                "PreviousPassword": previous_password,
                "ProposedPassword": proposed_password,
            }),
        )
        .await
    }

    async fn update_user_attributes(
        &self,
        access_token: &str,
        attributes: &[UserAttribute],
    ) -> Result<(), IdpError> {
        self.call_unit(
            "UpdateUserAttributes",
            json!({ "AccessToken": access_token, "UserAttributes": attributes }),
        )
        .await
    }
}
