// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session manager: the single authority for "is the caller authenticated".
//!
//! Owns the Credential Set through a [`SessionStore`] and keeps it fresh via
//! the provider's refresh-token flow, so the user is not asked for a
//! password again until the refresh token itself is rejected.
//!
//! Refresh failure policy: a definitive rejection of the refresh token
//! (`NotAuthorizedException`) clears the stored session and yields
//! `SessionExpired`. Transport and other failures leave the stored tokens in
//! place so a later attempt can retry.
//!
//! Login, logout and refresh hold the same lock while they talk to the
//! provider, and a refresh only writes its result if the stored refresh
//! token is still the one it exchanged.

use crate::error::{AuthError, AuthErrorCode, Error, ValidationError};
use crate::models::{CredentialSet, IdentityClaims, SignUpRequest, UserAttributesUpdate};
use crate::services::idp::{AuthFlow, IdentityProvider, IdpError, IdpErrorKind, UserAttribute};
use crate::services::token::{decode_payload, extract_identity_claims};
use crate::store::{KeyValueStore, SessionStore};
use crate::time_utils::now_epoch_secs;
use tokio::sync::Mutex;

/// Validation data key carrying the sign-up form's reCAPTCHA token.
const RECAPTCHA_VALIDATION_KEY: &str = "recaptchaToken";

const EMAIL_ATTRIBUTE: &str = "email";

/// Session lifecycle over an [`IdentityProvider`] and a persistent store.
pub struct SessionManager<P, S> {
    idp: P,
    store: SessionStore<S>,
    /// Serializes login, logout and refresh; one refresh token exchange
    /// serves all waiters.
    session_lock: Mutex<()>,
}

impl<P, S> SessionManager<P, S>
where
    P: IdentityProvider,
    S: KeyValueStore,
{
    pub fn new(idp: P, store: SessionStore<S>) -> Self {
        Self {
            idp,
            store,
            session_lock: Mutex::new(()),
        }
    }

    pub fn idp(&self) -> &P {
        &self.idp
    }

    pub fn store(&self) -> &SessionStore<S> {
        &self.store
    }

    pub fn credentials(&self) -> CredentialSet {
        self.store.credentials()
    }

    /// Identity token for the REST API's `Authorization` header.
    pub fn id_token(&self) -> Option<String> {
        self.store.credentials().id_token().map(str::to_string)
    }

    /// Cached claims as last decoded, without any freshness check.
    pub fn cached_claims(&self) -> Option<IdentityClaims> {
        self.store.claims()
    }

    // ─── Session Lifecycle ───────────────────────────────────────────────────

    /// Authenticate with email and password, replacing any stored session.
    ///
    /// Password policy is not checked here; that is the provider's job.
    pub async fn login(&self, email: &str, password: &str) -> Result<CredentialSet, AuthError> {
        if email.is_empty() || password.is_empty() {
            return Err(AuthError::new(
                AuthErrorCode::InvalidCredentials,
                "Email and password are required",
            ));
        }

        let flow = AuthFlow::UserPassword {
            username: email.to_string(),
            password: password.to_string(),
        };

        let _guard = self.session_lock.lock().await;

        let result = self.idp.initiate_auth(flow).await.map_err(|e| match e {
            IdpError::Service {
                kind: IdpErrorKind::UserNotConfirmed,
                ..
            } => AuthError::new(AuthErrorCode::UserNotConfirmed, "User not confirmed"),
            IdpError::Service {
                kind: IdpErrorKind::UserNotFound | IdpErrorKind::NotAuthorized,
                ..
            } => AuthError::new(
                AuthErrorCode::InvalidCredentials,
                "Invalid email or password",
            ),
            other => AuthError::from(other),
        })?;

        let set = match (result.access_token, result.id_token, result.refresh_token) {
            (Some(access), Some(id), Some(refresh))
                if !access.is_empty() && !id.is_empty() && !refresh.is_empty() =>
            {
                CredentialSet::new(access, id, refresh)
            }
            _ => {
                tracing::warn!("Login returned an incomplete authentication result");
                return Err(AuthError::new(
                    AuthErrorCode::IncompleteAuthResult,
                    "Incomplete authentication result",
                ));
            }
        };

        // Decode before persisting so a bad identity token leaves the store untouched.
        let claims = extract_identity_claims(&set.id_token)?;

        self.store.save_credentials(&set)?;
        self.store.save_claims(&claims)?;

        tracing::info!(email = %claims.email, "Login successful");
        Ok(set)
    }

    /// Local, optimistic check: the stored access token has not expired.
    ///
    /// Makes no network call, so a token revoked at the provider still
    /// reads as authenticated until it expires.
    pub fn is_authenticated(&self) -> bool {
        let set = self.store.credentials();
        let (Some(access_token), Some(_)) = (set.access_token(), set.refresh_token()) else {
            return false;
        };

        match decode_payload(access_token) {
            Ok(payload) => payload.is_live_at(now_epoch_secs()),
            Err(e) => {
                tracing::debug!(error = %e, "Stored access token is unreadable");
                false
            }
        }
    }

    /// Exchange the refresh token for new access and identity tokens.
    ///
    /// The refresh token is never rotated. At most one exchange runs at a
    /// time; callers that waited on an exchange get its result.
    pub async fn refresh_session(&self) -> Result<CredentialSet, AuthError> {
        let seen = self.store.credentials();
        if seen.refresh_token().is_none() {
            return Err(AuthError::no_refresh_token());
        }

        let _guard = self.session_lock.lock().await;

        // Re-check after acquiring the lock: another caller may have refreshed
        // or logged out while we waited.
        let current = self.store.credentials();
        let Some(refresh_token) = current.refresh_token().map(str::to_string) else {
            return Err(AuthError::no_refresh_token());
        };
        if current.is_complete() && current.access_token != seen.access_token {
            tracing::debug!("Session already refreshed by a concurrent caller");
            return Ok(current);
        }

        let result = match self
            .idp
            .initiate_auth(AuthFlow::RefreshToken {
                refresh_token: refresh_token.clone(),
            })
            .await
        {
            Ok(result) => result,
            Err(IdpError::Service {
                kind: IdpErrorKind::NotAuthorized,
                message,
            }) => {
                tracing::warn!(reason = %message, "Refresh token rejected, clearing session");
                // Only the session that owns the rejected token is cleared.
                if self.store.credentials().refresh_token() == Some(refresh_token.as_str()) {
                    if let Err(e) = self.store.clear() {
                        tracing::error!(error = %e, "Failed to clear rejected session");
                    }
                }
                return Err(AuthError::new(AuthErrorCode::SessionExpired, message));
            }
            Err(e) => {
                tracing::warn!(error = %e, "Session refresh failed");
                return Err(e.into());
            }
        };

        let (access_token, id_token) = match (result.access_token, result.id_token) {
            (Some(access), Some(id)) if !access.is_empty() && !id.is_empty() => (access, id),
            _ => {
                tracing::warn!("Refresh returned an incomplete authentication result");
                return Err(AuthError::new(
                    AuthErrorCode::IncompleteRefreshResult,
                    "Incomplete refresh result",
                ));
            }
        };

        let claims = extract_identity_claims(&id_token)?;
        let Some(set) = self
            .store
            .update_tokens(&refresh_token, &access_token, &id_token)?
        else {
            // Session replaced or cleared behind our back; the result is stale.
            tracing::warn!("Discarding refresh result for a session that is gone");
            let current = self.store.credentials();
            return if current.is_complete() {
                Ok(current)
            } else {
                Err(AuthError::no_refresh_token())
            };
        };
        self.store.save_claims(&claims)?;

        tracing::info!("Session refreshed");
        Ok(set)
    }

    /// Gate for UI flows: authenticated locally, or recovered by one refresh.
    ///
    /// Never fails; every error degrades to `false`.
    pub async fn check_auth_status(&self) -> bool {
        if self.is_authenticated() {
            return true;
        }

        match self.refresh_session().await {
            Ok(_) => true,
            Err(e) => {
                tracing::debug!(code = %e.code, "Session refresh failed during status check");
                false
            }
        }
    }

    /// Sign out everywhere and clear local state.
    ///
    /// Local state is cleared even when the provider call fails; the
    /// provider error is still returned so the caller knows other sessions
    /// may remain valid.
    pub async fn logout(&self) -> Result<(), AuthError> {
        let _guard = self.session_lock.lock().await;

        let access_token = self
            .store
            .credentials()
            .access_token()
            .map(str::to_string)
            .ok_or_else(AuthError::no_access_token)?;

        let signed_out = self.idp.global_sign_out(&access_token).await;
        let cleared = self.store.clear();

        match (&signed_out, &cleared) {
            (Ok(()), Ok(())) => tracing::info!("Logged out"),
            (Err(e), _) => tracing::warn!(error = %e, "Global sign-out failed, local session cleared"),
            (_, Err(e)) => tracing::error!(error = %e, "Failed to clear local session"),
        }

        signed_out.map_err(AuthError::from)?;
        cleared.map_err(AuthError::from)
    }

    /// Change the password of the signed-in user.
    ///
    /// Sessions on other devices are not revoked by this call.
    pub async fn change_password(
        &self,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        let access_token = self
            .store
            .credentials()
            .access_token()
            .map(str::to_string)
            .ok_or_else(AuthError::no_access_token)?;

        self.idp
            .change_password(&access_token, old_password, new_password)
            .await
            .map_err(|e| match e {
                IdpError::Service {
                    kind: IdpErrorKind::InvalidPassword,
                    ..
                } => AuthError::new(AuthErrorCode::InvalidPassword, "Invalid password format"),
                IdpError::Service {
                    kind: IdpErrorKind::NotAuthorized,
                    ..
                } => AuthError::new(AuthErrorCode::IncorrectPassword, "Incorrect old password"),
                other => AuthError::from(other),
            })?;

        tracing::info!("Password changed");
        Ok(())
    }

    // ─── Account Management ──────────────────────────────────────────────────

    /// Register a new account. The payload is validated before any network call.
    pub async fn sign_up(&self, request: &SignUpRequest, recaptcha_token: &str) -> Result<(), Error> {
        request.check()?;

        let validation_data = [UserAttribute::new(RECAPTCHA_VALIDATION_KEY, recaptcha_token)];
        self.idp
            .sign_up(request, &validation_data)
            .await
            .map_err(AuthError::from)?;

        tracing::info!(email = %request.email, "Sign-up submitted");
        Ok(())
    }

    pub async fn confirm_sign_up(&self, email: &str, code: &str) -> Result<(), AuthError> {
        self.idp.confirm_sign_up(email, code).await?;
        tracing::info!(email = %email, "Sign-up confirmed");
        Ok(())
    }

    pub async fn resend_verification_code(&self, email: &str) -> Result<(), AuthError> {
        self.idp.resend_confirmation_code(email).await?;
        Ok(())
    }

    pub async fn forgot_password(&self, email: &str) -> Result<(), AuthError> {
        self.idp.forgot_password(email).await?;
        tracing::info!(email = %email, "Password reset requested");
        Ok(())
    }

    pub async fn confirm_forgot_password(
        &self,
        email: &str,
        code: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        self.idp
            .confirm_forgot_password(email, code, new_password)
            .await?;
        tracing::info!(email = %email, "Password reset confirmed");
        Ok(())
    }

    // ─── User Attributes ─────────────────────────────────────────────────────

    /// Identity claims of the signed-in user.
    ///
    /// Served from the cache while the session is live; otherwise the
    /// session is refreshed and the claims re-derived from the new token.
    pub async fn user_attributes(&self) -> Result<IdentityClaims, AuthError> {
        if self.store.credentials().id_token().is_some() && self.is_authenticated() {
            if let Some(claims) = self.store.claims() {
                return Ok(claims);
            }
        }

        let attributes_failed = |e: AuthError| {
            AuthError::new(
                AuthErrorCode::GetAttributesFailed,
                format!("Failed to get user attributes: {}", e.message),
            )
        };

        let set = self.refresh_session().await.map_err(attributes_failed)?;
        let claims = extract_identity_claims(&set.id_token).map_err(attributes_failed)?;
        self.store.save_claims(&claims)?;
        Ok(claims)
    }

    /// Update profile attributes at the provider and in the cached claims.
    ///
    /// The email is immutable once verified and is rejected before any
    /// network call.
    pub async fn update_user_attributes(
        &self,
        update: &UserAttributesUpdate,
    ) -> Result<IdentityClaims, Error> {
        if update.touches(EMAIL_ATTRIBUTE) {
            return Err(ValidationError::new("Email cannot be changed").into());
        }

        let access_token = self
            .store
            .credentials()
            .access_token()
            .map(str::to_string)
            .ok_or_else(AuthError::no_access_token)?;

        if update.is_empty() {
            return Ok(self.user_attributes().await?);
        }

        let attributes: Vec<UserAttribute> = update
            .entries()
            .map(|(name, value)| UserAttribute::new(name, value))
            .collect();

        self.idp
            .update_user_attributes(&access_token, &attributes)
            .await
            .map_err(AuthError::from)?;

        let mut claims = self.user_attributes().await?;
        claims.merge(update);
        self.store.save_claims(&claims).map_err(AuthError::from)?;

        tracing::info!(count = attributes.len(), "User attributes updated");
        Ok(claims)
    }
}
