// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use async_trait::async_trait;
use cognito_session::models::SignUpRequest;
use cognito_session::services::{
    AuthFlow, AuthenticationResult, IdentityProvider, IdpError, IdpErrorKind, UserAttribute,
};
use cognito_session::{MemoryStore, SessionManager, SessionStore};
use jsonwebtoken::{encode, EncodingKey, Header};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[allow(dead_code)]
pub const TEST_EMAIL: &str = "a@b.com";
#[allow(dead_code)]
pub const TEST_PASSWORD: &str = "Secret123!";

#[allow(dead_code)]
pub fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Mint a signed token expiring `exp_offset` seconds from now.
///
/// The signature is real but nothing in the client checks it.
#[allow(dead_code)]
pub fn make_token(exp_offset: i64, extra: serde_json::Value) -> String {
    let mut claims = serde_json::json!({ "exp": now() + exp_offset, "sub": "user-1" });
    if let (Some(map), Some(extra)) = (claims.as_object_mut(), extra.as_object()) {
        for (k, v) in extra {
            map.insert(k.clone(), v.clone());
        }
    }

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(b"test_signing_key_32_bytes_long!!"),
    )
    .expect("Failed to create test token")
}

#[allow(dead_code)]
pub fn access_token(exp_offset: i64) -> String {
    make_token(exp_offset, serde_json::json!({ "token_use": "access" }))
}

#[allow(dead_code)]
pub fn id_token(exp_offset: i64, given_name: &str) -> String {
    make_token(
        exp_offset,
        serde_json::json!({
            "token_use": "id",
            "email": TEST_EMAIL,
            "given_name": given_name,
            "family_name": "Lovelace",
        }),
    )
}

/// Full authentication result as returned by a password login.
#[allow(dead_code)]
pub fn full_auth_result() -> AuthenticationResult {
    AuthenticationResult {
        access_token: Some(access_token(3600)),
        id_token: Some(id_token(3600, "Ada")),
        refresh_token: Some("refresh-token-1".to_string()),
        expires_in: Some(3600),
        token_type: Some("Bearer".to_string()),
    }
}

/// Refresh result: new access/id tokens, no refresh token.
#[allow(dead_code)]
pub fn refresh_auth_result() -> AuthenticationResult {
    AuthenticationResult {
        access_token: Some(access_token(7200)),
        id_token: Some(id_token(7200, "Augusta")),
        refresh_token: None,
        expires_in: Some(7200),
        token_type: Some("Bearer".to_string()),
    }
}

#[allow(dead_code)]
pub fn service_error(kind: &str) -> IdpError {
    IdpError::service(IdpErrorKind::from_type(kind), format!("{} from stub", kind))
}

/// Scriptable identity provider that counts every call.
pub struct StubIdp {
    calls: AtomicUsize,
    refresh_calls: AtomicUsize,
    pub login_result: Mutex<Result<AuthenticationResult, IdpError>>,
    pub refresh_result: Mutex<Result<AuthenticationResult, IdpError>>,
    pub sign_out_result: Mutex<Result<(), IdpError>>,
    pub change_password_result: Mutex<Result<(), IdpError>>,
    pub account_result: Mutex<Result<(), IdpError>>,
    pub refresh_delay: Mutex<Option<Duration>>,
    pub last_sign_up: Mutex<Option<(String, Vec<UserAttribute>)>>,
    pub last_attributes: Mutex<Vec<UserAttribute>>,
    pub last_flow: Mutex<Option<String>>,
}

impl Default for StubIdp {
    fn default() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            refresh_calls: AtomicUsize::new(0),
            login_result: Mutex::new(Ok(full_auth_result())),
            refresh_result: Mutex::new(Ok(refresh_auth_result())),
            sign_out_result: Mutex::new(Ok(())),
            change_password_result: Mutex::new(Ok(())),
            account_result: Mutex::new(Ok(())),
            refresh_delay: Mutex::new(None),
            last_sign_up: Mutex::new(None),
            last_attributes: Mutex::new(Vec::new()),
            last_flow: Mutex::new(None),
        }
    }
}

#[allow(dead_code)]
impl StubIdp {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn refresh_calls(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    fn record(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }

    fn account(&self) -> Result<(), IdpError> {
        self.record();
        self.account_result.lock().unwrap().clone()
    }
}

#[async_trait]
impl IdentityProvider for StubIdp {
    async fn initiate_auth(&self, flow: AuthFlow) -> Result<AuthenticationResult, IdpError> {
        self.record();
        *self.last_flow.lock().unwrap() = Some(flow.as_str().to_string());

        match flow {
            AuthFlow::UserPassword { .. } => self.login_result.lock().unwrap().clone(),
            AuthFlow::RefreshToken { .. } => {
                self.refresh_calls.fetch_add(1, Ordering::SeqCst);
                let delay = *self.refresh_delay.lock().unwrap();
                if let Some(delay) = delay {
                    tokio::time::sleep(delay).await;
                }
                self.refresh_result.lock().unwrap().clone()
            }
        }
    }

    async fn sign_up(
        &self,
        request: &SignUpRequest,
        validation_data: &[UserAttribute],
    ) -> Result<(), IdpError> {
        *self.last_sign_up.lock().unwrap() =
            Some((request.email.clone(), validation_data.to_vec()));
        self.account()
    }

    async fn confirm_sign_up(&self, _username: &str, _code: &str) -> Result<(), IdpError> {
        self.account()
    }

    async fn forgot_password(&self, _username: &str) -> Result<(), IdpError> {
        self.account()
    }

    async fn confirm_forgot_password(
        &self,
        _username: &str,
        _code: &str,
        _new_password: &str,
    ) -> Result<(), IdpError> {
        self.account()
    }

    async fn global_sign_out(&self, _access_token: &str) -> Result<(), IdpError> {
        self.record();
        self.sign_out_result.lock().unwrap().clone()
    }

    async fn resend_confirmation_code(&self, _username: &str) -> Result<(), IdpError> {
        self.account()
    }

    async fn change_password(
        &self,
        _access_token: &str,
        _previous_password: &str,
        _proposed_password: &str,
    ) -> Result<(), IdpError> {
        self.record();
        self.change_password_result.lock().unwrap().clone()
    }

    async fn update_user_attributes(
        &self,
        _access_token: &str,
        attributes: &[UserAttribute],
    ) -> Result<(), IdpError> {
        *self.last_attributes.lock().unwrap() = attributes.to_vec();
        self.account()
    }
}

pub type TestManager = SessionManager<StubIdp, Arc<MemoryStore>>;

/// Manager over a fresh stub and an empty in-memory store.
#[allow(dead_code)]
pub fn test_manager() -> TestManager {
    test_manager_with(StubIdp::default())
}

#[allow(dead_code)]
pub fn test_manager_with(idp: StubIdp) -> TestManager {
    let store = SessionStore::load(Arc::new(MemoryStore::new())).expect("store should load");
    SessionManager::new(idp, store)
}
