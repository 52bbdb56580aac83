// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Cognito-Session: client-side authentication sessions for a Cognito user pool
//!
//! This crate acquires, persists and silently refreshes a user's access,
//! identity and refresh tokens, and gates client flows on the result.

pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod store;
pub mod time_utils;

pub use error::{AuthError, AuthErrorCode, Error, ValidationError};
pub use models::{CredentialSet, IdentityClaims};
pub use services::{CognitoClient, SessionManager};
pub use store::{FileStore, MemoryStore, SessionStore};

/// Session manager wired to the production provider and file store.
pub type CognitoSession = SessionManager<CognitoClient, FileStore>;

/// Build a [`CognitoSession`] from configuration, loading the persisted session.
pub fn open_session(config: &config::Config) -> Result<CognitoSession, error::StoreError> {
    let store = SessionStore::load(FileStore::open(config.session_file.clone())?)?;
    Ok(SessionManager::new(CognitoClient::from_config(config), store))
}
