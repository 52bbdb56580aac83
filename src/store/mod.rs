// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Persistent key-value storage for the session.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::error::StoreError;
use crate::models::{CredentialSet, IdentityClaims};
use std::sync::Arc;

/// Fixed store keys.
pub mod keys {
    /// Credential Set (JSON)
    pub const TOKENS: &str = "tokens:";
    /// Cached identity claims (JSON)
    pub const USER: &str = "user:";
}

/// String-keyed, string-valued storage that outlives the process.
///
/// Last write wins; multi-key updates are not atomic.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Arc<T> {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        (**self).remove(key)
    }
}

/// Typed view of the session state over a [`KeyValueStore`].
///
/// This is the only writer of the Credential Set and the cached claims.
pub struct SessionStore<S> {
    backend: S,
}

impl<S: KeyValueStore> SessionStore<S> {
    /// Wrap a backend without inspecting its contents.
    pub fn new(backend: S) -> Self {
        Self { backend }
    }

    /// Open the session persisted in `backend`.
    ///
    /// A partially populated or unreadable Credential Set (e.g. an
    /// interrupted write) is cleared, so a loaded store is always either
    /// fully authenticated or fully logged out.
    pub fn load(backend: S) -> Result<Self, StoreError> {
        let store = Self::new(backend);
        let raw = store.backend.get(keys::TOKENS);
        let set = store.credentials();

        let unreadable = raw.is_some() && set.is_empty();
        if unreadable || (!set.is_complete() && !set.is_empty()) {
            tracing::warn!("Discarding partial or unreadable stored session");
            store.clear()?;
        } else {
            tracing::debug!(authenticated = set.is_complete(), "Session store loaded");
        }

        Ok(store)
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    /// Current Credential Set; empty when nothing (readable) is stored.
    pub fn credentials(&self) -> CredentialSet {
        self.backend
            .get(keys::TOKENS)
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default()
    }

    pub fn save_credentials(&self, set: &CredentialSet) -> Result<(), StoreError> {
        let raw = serde_json::to_string(set)?;
        self.backend.set(keys::TOKENS, &raw)
    }

    /// Replace access and identity tokens of the session that owns `refresh_token`.
    ///
    /// Writes nothing and returns `None` when the stored refresh token is no
    /// longer `refresh_token` (the session was replaced or cleared).
    pub fn update_tokens(
        &self,
        refresh_token: &str,
        access_token: &str,
        id_token: &str,
    ) -> Result<Option<CredentialSet>, StoreError> {
        let mut set = self.credentials();
        if set.refresh_token().is_none() || set.refresh_token != refresh_token {
            return Ok(None);
        }
        set.access_token = access_token.to_string();
        set.id_token = id_token.to_string();
        self.save_credentials(&set)?;
        Ok(Some(set))
    }

    pub fn claims(&self) -> Option<IdentityClaims> {
        self.backend
            .get(keys::USER)
            .and_then(|raw| serde_json::from_str(&raw).ok())
    }

    pub fn save_claims(&self, claims: &IdentityClaims) -> Result<(), StoreError> {
        let raw = serde_json::to_string(claims)?;
        self.backend.set(keys::USER, &raw)
    }

    /// Drop the Credential Set and cached claims.
    ///
    /// Both keys are attempted even if the first removal fails.
    pub fn clear(&self) -> Result<(), StoreError> {
        let tokens = self.backend.remove(keys::TOKENS);
        let user = self.backend.remove(keys::USER);
        tokens.and(user)
    }
}
