// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! The persisted credential triple.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Access, identity and refresh tokens, persisted as one unit.
///
/// Either all three fields are populated (authenticated) or all three are
/// empty (logged out). Field names match the provider's payload so a stored
/// set can be read by other clients of the same store.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CredentialSet {
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub id_token: String,
    #[serde(default)]
    pub refresh_token: String,
}

impl CredentialSet {
    pub fn new(
        access_token: impl Into<String>,
        id_token: impl Into<String>,
        refresh_token: impl Into<String>,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            id_token: id_token.into(),
            refresh_token: refresh_token.into(),
        }
    }

    /// The logged-out set.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_complete(&self) -> bool {
        !self.access_token.is_empty() && !self.id_token.is_empty() && !self.refresh_token.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.access_token.is_empty() && self.id_token.is_empty() && self.refresh_token.is_empty()
    }

    pub fn access_token(&self) -> Option<&str> {
        non_empty(&self.access_token)
    }

    pub fn id_token(&self) -> Option<&str> {
        non_empty(&self.id_token)
    }

    pub fn refresh_token(&self) -> Option<&str> {
        non_empty(&self.refresh_token)
    }
}

fn non_empty(s: &str) -> Option<&str> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

// Tokens are bearer secrets; keep them out of logs.
impl fmt::Debug for CredentialSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |s: &str| if s.is_empty() { "<empty>" } else { "<redacted>" };
        f.debug_struct("CredentialSet")
            .field("access_token", &redact(&self.access_token))
            .field("id_token", &redact(&self.id_token))
            .field("refresh_token", &redact(&self.refresh_token))
            .finish()
    }
}
