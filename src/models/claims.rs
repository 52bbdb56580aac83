// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Identity claims decoded from the identity token, cached for display.

use super::user::UserAttributesUpdate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// User identity as last seen in an identity token.
///
/// Display only: these values are decoded without signature verification and
/// may lag behind the provider's stored profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityClaims {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub given_name: String,
    #[serde(default)]
    pub family_name: String,
    /// Token expiry (epoch seconds)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
    /// Attributes set through profile updates that have no dedicated field
    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
}

impl IdentityClaims {
    /// Initials for avatar badges, e.g. "AL" for Ada Lovelace.
    pub fn initials(&self) -> String {
        [&self.given_name, &self.family_name]
            .iter()
            .filter_map(|part| part.chars().next())
            .flat_map(char::to_uppercase)
            .collect()
    }

    /// "Given Family", falling back to the email when no name is known.
    pub fn display_name(&self) -> String {
        let name = format!("{} {}", self.given_name, self.family_name);
        let name = name.trim();
        if name.is_empty() {
            self.email.clone()
        } else {
            name.to_string()
        }
    }

    /// Apply a profile update that the provider has accepted.
    ///
    /// The email is left alone; a verified email is immutable here.
    pub fn merge(&mut self, update: &UserAttributesUpdate) {
        for (name, value) in update.entries() {
            match name {
                "email" => {}
                "given_name" => self.given_name = value.to_string(),
                "family_name" => self.family_name = value.to_string(),
                other => {
                    self.extra.insert(other.to_string(), value.to_string());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ada() -> IdentityClaims {
        IdentityClaims {
            email: "ada@example.com".to_string(),
            given_name: "ada".to_string(),
            family_name: "Lovelace".to_string(),
            exp: Some(1_700_000_000),
            extra: BTreeMap::new(),
        }
    }

    #[test]
    fn test_initials() {
        assert_eq!(ada().initials(), "AL");
        assert_eq!(IdentityClaims::default().initials(), "");

        let mut only_family = ada();
        only_family.given_name.clear();
        assert_eq!(only_family.initials(), "L");
    }

    #[test]
    fn test_display_name_falls_back_to_email() {
        assert_eq!(ada().display_name(), "ada Lovelace");

        let anonymous = IdentityClaims {
            email: "x@y.z".to_string(),
            ..Default::default()
        };
        assert_eq!(anonymous.display_name(), "x@y.z");
    }

    #[test]
    fn test_merge_only_touches_provided_fields() {
        let mut claims = ada();
        let update = UserAttributesUpdate::new()
            .given_name("Augusta")
            .set("locale", "en-GB");

        claims.merge(&update);

        assert_eq!(claims.given_name, "Augusta");
        assert_eq!(claims.family_name, "Lovelace");
        assert_eq!(claims.email, "ada@example.com");
        assert_eq!(claims.extra.get("locale").map(String::as_str), Some("en-GB"));
    }

    #[test]
    fn test_merge_keeps_email() {
        let mut claims = ada();
        claims.merge(&UserAttributesUpdate::new().set("email", "eve@example.com"));

        assert_eq!(claims.email, "ada@example.com");
        assert!(claims.extra.is_empty());
    }
}
