// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User-supplied input: sign-up payloads and profile updates.

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use validator::Validate;

/// New account details collected by the sign-up form.
#[derive(Clone, Serialize, Deserialize, Validate)]
pub struct SignUpRequest {
    #[validate(email(message = "Invalid email"))]
    pub email: String,
    #[validate(length(min = 1, message = "First name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, message = "Last name is required"))]
    pub last_name: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

impl SignUpRequest {
    /// Check the payload shape, joining every failure into one message.
    pub fn check(&self) -> Result<(), ValidationError> {
        let errors = match self.validate() {
            Ok(()) => return Ok(()),
            Err(errors) => errors,
        };

        // Field order is not stable in the error map; sort for a deterministic message.
        let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
        fields.sort_by(|a, b| a.0.cmp(&b.0));

        let message = fields
            .iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("Invalid {}", field))
                })
            })
            .collect::<Vec<_>>()
            .join(", ");

        Err(ValidationError::new(message))
    }
}

impl std::fmt::Debug for SignUpRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignUpRequest")
            .field("email", &self.email)
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .finish_non_exhaustive()
    }
}

/// Partial profile update: attribute name to new value.
///
/// `None` entries are kept out of the provider request and the local merge.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserAttributesUpdate {
    attributes: BTreeMap<String, Option<String>>,
}

impl UserAttributesUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), Some(value.into()));
        self
    }

    pub fn unset(mut self, name: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), None);
        self
    }

    pub fn given_name(self, value: impl Into<String>) -> Self {
        self.set("given_name", value)
    }

    pub fn family_name(self, value: impl Into<String>) -> Self {
        self.set("family_name", value)
    }

    /// Entries that carry a value.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes
            .iter()
            .filter_map(|(k, v)| v.as_deref().map(|v| (k.as_str(), v)))
    }

    pub fn is_empty(&self) -> bool {
        self.entries().next().is_none()
    }

    /// True if `name` is set or unset by this update.
    pub fn touches(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }
}
