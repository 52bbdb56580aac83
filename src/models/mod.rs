// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the session layer.

pub mod claims;
pub mod credentials;
pub mod user;

pub use claims::IdentityClaims;
pub use credentials::CredentialSet;
pub use user::{SignUpRequest, UserAttributesUpdate};
