// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Client-side form checks run before anything is sent to the provider.
//!
//! These mirror the user pool's password policy for early feedback only; the
//! provider remains the authority and may still reject a password.

use crate::error::ValidationError;

pub const PASSWORD_MIN_LEN: usize = 8;
pub const PASSWORD_MAX_LEN: usize = 16;
pub const PASSWORD_SPECIAL_CHARS: &str = "!@#$%^&*";
pub const CONFIRMATION_CODE_LEN: usize = 6;

/// Individual password policy checks, for live form feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordChecks {
    pub min_length: bool,
    pub max_length: bool,
    pub upper_case: bool,
    pub number: bool,
    pub special_char: bool,
}

impl PasswordChecks {
    pub fn evaluate(password: &str) -> Self {
        let len = password.chars().count();
        Self {
            min_length: len >= PASSWORD_MIN_LEN,
            max_length: len <= PASSWORD_MAX_LEN,
            upper_case: password.chars().any(|c| c.is_ascii_uppercase()),
            number: password.chars().any(|c| c.is_ascii_digit()),
            special_char: password.chars().any(|c| PASSWORD_SPECIAL_CHARS.contains(c)),
        }
    }

    pub fn all_passed(&self) -> bool {
        self.failures().is_empty()
    }

    /// Human-readable description of each failed check.
    pub fn failures(&self) -> Vec<String> {
        [
            (self.min_length, format!("at least {} characters", PASSWORD_MIN_LEN)),
            (self.max_length, format!("at most {} characters", PASSWORD_MAX_LEN)),
            (self.upper_case, "an uppercase letter".to_string()),
            (self.number, "a number".to_string()),
            (
                self.special_char,
                format!("a special character ({})", PASSWORD_SPECIAL_CHARS),
            ),
        ]
        .into_iter()
        .filter(|(ok, _)| !ok)
        .map(|(_, msg)| msg)
        .collect()
    }
}

/// Check a password against the policy alone (no confirmation field).
pub fn validate_password_policy(password: &str) -> Result<(), ValidationError> {
    let failures = PasswordChecks::evaluate(password).failures();
    if failures.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::new(format!(
            "Password must contain {}",
            failures.join(", ")
        )))
    }
}

/// Check a new password against the policy and its confirmation field.
pub fn validate_new_password(password: &str, confirmation: &str) -> Result<(), ValidationError> {
    validate_password_policy(password)?;

    if password != confirmation {
        return Err(ValidationError::new("Passwords do not match"));
    }

    Ok(())
}

/// A confirmation code is exactly six ASCII digits.
pub fn validate_confirmation_code(code: &str) -> Result<(), ValidationError> {
    if code.len() == CONFIRMATION_CODE_LEN && code.bytes().all(|b| b.is_ascii_digit()) {
        Ok(())
    } else {
        Err(ValidationError::new(
            "Please enter a valid 6-digit confirmation code",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strong_password_passes() {
        let checks = PasswordChecks::evaluate("Secret123!");
        assert!(checks.all_passed());
        assert!(checks.failures().is_empty());
    }

    #[test]
    fn test_each_check_fails_independently() {
        assert!(!PasswordChecks::evaluate("Se1!").min_length);
        assert!(!PasswordChecks::evaluate("Secret123!Secret1").max_length);
        assert!(!PasswordChecks::evaluate("secret123!").upper_case);
        assert!(!PasswordChecks::evaluate("Secretxyz!").number);
        assert!(!PasswordChecks::evaluate("Secret1234").special_char);
    }

    #[test]
    fn test_boundary_lengths() {
        assert!(PasswordChecks::evaluate("Abcde1!x").all_passed()); // 8
        assert!(PasswordChecks::evaluate("Abcde1!xAbcde1!x").all_passed()); // 16
    }

    #[test]
    fn test_validate_new_password_messages() {
        assert!(validate_new_password("Secret123!", "Secret123!").is_ok());

        let err = validate_new_password("Secret123!", "Secret123?").unwrap_err();
        assert_eq!(err.message, "Passwords do not match");

        let err = validate_new_password("secret", "secret").unwrap_err();
        assert_eq!(
            err.message,
            "Password must contain at least 8 characters, an uppercase letter, a number, \
             a special character (!@#$%^&*)"
        );
    }

    #[test]
    fn test_failure_messages_follow_limits() {
        let checks = PasswordChecks::evaluate("x");
        assert!(checks
            .failures()
            .contains(&format!("at least {} characters", PASSWORD_MIN_LEN)));

        let long = "A1!".repeat(PASSWORD_MAX_LEN);
        assert_eq!(
            PasswordChecks::evaluate(&long).failures(),
            vec![format!("at most {} characters", PASSWORD_MAX_LEN)]
        );
    }

    #[test]
    fn test_policy_check_without_confirmation() {
        assert!(validate_password_policy("Secret123!").is_ok());

        let err = validate_password_policy("Secret123").unwrap_err();
        assert_eq!(
            err.message,
            "Password must contain a special character (!@#$%^&*)"
        );
    }

    #[test]
    fn test_confirmation_code() {
        assert!(validate_confirmation_code("012345").is_ok());
        assert!(validate_confirmation_code("12345").is_err());
        assert!(validate_confirmation_code("1234567").is_err());
        assert!(validate_confirmation_code("12a456").is_err());
        assert!(validate_confirmation_code("１２３４５６").is_err());
    }
}
