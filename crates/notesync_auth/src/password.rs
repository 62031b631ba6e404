//! Password complexity policy.

use thiserror::Error;

/// A specific way a candidate password failed the policy.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordError {
    /// Shorter than the minimum length.
    #[error("password must be at least {0} characters")]
    TooShort(usize),
    /// Longer than the maximum length.
    #[error("password must be at most {0} characters")]
    TooLong(usize),
    /// No uppercase letter.
    #[error("password must contain at least one uppercase letter")]
    NoUppercase,
    /// No lowercase letter.
    #[error("password must contain at least one lowercase letter")]
    NoLowercase,
    /// No digit.
    #[error("password must contain at least one digit")]
    NoDigit,
    /// No special character.
    #[error("password must contain at least one special character")]
    NoSpecial,
}

const SPECIAL_CHARS: &str = "!@#$%^&*()_+-=[]{}|;':\",./<>?`~";

/// The password policy.
#[derive(Debug, Clone, Copy)]
pub struct PasswordPolicy {
    /// Minimum length in characters.
    pub min_length: usize,
    /// Maximum length in characters.
    pub max_length: usize,
    /// Require an uppercase letter.
    pub require_uppercase: bool,
    /// Require a lowercase letter.
    pub require_lowercase: bool,
    /// Require a digit.
    pub require_digit: bool,
    /// Require a special character.
    pub require_special: bool,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: 12,
            max_length: 128,
            require_uppercase: true,
            require_lowercase: true,
            require_digit: true,
            require_special: true,
        }
    }
}

impl PasswordPolicy {
    /// Checks a candidate password against this policy.
    pub fn validate(&self, password: &str) -> Result<(), PasswordError> {
        let length = password.chars().count();
        if length < self.min_length {
            return Err(PasswordError::TooShort(self.min_length));
        }
        if length > self.max_length {
            return Err(PasswordError::TooLong(self.max_length));
        }

        let mut has_upper = false;
        let mut has_lower = false;
        let mut has_digit = false;
        let mut has_special = false;
        for ch in password.chars() {
            if ch.is_uppercase() {
                has_upper = true;
            } else if ch.is_lowercase() {
                has_lower = true;
            } else if ch.is_ascii_digit() {
                has_digit = true;
            } else if SPECIAL_CHARS.contains(ch) {
                has_special = true;
            }
        }

        if self.require_uppercase && !has_upper {
            return Err(PasswordError::NoUppercase);
        }
        if self.require_lowercase && !has_lower {
            return Err(PasswordError::NoLowercase);
        }
        if self.require_digit && !has_digit {
            return Err(PasswordError::NoDigit);
        }
        if self.require_special && !has_special {
            return Err(PasswordError::NoSpecial);
        }
        Ok(())
    }
}

/// Checks a candidate against the default policy.
pub fn validate_default(password: &str) -> Result<(), PasswordError> {
    PasswordPolicy::default().validate(password)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_compliant_password() {
        assert_eq!(validate_default("Str0ng-enough!"), Ok(()));
    }

    #[test]
    fn rejects_each_missing_class() {
        assert_eq!(validate_default("short1A!"), Err(PasswordError::TooShort(12)));
        assert_eq!(validate_default("all-lower-case-1!"), Err(PasswordError::NoUppercase));
        assert_eq!(validate_default("ALL-UPPER-CASE-1!"), Err(PasswordError::NoLowercase));
        assert_eq!(validate_default("No-Digits-Here!!"), Err(PasswordError::NoDigit));
        assert_eq!(validate_default("NoSpecials1234"), Err(PasswordError::NoSpecial));
    }

    #[test]
    fn rejects_overlong_password() {
        let long = format!("Aa1!{}", "x".repeat(130));
        assert_eq!(validate_default(&long), Err(PasswordError::TooLong(128)));
    }

    #[test]
    fn relaxed_policy() {
        let policy = PasswordPolicy {
            min_length: 4,
            require_uppercase: false,
            require_digit: false,
            require_special: false,
            ..PasswordPolicy::default()
        };
        assert_eq!(policy.validate("plain"), Ok(()));
    }
}
