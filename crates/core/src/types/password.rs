//! Plaintext password policy.
//!
//! A [`Password`] only exists between the request body and the hasher. It
//! never implements `Serialize` and its `Debug` output is redacted so it
//! cannot end up in logs or responses by accident.

use core::fmt;

/// Special characters that satisfy the "one special character" rule.
pub const SPECIAL_CHARACTERS: &str = "!@#$%^&*";

/// Errors that can occur when checking a password against the policy.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PasswordError {
    /// Length outside 8-16 characters.
    #[error("password must be between {min} and {max} characters")]
    Length {
        /// Minimum length.
        min: usize,
        /// Maximum length.
        max: usize,
    },
    /// No uppercase letter.
    #[error("password must contain at least one uppercase letter")]
    MissingUppercase,
    /// None of [`SPECIAL_CHARACTERS`].
    #[error("password must contain at least one special character (!@#$%^&*)")]
    MissingSpecial,
}

/// A plaintext password that satisfies the account password policy.
///
/// ## Constraints
///
/// - 8-16 characters
/// - At least one ASCII uppercase letter (A-Z)
/// - At least one of `!@#$%^&*`
///
/// ```
/// use star_rating_core::Password;
///
/// assert!(Password::parse("Sunny#Day1").is_ok());
/// assert!(Password::parse("sunny#day1").is_err()); // no uppercase
/// assert!(Password::parse("SunnyDay1").is_err());  // no special character
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Password(String);

impl Password {
    /// Minimum length in characters.
    pub const MIN_LENGTH: usize = 8;
    /// Maximum length in characters.
    pub const MAX_LENGTH: usize = 16;

    /// Check a candidate password against the policy.
    ///
    /// # Errors
    ///
    /// Returns the first [`PasswordError`] rule the candidate breaks.
    pub fn parse(s: &str) -> Result<Self, PasswordError> {
        let len = s.chars().count();
        if !(Self::MIN_LENGTH..=Self::MAX_LENGTH).contains(&len) {
            return Err(PasswordError::Length {
                min: Self::MIN_LENGTH,
                max: Self::MAX_LENGTH,
            });
        }

        if !s.chars().any(|c| c.is_ascii_uppercase()) {
            return Err(PasswordError::MissingUppercase);
        }

        if !s.chars().any(|c| SPECIAL_CHARACTERS.contains(c)) {
            return Err(PasswordError::MissingSpecial);
        }

        Ok(Self(s.to_owned()))
    }

    /// Expose the plaintext for hashing.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password([REDACTED])")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_policy_compliant() {
        assert!(Password::parse("Abcdefg!").is_ok());
        assert!(Password::parse("Abcdefghijklmno*").is_ok());
    }

    #[test]
    fn test_length_bounds() {
        let too_short = Password::parse("Ab!defg");
        assert_eq!(too_short, Err(PasswordError::Length { min: 8, max: 16 }));

        let too_long = Password::parse("Abcdefghijklmnop!");
        assert_eq!(too_long, Err(PasswordError::Length { min: 8, max: 16 }));
    }

    #[test]
    fn test_requires_uppercase() {
        assert_eq!(
            Password::parse("abcdefg!"),
            Err(PasswordError::MissingUppercase)
        );
        // Only A-Z counts as uppercase
        assert_eq!(
            Password::parse("\u{c9}cole123!"),
            Err(PasswordError::MissingUppercase)
        );
    }

    #[test]
    fn test_requires_special() {
        assert_eq!(
            Password::parse("Abcdefgh"),
            Err(PasswordError::MissingSpecial)
        );
        // Punctuation outside the allowed set does not count
        assert_eq!(
            Password::parse("Abcdefg?"),
            Err(PasswordError::MissingSpecial)
        );
    }

    #[test]
    fn test_debug_is_redacted() {
        let password = Password::parse("Hunter#Two").unwrap();
        let debug = format!("{password:?}");
        assert!(!debug.contains("Hunter"));
        assert_eq!(password.expose(), "Hunter#Two");
    }
}
