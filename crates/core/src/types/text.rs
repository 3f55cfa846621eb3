//! Length-checked text fields: person names, store names and addresses.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a length-checked text field.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TextError {
    /// Shorter than the minimum.
    #[error("must be at least {min} characters")]
    TooShort {
        /// Minimum allowed length in characters.
        min: usize,
    },
    /// Longer than the maximum.
    #[error("must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length in characters.
        max: usize,
    },
}

/// Defines a trimmed `String` newtype bounded to `$min..=$max` characters.
macro_rules! define_text {
    ($(#[$meta:meta])* $name:ident, $min:expr, $max:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Minimum length in characters.
            pub const MIN_LENGTH: usize = $min;
            /// Maximum length in characters.
            pub const MAX_LENGTH: usize = $max;

            /// Parse from a string, trimming surrounding whitespace first.
            ///
            /// # Errors
            ///
            /// Returns [`TextError`] if the trimmed length is out of bounds.
            pub fn parse(s: &str) -> Result<Self, TextError> {
                let s = s.trim();
                let len = s.chars().count();
                if len > Self::MAX_LENGTH {
                    return Err(TextError::TooLong {
                        max: Self::MAX_LENGTH,
                    });
                }
                if !(Self::MIN_LENGTH..=Self::MAX_LENGTH).contains(&len) {
                    return Err(TextError::TooShort {
                        min: Self::MIN_LENGTH,
                    });
                }
                Ok(Self(s.to_owned()))
            }

            /// Returns the text as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consumes the value and returns its inner string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl TryFrom<String> for $name {
            type Error = TextError;

            fn try_from(s: String) -> Result<Self, Self::Error> {
                Self::parse(&s)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_text!(
    /// A person's display name (20-60 characters).
    PersonName,
    20,
    60
);

define_text!(
    /// A store's display name (20-60 characters).
    StoreName,
    20,
    60
);

define_text!(
    /// A free-form postal address (at most 400 characters, may be empty).
    PostalAddress,
    0,
    400
);
