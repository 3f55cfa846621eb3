//! Caller-selectable sort keys.
//!
//! List endpoints accept `sortBy` / `sortOrder` query parameters. They are
//! parsed into these closed enums so that only allow-listed columns can
//! ever reach a query. Mapping a key to an SQL expression happens in the
//! repository layer with an exhaustive `match`.

use serde::{Deserialize, Serialize};

/// Error returned for an unrecognized sort key or direction.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SortError {
    /// The column is not in the allow-list.
    #[error("cannot sort by '{given}' (allowed: {allowed})")]
    UnknownField {
        /// What the caller sent.
        given: String,
        /// Comma-separated allow-list.
        allowed: String,
    },
    /// The direction is neither ascending nor descending.
    #[error("sort order must be 'asc' or 'desc' (got '{0}')")]
    UnknownOrder(String),
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    /// Parse a direction, case-insensitively (`ASC`, `asc`, `Desc`, ...).
    ///
    /// # Errors
    ///
    /// Returns [`SortError::UnknownOrder`] for anything else.
    pub fn parse(s: &str) -> Result<Self, SortError> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            _ => Err(SortError::UnknownOrder(s.to_owned())),
        }
    }
}

/// Defines a closed sort-key enum with `parse`, `as_str` and `ALL`.
macro_rules! define_sort_field {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $key:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            #[default]
            $($variant),+
        }

        impl $name {
            /// Every allowed key.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// The query-string spelling of this key.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $key),+
                }
            }

            /// Parse a key from the allow-list (exact match).
            ///
            /// # Errors
            ///
            /// Returns [`SortError::UnknownField`] for keys outside the allow-list.
            pub fn parse(s: &str) -> Result<Self, SortError> {
                match s.trim() {
                    $($key => Ok(Self::$variant),)+
                    _ => Err(SortError::UnknownField {
                        given: s.to_owned(),
                        allowed: Self::ALL
                            .iter()
                            .map(|f| f.as_str())
                            .collect::<Vec<_>>()
                            .join(", "),
                    }),
                }
            }
        }
    };
}

define_sort_field!(
    /// Sortable columns of the store listing.
    StoreSortField {
        Name => "name",
        Email => "email",
        Address => "address",
        AverageRating => "average_rating",
        TotalRatings => "total_ratings",
    }
);

define_sort_field!(
    /// Sortable columns of the admin user listing.
    UserSortField {
        Name => "name",
        Email => "email",
        Address => "address",
        Role => "role",
    }
);
