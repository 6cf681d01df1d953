//! Identifier newtypes for teams, users, and pull requests.
//!
//! Identifiers are opaque strings supplied by clients. They must be non-empty
//! and carry no surrounding whitespace; anything else is accepted verbatim.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Validation errors raised when constructing an identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentifierValidationError {
    /// The identifier was empty or whitespace only.
    Empty { kind: &'static str },
    /// The identifier carried leading or trailing whitespace.
    Padded { kind: &'static str },
}

impl fmt::Display for IdentifierValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty { kind } => write!(f, "{kind} must not be empty"),
            Self::Padded { kind } => {
                write!(f, "{kind} must not start or end with whitespace")
            }
        }
    }
}

impl std::error::Error for IdentifierValidationError {}

fn validate(kind: &'static str, raw: &str) -> Result<(), IdentifierValidationError> {
    if raw.trim().is_empty() {
        return Err(IdentifierValidationError::Empty { kind });
    }
    if raw.trim() != raw {
        return Err(IdentifierValidationError::Padded { kind });
    }
    Ok(())
}

macro_rules! string_identifier {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Validate and construct the identifier.
            pub fn new(raw: impl Into<String>) -> Result<Self, IdentifierValidationError> {
                let raw = raw.into();
                validate($kind, &raw)?;
                Ok(Self(raw))
            }

            /// Borrow the identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                self.0.as_str()
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.as_str()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = IdentifierValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }
    };
}

string_identifier!(
    /// Unique team name.
    TeamName,
    "team_name"
);

string_identifier!(
    /// Unique user identifier.
    UserId,
    "user_id"
);

string_identifier!(
    /// Unique pull request identifier.
    PullRequestId,
    "pull_request_id"
);
