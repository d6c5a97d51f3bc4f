//! Identifier newtypes shared across the domain.
//!
//! Group, user, and actor identifiers are positive integers assigned by the
//! external directory store. The newtypes make "positive" a construction
//! invariant instead of a convention each call site re-checks.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation errors raised by the identifier constructors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum IdValidationError {
    /// The raw value was zero or negative.
    #[error("identifier must be a positive integer, got {value}")]
    NotPositive {
        /// The rejected raw value.
        value: i64,
    },
}

macro_rules! positive_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(try_from = "i64", into = "i64")]
        pub struct $name(i64);

        impl $name {
            /// Construct from a raw value, rejecting non-positive input.
            pub const fn try_new(value: i64) -> Result<Self, IdValidationError> {
                if value > 0 {
                    Ok(Self(value))
                } else {
                    Err(IdValidationError::NotPositive { value })
                }
            }

            /// The raw identifier value.
            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl TryFrom<i64> for $name {
            type Error = IdValidationError;

            fn try_from(value: i64) -> Result<Self, Self::Error> {
                Self::try_new(value)
            }
        }

        impl From<$name> for i64 {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

positive_id! {
    /// Identifier of a group in the directory.
    GroupId
}

positive_id! {
    /// Identifier of a directory user. Users are opaque to this domain
    /// beyond their identifier.
    UserId
}

positive_id! {
    /// Identifier of the actor submitting a request.
    ActorId
}

/// Single-purpose token proving a mutation request came from a freshly
/// rendered form.
///
/// The domain only requires presence and verifiability; single-use
/// invalidation is the verifying collaborator's job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReplayToken(String);

impl ReplayToken {
    /// Wrap a raw token value, rejecting blank input.
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let raw = value.into();
        if raw.trim().is_empty() {
            None
        } else {
            Some(Self(raw))
        }
    }

    /// Borrow the raw token value.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for ReplayToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
