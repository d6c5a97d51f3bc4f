//! Port for the base user-listing query primitive.
//!
//! The domain augments this query with membership constraints; it never
//! replaces or reorders whatever base filtering the adapter applies.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::filter::MembershipPredicate;
use crate::domain::UserId;

/// Errors raised by user directory adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UserDirectoryError {
    /// Directory connection could not be established.
    #[error("user directory connection failed: {message}")]
    Connection {
        /// Adapter-provided failure description.
        message: String,
    },
    /// Query failed during execution.
    #[error("user directory query failed: {message}")]
    Query {
        /// Adapter-provided failure description.
        message: String,
    },
}

impl UserDirectoryError {
    /// Helper for connection oriented failures.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Helper for query failures.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

/// One additive constraint over the user listing.
///
/// Constraints compose by logical AND with the adapter's base filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum UserConstraint {
    /// Membership-based constraint produced by the membership query filter.
    Membership(MembershipPredicate),
}

/// Filter handed to the base user listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserListFilter {
    /// One-based page number.
    pub page: u32,
    /// Page size.
    pub per_page: u32,
    /// Additive constraints, applied in order on top of the base query.
    pub constraints: Vec<UserConstraint>,
}

/// One page of matching users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserPage {
    /// Matching user ids for the requested page.
    pub user_ids: Vec<UserId>,
    /// Total number of matches across all pages.
    pub total: u64,
    /// The page that was returned.
    pub page: u32,
}

/// Base "list users matching filters" query primitive.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// List users matching the filter.
    async fn list_users(&self, filter: &UserListFilter) -> Result<UserPage, UserDirectoryError>;
}

/// Fixture directory with no users.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureUserDirectory;

#[async_trait]
impl UserDirectory for FixtureUserDirectory {
    async fn list_users(&self, filter: &UserListFilter) -> Result<UserPage, UserDirectoryError> {
        Ok(UserPage {
            user_ids: Vec::new(),
            total: 0,
            page: filter.page,
        })
    }
}
