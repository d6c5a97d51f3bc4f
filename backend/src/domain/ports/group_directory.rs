//! Port for reading group records and aggregate counts.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{Group, GroupId, UserId};

/// Errors raised by group directory adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GroupDirectoryError {
    /// Directory connection could not be established.
    #[error("group directory connection failed: {message}")]
    Connection {
        /// Adapter-provided failure description.
        message: String,
    },
    /// Query failed during execution.
    #[error("group directory query failed: {message}")]
    Query {
        /// Adapter-provided failure description.
        message: String,
    },
}

impl GroupDirectoryError {
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

/// Read access to group records and membership counts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GroupDirectory: Send + Sync {
    /// All groups, in no particular order.
    async fn list_groups(&self) -> Result<Vec<Group>, GroupDirectoryError>;

    /// Number of members of a group.
    async fn member_count(&self, group: GroupId) -> Result<u64, GroupDirectoryError>;

    /// Number of users with no membership at all.
    async fn without_group_count(&self) -> Result<u64, GroupDirectoryError>;

    /// Groups the user belongs to, in name order.
    async fn groups_for_user(&self, user: UserId) -> Result<Vec<Group>, GroupDirectoryError>;
}

/// Fixture directory with no groups.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureGroupDirectory;

#[async_trait]
impl GroupDirectory for FixtureGroupDirectory {
    async fn list_groups(&self) -> Result<Vec<Group>, GroupDirectoryError> {
        Ok(Vec::new())
    }

    async fn member_count(&self, _group: GroupId) -> Result<u64, GroupDirectoryError> {
        Ok(0)
    }

    async fn without_group_count(&self) -> Result<u64, GroupDirectoryError> {
        Ok(0)
    }

    async fn groups_for_user(&self, _user: UserId) -> Result<Vec<Group>, GroupDirectoryError> {
        Ok(Vec::new())
    }
}
