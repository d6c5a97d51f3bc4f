//! Port for reading the group parent/child structure.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::GroupId;

/// Errors raised by group hierarchy adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GroupHierarchyError {
    /// Store connection could not be established.
    #[error("group hierarchy store connection failed: {message}")]
    Connection {
        /// Adapter-provided failure description.
        message: String,
    },
    /// Lookup failed during execution.
    #[error("group hierarchy lookup failed: {message}")]
    Lookup {
        /// Adapter-provided failure description.
        message: String,
    },
}

impl GroupHierarchyError {
    /// Helper for connection oriented failures.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Helper for lookup failures.
    pub fn lookup(message: impl Into<String>) -> Self {
        Self::Lookup {
            message: message.into(),
        }
    }
}

/// Read access to child-of edges in the group forest.
///
/// The store guarantees acyclicity; the expander only defends against a
/// malformed graph causing unbounded work, it does not detect cycles.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GroupHierarchyStore: Send + Sync {
    /// Direct children of the given group. Unknown groups yield an empty
    /// list, not an error.
    async fn direct_children(&self, group: GroupId) -> Result<Vec<GroupId>, GroupHierarchyError>;
}

/// Fixture store with no hierarchy at all.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureGroupHierarchyStore;

#[async_trait]
impl GroupHierarchyStore for FixtureGroupHierarchyStore {
    async fn direct_children(
        &self,
        _group: GroupId,
    ) -> Result<Vec<GroupId>, GroupHierarchyError> {
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[tokio::test]
    async fn fixture_store_reports_no_children() {
        let store = FixtureGroupHierarchyStore;
        let group = GroupId::try_new(1).expect("id");
        assert!(store.direct_children(group).await.expect("lookup").is_empty());
    }

    #[rstest]
    fn errors_render_their_messages() {
        let err = GroupHierarchyError::lookup("row gone");
        assert_eq!(err.to_string(), "group hierarchy lookup failed: row gone");
        let err = GroupHierarchyError::connection("refused");
        assert_eq!(
            err.to_string(),
            "group hierarchy store connection failed: refused"
        );
    }
}
