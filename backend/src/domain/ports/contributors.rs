//! Explicit extension points for the listing and mutation pipelines.
//!
//! Registration is configuration passed at construction: the user list
//! service takes its predicate contributors, the bulk processor takes its
//! mutation observers. There is no process-wide registry.

use async_trait::async_trait;

use crate::domain::bulk::MutationResult;
use crate::domain::ports::UserConstraint;
use crate::domain::user_list::UserListRequest;

/// Contributes one optional constraint to a user listing.
///
/// Contributors are invoked in registration order; each may add a
/// constraint or decline. They must never remove constraints added by
/// earlier contributors.
#[async_trait]
pub trait PredicateContributor: Send + Sync {
    /// Inspect the request and optionally contribute a constraint.
    async fn contribute(&self, request: &UserListRequest) -> Option<UserConstraint>;
}

/// Observes completed bulk mutations.
///
/// Observers run after the apply phase, in registration order. They see
/// the tallied result; they cannot veto or amend it.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MutationObserver: Send + Sync {
    /// Called once per completed batch.
    async fn on_applied(&self, result: &MutationResult);
}
