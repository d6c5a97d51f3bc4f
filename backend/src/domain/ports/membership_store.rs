//! Port for membership mutations.

use async_trait::async_trait;

use crate::domain::{GroupId, UserId};

/// Write access to the membership relation.
///
/// The collaborator reports failure only as `false`, with no structured
/// error; this mirrors its contract and keeps the bulk processor's
/// best-effort tallying honest. Each call is independently atomic; no
/// transaction spans multiple calls.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MembershipStore: Send + Sync {
    /// Add `user` to `group`. Returns `true` when the user is a member
    /// afterwards (joining an already-joined group counts as success).
    async fn join(&self, group: GroupId, user: UserId) -> bool;

    /// Remove `user` from `group`. Returns `true` when a membership row
    /// was removed.
    async fn leave(&self, group: GroupId, user: UserId) -> bool;
}

/// Fixture store that accepts every mutation.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureMembershipStore;

#[async_trait]
impl MembershipStore for FixtureMembershipStore {
    async fn join(&self, _group: GroupId, _user: UserId) -> bool {
        true
    }

    async fn leave(&self, _group: GroupId, _user: UserId) -> bool {
        true
    }
}
