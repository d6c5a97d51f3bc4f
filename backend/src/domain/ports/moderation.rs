//! Port for the authorization capability check.

use async_trait::async_trait;

use crate::domain::ActorId;

/// Boolean capability check owned by the host's permission system.
///
/// The domain does not model roles or permissions; it asks one question.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ModerationPolicy: Send + Sync {
    /// Whether the actor may moderate group membership.
    async fn can_moderate_groups(&self, actor: ActorId) -> bool;
}

/// Policy denying every actor, the safe default for unwired deployments.
#[derive(Debug, Default, Clone, Copy)]
pub struct DenyAllModerationPolicy;

#[async_trait]
impl ModerationPolicy for DenyAllModerationPolicy {
    async fn can_moderate_groups(&self, _actor: ActorId) -> bool {
        false
    }
}
