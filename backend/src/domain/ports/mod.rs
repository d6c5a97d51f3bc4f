//! Domain ports defining the edges of the hexagon.
//!
//! Ports describe how the domain expects to interact with collaborators:
//! the group/user store on the driven side, and the explicit extension
//! points (predicate contributors, mutation observers) on the driving
//! side. Extensions are registered at construction; there is no global
//! registry.

mod contributors;
mod group_directory;
mod group_hierarchy;
mod membership_store;
mod moderation;
mod replay_token;
mod user_directory;

#[cfg(test)]
pub use contributors::MockMutationObserver;
pub use contributors::{MutationObserver, PredicateContributor};
#[cfg(test)]
pub use group_directory::MockGroupDirectory;
pub use group_directory::{FixtureGroupDirectory, GroupDirectory, GroupDirectoryError};
#[cfg(test)]
pub use group_hierarchy::MockGroupHierarchyStore;
pub use group_hierarchy::{FixtureGroupHierarchyStore, GroupHierarchyError, GroupHierarchyStore};
#[cfg(test)]
pub use membership_store::MockMembershipStore;
pub use membership_store::{FixtureMembershipStore, MembershipStore};
#[cfg(test)]
pub use moderation::MockModerationPolicy;
pub use moderation::{DenyAllModerationPolicy, ModerationPolicy};
#[cfg(test)]
pub use replay_token::MockReplayTokenVerifier;
pub use replay_token::{RejectAllReplayTokenVerifier, ReplayTokenVerifier, TokenScope};
#[cfg(test)]
pub use user_directory::MockUserDirectory;
pub use user_directory::{
    FixtureUserDirectory, UserConstraint, UserDirectory, UserDirectoryError, UserListFilter,
    UserPage,
};
