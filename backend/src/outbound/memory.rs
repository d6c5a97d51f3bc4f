//! In-memory directory adapter.
//!
//! Backs every driven port for development deployments and integration
//! tests. Production wires these ports to the host directory instead; this
//! adapter's job is to honour the port contracts exactly, including the
//! boolean-only mutation results and single-use token consumption.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::{Mutex, RwLock};

use async_trait::async_trait;

use crate::domain::filter::MembershipPredicate;
use crate::domain::ports::{
    GroupDirectory, GroupDirectoryError, GroupHierarchyError, GroupHierarchyStore,
    MembershipStore, ModerationPolicy, ReplayTokenVerifier, TokenScope, UserConstraint,
    UserDirectory, UserDirectoryError, UserListFilter, UserPage,
};
use crate::domain::{ActorId, Group, GroupId, ReplayToken, UserId};

#[derive(Debug, Default)]
struct DirectoryState {
    groups: BTreeMap<GroupId, Group>,
    users: BTreeSet<UserId>,
    memberships: BTreeSet<(GroupId, UserId)>,
}

/// In-memory group/user directory.
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    state: RwLock<DirectoryState>,
}

impl InMemoryDirectory {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a group.
    pub fn add_group(&self, group: Group) {
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        state.groups.insert(group.id, group);
    }

    /// Register a user.
    pub fn add_user(&self, user: UserId) {
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        state.users.insert(user);
    }

    /// Whether the membership pair exists.
    pub fn is_member(&self, group: GroupId, user: UserId) -> bool {
        let state = self.state.read().unwrap_or_else(|e| e.into_inner());
        state.memberships.contains(&(group, user))
    }

    fn groups_of(state: &DirectoryState, user: UserId) -> Vec<GroupId> {
        state
            .memberships
            .iter()
            .filter(|(_, member)| *member == user)
            .map(|(group, _)| *group)
            .collect()
    }

    fn matches(state: &DirectoryState, user: UserId, constraint: &UserConstraint) -> bool {
        match constraint {
            UserConstraint::Membership(MembershipPredicate::WithoutGroup) => {
                Self::groups_of(state, user).is_empty()
            }
            UserConstraint::Membership(MembershipPredicate::InAnyOf(groups)) => {
                let wanted: HashSet<GroupId> = groups.iter().copied().collect();
                Self::groups_of(state, user)
                    .iter()
                    .any(|group| wanted.contains(group))
            }
        }
    }
}

#[async_trait]
impl GroupHierarchyStore for InMemoryDirectory {
    async fn direct_children(
        &self,
        group: GroupId,
    ) -> Result<Vec<GroupId>, GroupHierarchyError> {
        let state = self.state.read().unwrap_or_else(|e| e.into_inner());
        Ok(state
            .groups
            .values()
            .filter(|candidate| candidate.parent_id == Some(group))
            .map(|candidate| candidate.id)
            .collect())
    }
}

#[async_trait]
impl MembershipStore for InMemoryDirectory {
    async fn join(&self, group: GroupId, user: UserId) -> bool {
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        if !state.groups.contains_key(&group) || !state.users.contains(&user) {
            return false;
        }
        state.memberships.insert((group, user));
        true
    }

    async fn leave(&self, group: GroupId, user: UserId) -> bool {
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        state.memberships.remove(&(group, user))
    }
}

#[async_trait]
impl GroupDirectory for InMemoryDirectory {
    async fn list_groups(&self) -> Result<Vec<Group>, GroupDirectoryError> {
        let state = self.state.read().unwrap_or_else(|e| e.into_inner());
        Ok(state.groups.values().cloned().collect())
    }

    async fn member_count(&self, group: GroupId) -> Result<u64, GroupDirectoryError> {
        let state = self.state.read().unwrap_or_else(|e| e.into_inner());
        Ok(state
            .memberships
            .iter()
            .filter(|(member_group, _)| *member_group == group)
            .count() as u64)
    }

    async fn without_group_count(&self) -> Result<u64, GroupDirectoryError> {
        let state = self.state.read().unwrap_or_else(|e| e.into_inner());
        Ok(state
            .users
            .iter()
            .filter(|&&user| Self::groups_of(&state, user).is_empty())
            .count() as u64)
    }

    async fn groups_for_user(&self, user: UserId) -> Result<Vec<Group>, GroupDirectoryError> {
        let state = self.state.read().unwrap_or_else(|e| e.into_inner());
        let mut groups: Vec<Group> = Self::groups_of(&state, user)
            .into_iter()
            .filter_map(|group| state.groups.get(&group).cloned())
            .collect();
        groups.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(groups)
    }
}

#[async_trait]
impl UserDirectory for InMemoryDirectory {
    async fn list_users(&self, filter: &UserListFilter) -> Result<UserPage, UserDirectoryError> {
        let state = self.state.read().unwrap_or_else(|e| e.into_inner());
        let matching: Vec<UserId> = state
            .users
            .iter()
            .copied()
            .filter(|&user| {
                filter
                    .constraints
                    .iter()
                    .all(|constraint| Self::matches(&state, user, constraint))
            })
            .collect();

        let total = matching.len() as u64;
        let start = (filter.page.saturating_sub(1) as usize) * filter.per_page as usize;
        let user_ids = matching
            .into_iter()
            .skip(start)
            .take(filter.per_page as usize)
            .collect();

        Ok(UserPage {
            user_ids,
            total,
            page: filter.page,
        })
    }
}

/// Moderation policy backed by an explicit allow list.
#[derive(Debug, Default)]
pub struct AllowListModerationPolicy {
    moderators: RwLock<BTreeSet<ActorId>>,
}

impl AllowListModerationPolicy {
    /// Create an empty policy; nobody may moderate until allowed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Grant the moderate-groups capability to an actor.
    pub fn allow(&self, actor: ActorId) {
        let mut moderators = self.moderators.write().unwrap_or_else(|e| e.into_inner());
        moderators.insert(actor);
    }
}

#[async_trait]
impl ModerationPolicy for AllowListModerationPolicy {
    async fn can_moderate_groups(&self, actor: ActorId) -> bool {
        let moderators = self.moderators.read().unwrap_or_else(|e| e.into_inner());
        moderators.contains(&actor)
    }
}

/// Single-use replay token store.
///
/// Issued tokens verify exactly once; verification consumes them, so a
/// resubmitted form fails the token gate.
#[derive(Debug, Default)]
pub struct SingleUseTokenStore {
    issued: Mutex<HashSet<(String, &'static str)>>,
}

impl SingleUseTokenStore {
    /// Create an empty token store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a token as valid for one verification in the given scope.
    pub fn issue(&self, token: &ReplayToken, scope: TokenScope) {
        let mut issued = self.issued.lock().unwrap_or_else(|e| e.into_inner());
        issued.insert((token.as_str().to_owned(), scope.as_str()));
    }
}

#[async_trait]
impl ReplayTokenVerifier for SingleUseTokenStore {
    async fn verify(&self, token: &ReplayToken, scope: TokenScope) -> bool {
        let mut issued = self.issued.lock().unwrap_or_else(|e| e.into_inner());
        issued.remove(&(token.as_str().to_owned(), scope.as_str()))
    }
}
