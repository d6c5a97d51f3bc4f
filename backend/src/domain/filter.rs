//! Membership predicate construction for the user listing query.

use async_trait::async_trait;

use crate::domain::group::GroupRef;
use crate::domain::hierarchy::HierarchyExpander;
use crate::domain::ports::{PredicateContributor, UserConstraint};
use crate::domain::user_list::UserListRequest;
use crate::domain::GroupId;

/// Additive membership constraint embedded into the base user query.
///
/// The predicate is AND-ed onto whatever filtering the caller already
/// applies; it never removes or reorders an existing constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MembershipPredicate {
    /// User id IS IN the membership rows of any of these groups.
    /// The set is deduplicated before being embedded.
    InAnyOf(Vec<GroupId>),
    /// User id appears in no membership row at all.
    WithoutGroup,
}

/// Group filter inputs, each obtainable from two request sources.
///
/// The structured query field prevails over the raw request parameter on
/// conflict. Zero and absent both count as unset, so an explicit zero in
/// the structured source falls through to the raw source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GroupFilterParams {
    /// Group id from the structured query object.
    pub structured_group: Option<i64>,
    /// Group id from the raw request parameters.
    pub raw_group: Option<i64>,
    /// Hierarchy flag from the structured query object.
    pub structured_hierarchy: Option<bool>,
    /// Hierarchy flag from the raw request parameters.
    pub raw_hierarchy: Option<bool>,
}

impl GroupFilterParams {
    /// Resolve the two group sources into a tagged reference.
    ///
    /// Returns `None` when the filter is unset in both sources, which makes
    /// the whole filter a no-op.
    pub fn group(&self) -> Option<GroupRef> {
        self.structured_group
            .and_then(GroupRef::from_raw)
            .or_else(|| self.raw_group.and_then(GroupRef::from_raw))
    }

    /// Resolve the hierarchy flag, structured source first.
    pub fn include_hierarchy(&self) -> bool {
        self.structured_hierarchy
            .or(self.raw_hierarchy)
            .unwrap_or(false)
    }
}

/// Builds membership predicates from filter parameters.
///
/// Registered with the user list service as one predicate contributor
/// among possibly several.
#[derive(Clone)]
pub struct MembershipQueryFilter {
    expander: HierarchyExpander,
}

impl MembershipQueryFilter {
    /// Create a filter backed by the given hierarchy expander.
    pub fn new(expander: HierarchyExpander) -> Self {
        Self { expander }
    }

    /// Translate filter parameters into a predicate, or `None` when the
    /// filter is unset.
    pub async fn predicate(&self, params: &GroupFilterParams) -> Option<MembershipPredicate> {
        match params.group()? {
            GroupRef::WithoutGroup => Some(MembershipPredicate::WithoutGroup),
            GroupRef::Group(group) => {
                let groups = if params.include_hierarchy() {
                    self.expander.expand(&[group]).await
                } else {
                    vec![group]
                };
                Some(MembershipPredicate::InAnyOf(groups))
            }
        }
    }
}

#[async_trait]
impl PredicateContributor for MembershipQueryFilter {
    async fn contribute(&self, request: &UserListRequest) -> Option<UserConstraint> {
        self.predicate(&request.filter)
            .await
            .map(UserConstraint::Membership)
    }
}
