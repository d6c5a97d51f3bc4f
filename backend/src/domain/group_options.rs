//! Group selection option listing.
//!
//! Produces the `(id, name, parent, member count)` tuples that selection
//! widgets consume. Rendering is someone else's job.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::domain::group::{Group, GroupOption, GroupRef};
use crate::domain::ports::{GroupDirectory, GroupDirectoryError};
use crate::domain::{DomainError, DomainResult, GroupId};

/// Display name of the synthetic without-group entry.
const WITHOUT_GROUP_LABEL: &str = "Without group";

/// Assembles selection option lists from the group directory.
#[derive(Clone)]
pub struct GroupOptionsService {
    directory: Arc<dyn GroupDirectory>,
}

impl GroupOptionsService {
    /// Create a service over the given directory.
    pub fn new(directory: Arc<dyn GroupDirectory>) -> Self {
        Self { directory }
    }

    /// List selection options: groups depth first under their parents,
    /// siblings in name order, each annotated with its member count.
    ///
    /// With `show_without_group` a synthetic entry for users without any
    /// membership is prepended, counted across the whole directory.
    pub async fn options(&self, show_without_group: bool) -> DomainResult<Vec<GroupOption>> {
        let groups = self
            .directory
            .list_groups()
            .await
            .map_err(map_directory_error)?;

        let mut options = Vec::with_capacity(groups.len() + usize::from(show_without_group));
        if show_without_group {
            let count = self
                .directory
                .without_group_count()
                .await
                .map_err(map_directory_error)?;
            options.push(GroupOption {
                id: GroupRef::WithoutGroup,
                name: WITHOUT_GROUP_LABEL.to_owned(),
                parent_id: None,
                depth: 0,
                member_count: count,
            });
        }

        for (group, depth) in walk_forest(&groups) {
            let member_count = self
                .directory
                .member_count(group.id)
                .await
                .map_err(map_directory_error)?;
            options.push(GroupOption {
                id: GroupRef::Group(group.id),
                name: group.name.clone(),
                parent_id: group.parent_id,
                depth,
                member_count,
            });
        }

        Ok(options)
    }

    /// Groups the user belongs to, in name order.
    pub async fn groups_for_user(&self, user: crate::domain::UserId) -> DomainResult<Vec<Group>> {
        self.directory
            .groups_for_user(user)
            .await
            .map_err(map_directory_error)
    }
}

/// Flatten the forest depth first: roots first, siblings sorted by name
/// then id, children directly under their parent with depth + 1. Groups
/// whose parent is unknown are treated as roots rather than dropped.
fn walk_forest(groups: &[Group]) -> Vec<(&Group, u32)> {
    let known: BTreeMap<GroupId, &Group> = groups.iter().map(|g| (g.id, g)).collect();
    let mut children: BTreeMap<Option<GroupId>, Vec<&Group>> = BTreeMap::new();
    for group in groups {
        let parent = group
            .parent_id
            .filter(|parent| known.contains_key(parent));
        children.entry(parent).or_default().push(group);
    }
    for siblings in children.values_mut() {
        siblings.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
    }

    let mut ordered = Vec::with_capacity(groups.len());
    let mut stack: Vec<(&Group, u32)> = children
        .get(&None)
        .map(|roots| roots.iter().rev().map(|&g| (g, 0)).collect())
        .unwrap_or_default();
    while let Some((group, depth)) = stack.pop() {
        ordered.push((group, depth));
        if let Some(kids) = children.get(&Some(group.id)) {
            for &kid in kids.iter().rev() {
                stack.push((kid, depth + 1));
            }
        }
    }
    ordered
}

fn map_directory_error(error: GroupDirectoryError) -> DomainError {
    match error {
        GroupDirectoryError::Connection { message } => {
            DomainError::internal(format!("group directory unavailable: {message}"))
        }
        GroupDirectoryError::Query { message } => {
            DomainError::internal(format!("group directory error: {message}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::MockGroupDirectory;
    use rstest::rstest;

    fn gid(raw: i64) -> GroupId {
        GroupId::try_new(raw).expect("positive id")
    }

    fn forest() -> Vec<Group> {
        vec![
            Group::new(gid(1), None, "Staff"),
            Group::new(gid(2), Some(gid(1)), "Engineering"),
            Group::new(gid(3), Some(gid(1)), "Design"),
            Group::new(gid(4), Some(gid(2)), "Platform"),
            Group::new(gid(5), None, "Alumni"),
        ]
    }

    #[rstest]
    fn walk_orders_depth_first_with_sorted_siblings() {
        let groups = forest();
        let ordered: Vec<(i64, u32)> = walk_forest(&groups)
            .into_iter()
            .map(|(group, depth)| (group.id.get(), depth))
            .collect();

        // Alumni and Staff are roots (name order); Design before
        // Engineering under Staff; Platform nested under Engineering.
        assert_eq!(ordered, vec![(5, 0), (1, 0), (3, 1), (2, 1), (4, 2)]);
    }

    #[rstest]
    fn orphaned_groups_surface_as_roots() {
        let groups = vec![Group::new(gid(7), Some(gid(999)), "Orphan")];
        let ordered = walk_forest(&groups);
        assert_eq!(ordered.len(), 1);
        assert_eq!(ordered[0].1, 0);
    }

    #[rstest]
    #[tokio::test]
    async fn options_annotate_member_counts() {
        let mut directory = MockGroupDirectory::new();
        directory
            .expect_list_groups()
            .return_once(|| Ok(vec![Group::new(gid(1), None, "Staff")]));
        directory
            .expect_member_count()
            .withf(|group| group.get() == 1)
            .return_once(|_| Ok(12));

        let service = GroupOptionsService::new(Arc::new(directory));
        let options = service.options(false).await.expect("options");

        assert_eq!(options.len(), 1);
        assert_eq!(options[0].member_count, 12);
        assert_eq!(options[0].id, GroupRef::Group(gid(1)));
    }

    #[rstest]
    #[tokio::test]
    async fn without_group_entry_is_prepended_with_its_count() {
        let mut directory = MockGroupDirectory::new();
        directory
            .expect_list_groups()
            .return_once(|| Ok(vec![Group::new(gid(1), None, "Staff")]));
        directory.expect_member_count().return_once(|_| Ok(3));
        directory.expect_without_group_count().return_once(|| Ok(8));

        let service = GroupOptionsService::new(Arc::new(directory));
        let options = service.options(true).await.expect("options");

        assert_eq!(options.len(), 2);
        assert_eq!(options[0].id, GroupRef::WithoutGroup);
        assert_eq!(options[0].member_count, 8);
        assert_eq!(options[0].name, "Without group");
    }

    #[rstest]
    #[tokio::test]
    async fn directory_failures_surface_as_internal_errors() {
        let mut directory = MockGroupDirectory::new();
        directory
            .expect_list_groups()
            .return_once(|| Err(GroupDirectoryError::connection("down")));

        let service = GroupOptionsService::new(Arc::new(directory));
        let err = service.options(false).await.expect_err("fails");
        assert_eq!(err.code(), crate::domain::ErrorCode::InternalError);
    }
}
