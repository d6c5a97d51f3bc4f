//! Read-path use case: list directory users with composed constraints.

use std::sync::Arc;

use tracing::debug;

use crate::domain::filter::GroupFilterParams;
use crate::domain::ports::{
    PredicateContributor, UserDirectory, UserDirectoryError, UserListFilter, UserPage,
};
use crate::domain::{DomainError, DomainResult};

/// Default page size for the admin user listing.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// One page-of-users request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserListRequest {
    /// Group filter inputs.
    pub filter: GroupFilterParams,
    /// One-based page number; zero is normalised to one.
    pub page: u32,
}

impl UserListRequest {
    fn page_or_first(&self) -> u32 {
        self.page.max(1)
    }
}

/// Composes registered predicate contributors over the base user query.
///
/// Contributors are invoked in registration order and each may append one
/// constraint; the composed filter is additive over the directory
/// adapter's own base filtering.
#[derive(Clone)]
pub struct UserListService {
    directory: Arc<dyn UserDirectory>,
    contributors: Vec<Arc<dyn PredicateContributor>>,
}

impl UserListService {
    /// Create a service over the given directory with explicitly
    /// registered contributors.
    pub fn new(
        directory: Arc<dyn UserDirectory>,
        contributors: Vec<Arc<dyn PredicateContributor>>,
    ) -> Self {
        Self {
            directory,
            contributors,
        }
    }

    /// List one page of users matching the composed constraints.
    pub async fn list(&self, request: &UserListRequest) -> DomainResult<UserPage> {
        let mut filter = UserListFilter {
            page: request.page_or_first(),
            per_page: DEFAULT_PAGE_SIZE,
            constraints: Vec::new(),
        };

        for contributor in &self.contributors {
            if let Some(constraint) = contributor.contribute(request).await {
                filter.constraints.push(constraint);
            }
        }
        debug!(
            page = filter.page,
            constraints = filter.constraints.len(),
            "listing users"
        );

        self.directory
            .list_users(&filter)
            .await
            .map_err(map_directory_error)
    }
}

fn map_directory_error(error: UserDirectoryError) -> DomainError {
    match error {
        UserDirectoryError::Connection { message } => {
            DomainError::internal(format!("user directory unavailable: {message}"))
        }
        UserDirectoryError::Query { message } => {
            DomainError::internal(format!("user directory error: {message}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::filter::MembershipPredicate;
    use crate::domain::ports::{MockUserDirectory, UserConstraint};
    use crate::domain::{GroupId, UserId};
    use async_trait::async_trait;
    use rstest::rstest;

    struct StaticContributor(Option<UserConstraint>);

    #[async_trait]
    impl PredicateContributor for StaticContributor {
        async fn contribute(&self, _request: &UserListRequest) -> Option<UserConstraint> {
            self.0.clone()
        }
    }

    fn membership_constraint(raw: i64) -> UserConstraint {
        UserConstraint::Membership(MembershipPredicate::InAnyOf(vec![
            GroupId::try_new(raw).expect("positive id"),
        ]))
    }

    #[rstest]
    #[tokio::test]
    async fn composes_contributions_in_registration_order() {
        let first = membership_constraint(1);
        let second = membership_constraint(2);
        let expected = vec![first.clone(), second.clone()];

        let mut directory = MockUserDirectory::new();
        directory
            .expect_list_users()
            .withf(move |filter| filter.constraints == expected)
            .return_once(|filter| {
                Ok(UserPage {
                    user_ids: vec![UserId::try_new(7).expect("id")],
                    total: 1,
                    page: filter.page,
                })
            });

        let service = UserListService::new(
            Arc::new(directory),
            vec![
                Arc::new(StaticContributor(Some(first))),
                Arc::new(StaticContributor(None)),
                Arc::new(StaticContributor(Some(second))),
            ],
        );

        let page = service
            .list(&UserListRequest::default())
            .await
            .expect("listing succeeds");
        assert_eq!(page.total, 1);
    }

    #[rstest]
    #[tokio::test]
    async fn declining_contributors_leave_the_base_query_untouched() {
        let mut directory = MockUserDirectory::new();
        directory
            .expect_list_users()
            .withf(|filter| filter.constraints.is_empty() && filter.page == 1)
            .return_once(|filter| {
                Ok(UserPage {
                    user_ids: Vec::new(),
                    total: 0,
                    page: filter.page,
                })
            });

        let service = UserListService::new(
            Arc::new(directory),
            vec![Arc::new(StaticContributor(None))],
        );

        let page = service
            .list(&UserListRequest::default())
            .await
            .expect("listing succeeds");
        assert_eq!(page.page, 1);
    }

    #[rstest]
    #[tokio::test]
    async fn directory_failures_surface_as_internal_errors() {
        let mut directory = MockUserDirectory::new();
        directory
            .expect_list_users()
            .return_once(|_| Err(UserDirectoryError::query("boom")));

        let service = UserListService::new(Arc::new(directory), Vec::new());

        let err = service
            .list(&UserListRequest::default())
            .await
            .expect_err("listing fails");
        assert_eq!(err.code(), crate::domain::ErrorCode::InternalError);
    }
}
