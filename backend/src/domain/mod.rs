//! Domain types and services for group membership administration.
//!
//! Purpose: keep the membership-filter and bulk-mutation logic free of
//! transport and storage concerns. Adapters depend on this module through
//! the traits in [`ports`]; nothing in here imports actix or a database.
//!
//! Public surface:
//! - Identifier newtypes ([`GroupId`], [`UserId`], [`ActorId`], [`ReplayToken`]).
//! - [`Group`] and [`GroupRef`] — the group aggregate and the tagged
//!   reference that replaces the legacy `-1` "without group" sentinel.
//! - [`HierarchyExpander`] — reachable-set computation over the group forest.
//! - [`MembershipQueryFilter`] — membership predicate construction.
//! - [`BulkMembershipProcessor`] — validated, best-effort batch mutations.
//! - [`DomainError`] / [`ErrorCode`] — transport-agnostic error payload.

pub mod bulk;
pub mod error;
pub mod filter;
pub mod group;
pub mod group_options;
pub mod hierarchy;
pub mod ids;
pub mod ports;
pub mod redirect;
pub mod user_list;

pub use self::bulk::{BatchOutcome, BulkMembershipProcessor, MutationBatch, MutationResult};
pub use self::error::{DomainError, ErrorCode};
pub use self::filter::{GroupFilterParams, MembershipPredicate, MembershipQueryFilter};
pub use self::group::{Group, GroupOption, GroupRef};
pub use self::group_options::GroupOptionsService;
pub use self::hierarchy::HierarchyExpander;
pub use self::ids::{ActorId, GroupId, IdValidationError, ReplayToken, UserId};
pub use self::redirect::Redirect;
pub use self::user_list::{UserListRequest, UserListService};

/// Convenient result alias for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
