//! Bulk membership mutation processing.
//!
//! One processor invocation covers one submitted batch: validate, apply
//! best-effort, tally, and hand back a terminal outcome with a sanitized
//! redirect. Nothing here renders or persists; storage effects go through
//! the [`MembershipStore`] port one call at a time.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, info};

use crate::domain::ids::{ActorId, GroupId, ReplayToken, UserId};
use crate::domain::ports::{
    MembershipStore, ModerationPolicy, MutationObserver, ReplayTokenVerifier, TokenScope,
};
use crate::domain::redirect::Redirect;

/// One inbound batch mutation request, consumed once.
#[derive(Debug, Clone)]
pub struct MutationBatch {
    /// Actor submitting the batch.
    pub actor: ActorId,
    /// Target users, possibly with duplicates; each action is applied at
    /// most once per distinct user.
    pub user_ids: Vec<UserId>,
    /// Group the users should join, if any.
    pub join_group: Option<GroupId>,
    /// Group the users should leave, if any.
    pub leave_group: Option<GroupId>,
    /// Anti-replay token accompanying the request.
    pub replay_token: Option<ReplayToken>,
    /// Page the caller was on, carried into the redirect.
    pub page: u32,
    /// Raw referring location; sanitized before being echoed back.
    pub return_url: String,
}

/// Tally produced by the apply phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MutationResult {
    /// Successful join calls.
    pub joined: u32,
    /// Successful leave calls.
    pub left: u32,
    /// Group the join action targeted, when present.
    pub join_group: Option<GroupId>,
    /// Group the leave action targeted, when present.
    pub leave_group: Option<GroupId>,
}

/// Terminal state of one batch request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOutcome {
    /// The batch passed validation and was applied (possibly partially).
    Completed {
        /// Tallied mutation counts.
        result: MutationResult,
        /// Sanitized return location.
        redirect: Redirect,
    },
    /// A validation gate failed; no mutation happened.
    Rejected {
        /// Sanitized return location.
        redirect: Redirect,
    },
}

/// Why a batch was rejected. Rejections are silent towards the caller;
/// the reason only reaches the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RejectionReason {
    NoAction,
    NotPermitted,
    BadReplayToken,
    SameGroupJoinLeave,
    NoUsers,
}

impl RejectionReason {
    const fn as_str(self) -> &'static str {
        match self {
            Self::NoAction => "no join or leave action",
            Self::NotPermitted => "actor cannot moderate groups",
            Self::BadReplayToken => "replay token missing or invalid",
            Self::SameGroupJoinLeave => "join and leave name the same group",
            Self::NoUsers => "no target users",
        }
    }
}

/// Validates and applies batched membership mutations.
///
/// The lifecycle is `Received -> Validated -> Applied -> Completed`, with a
/// short-circuit to `Rejected`. Rejections carry no error payload: the
/// caller is redirected to the sanitized return location with nothing
/// applied. The apply phase is best effort; a failed storage call lowers
/// the tally and processing moves on.
#[derive(Clone)]
pub struct BulkMembershipProcessor {
    memberships: Arc<dyn MembershipStore>,
    policy: Arc<dyn ModerationPolicy>,
    tokens: Arc<dyn ReplayTokenVerifier>,
    observers: Vec<Arc<dyn MutationObserver>>,
}

impl BulkMembershipProcessor {
    /// Create a processor with explicitly registered mutation observers.
    pub fn new(
        memberships: Arc<dyn MembershipStore>,
        policy: Arc<dyn ModerationPolicy>,
        tokens: Arc<dyn ReplayTokenVerifier>,
        observers: Vec<Arc<dyn MutationObserver>>,
    ) -> Self {
        Self {
            memberships,
            policy,
            tokens,
            observers,
        }
    }

    /// Process one batch to its terminal outcome.
    pub async fn process(&self, batch: MutationBatch) -> BatchOutcome {
        let redirect = Redirect::sanitized(&batch.return_url, batch.page);

        if let Err(reason) = self.validate(&batch).await {
            debug!(actor = %batch.actor, reason = reason.as_str(), "bulk batch rejected");
            return BatchOutcome::Rejected { redirect };
        }

        let result = self.apply(&batch).await;
        info!(
            actor = %batch.actor,
            joined = result.joined,
            left = result.left,
            "bulk batch applied"
        );

        for observer in &self.observers {
            observer.on_applied(&result).await;
        }

        BatchOutcome::Completed { result, redirect }
    }

    /// The validation gate. All checks must hold before any mutation; the
    /// replay token is verified on every batch, never cached from an
    /// earlier validation.
    async fn validate(&self, batch: &MutationBatch) -> Result<(), RejectionReason> {
        if batch.join_group.is_none() && batch.leave_group.is_none() {
            return Err(RejectionReason::NoAction);
        }
        if !self.policy.can_moderate_groups(batch.actor).await {
            return Err(RejectionReason::NotPermitted);
        }
        let verified = match &batch.replay_token {
            Some(token) => self.tokens.verify(token, TokenScope::BulkMembership).await,
            None => false,
        };
        if !verified {
            return Err(RejectionReason::BadReplayToken);
        }
        // Joining and leaving the same group in one batch is a rejection,
        // not a no-op cancellation.
        if let (Some(join), Some(leave)) = (batch.join_group, batch.leave_group) {
            if join == leave {
                return Err(RejectionReason::SameGroupJoinLeave);
            }
        }
        if batch.user_ids.is_empty() {
            return Err(RejectionReason::NoUsers);
        }
        Ok(())
    }

    /// Apply phase: distinct users in first-seen order, join before leave
    /// per user. Storage reports failure as `false`; failures are not
    /// retried and do not abort the batch.
    async fn apply(&self, batch: &MutationBatch) -> MutationResult {
        let mut result = MutationResult {
            join_group: batch.join_group,
            leave_group: batch.leave_group,
            ..MutationResult::default()
        };

        let mut seen: HashSet<UserId> = HashSet::with_capacity(batch.user_ids.len());
        for &user in &batch.user_ids {
            if !seen.insert(user) {
                continue;
            }
            if let Some(group) = batch.join_group {
                if self.memberships.join(group, user).await {
                    result.joined += 1;
                } else {
                    debug!(%group, %user, "join call reported failure");
                }
            }
            if let Some(group) = batch.leave_group {
                if self.memberships.leave(group, user).await {
                    result.left += 1;
                } else {
                    debug!(%group, %user, "leave call reported failure");
                }
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::domain::ports::{
        MockMembershipStore, MockModerationPolicy, MockMutationObserver, MockReplayTokenVerifier,
    };
    use rstest::rstest;

    fn gid(raw: i64) -> GroupId {
        GroupId::try_new(raw).expect("positive id")
    }

    fn uid(raw: i64) -> UserId {
        UserId::try_new(raw).expect("positive id")
    }

    fn actor() -> ActorId {
        ActorId::try_new(99).expect("positive id")
    }

    fn token() -> Option<ReplayToken> {
        ReplayToken::new("tok")
    }

    fn permitting_policy() -> MockModerationPolicy {
        let mut policy = MockModerationPolicy::new();
        policy.expect_can_moderate_groups().returning(|_| true);
        policy
    }

    fn accepting_verifier() -> MockReplayTokenVerifier {
        let mut verifier = MockReplayTokenVerifier::new();
        verifier.expect_verify().returning(|_, _| true);
        verifier
    }

    fn processor(
        memberships: MockMembershipStore,
        policy: MockModerationPolicy,
        tokens: MockReplayTokenVerifier,
    ) -> BulkMembershipProcessor {
        BulkMembershipProcessor::new(
            Arc::new(memberships),
            Arc::new(policy),
            Arc::new(tokens),
            Vec::new(),
        )
    }

    fn batch() -> MutationBatch {
        MutationBatch {
            actor: actor(),
            user_ids: vec![uid(1), uid(2), uid(3)],
            join_group: Some(gid(10)),
            leave_group: None,
            replay_token: token(),
            page: 2,
            return_url: "http://host/users?page=2&join_group=10&users=1".to_owned(),
        }
    }

    fn untouchable_store() -> MockMembershipStore {
        let mut store = MockMembershipStore::new();
        store.expect_join().times(0);
        store.expect_leave().times(0);
        store
    }

    #[rstest]
    #[tokio::test]
    async fn applies_join_to_every_user_and_tallies() {
        let mut store = MockMembershipStore::new();
        store.expect_join().times(3).returning(|_, _| true);
        store.expect_leave().times(0);

        let processor = processor(store, permitting_policy(), accepting_verifier());
        let outcome = processor.process(batch()).await;

        let BatchOutcome::Completed { result, redirect } = outcome else {
            panic!("expected completion");
        };
        assert_eq!(result.joined, 3);
        assert_eq!(result.left, 0);
        assert_eq!(result.join_group, Some(gid(10)));
        assert_eq!(result.leave_group, None);
        // One-time mutation markers are gone from the redirect.
        assert_eq!(redirect.location, "http://host/users?page=2");
        assert_eq!(redirect.page, 2);
    }

    #[rstest]
    #[tokio::test]
    async fn storage_failures_lower_the_tally_without_aborting() {
        let mut store = MockMembershipStore::new();
        store
            .expect_join()
            .times(3)
            .returning(|_, user| user.get() != 2);

        let processor = processor(store, permitting_policy(), accepting_verifier());
        let outcome = processor.process(batch()).await;

        let BatchOutcome::Completed { result, .. } = outcome else {
            panic!("expected completion");
        };
        assert_eq!(result.joined, 2);
    }

    #[rstest]
    #[tokio::test]
    async fn duplicate_user_ids_are_applied_once() {
        let mut store = MockMembershipStore::new();
        store.expect_join().times(2).returning(|_, _| true);

        let mut request = batch();
        request.user_ids = vec![uid(1), uid(2), uid(1), uid(2), uid(1)];
        let processor = processor(store, permitting_policy(), accepting_verifier());
        let outcome = processor.process(request).await;

        let BatchOutcome::Completed { result, .. } = outcome else {
            panic!("expected completion");
        };
        assert_eq!(result.joined, 2);
    }

    #[rstest]
    #[tokio::test]
    async fn joins_run_before_leaves_for_each_user() {
        let order: Arc<Mutex<Vec<(&'static str, i64)>>> = Arc::new(Mutex::new(Vec::new()));
        let mut store = MockMembershipStore::new();
        let join_order = Arc::clone(&order);
        store.expect_join().times(2).returning(move |_, user| {
            join_order.lock().expect("lock").push(("join", user.get()));
            true
        });
        let leave_order = Arc::clone(&order);
        store.expect_leave().times(2).returning(move |_, user| {
            leave_order.lock().expect("lock").push(("leave", user.get()));
            true
        });

        let mut request = batch();
        request.user_ids = vec![uid(1), uid(2)];
        request.leave_group = Some(gid(11));
        let processor = processor(store, permitting_policy(), accepting_verifier());
        let outcome = processor.process(request).await;

        assert!(matches!(outcome, BatchOutcome::Completed { .. }));
        assert_eq!(
            *order.lock().expect("lock"),
            vec![("join", 1), ("leave", 1), ("join", 2), ("leave", 2)]
        );
    }

    #[rstest]
    #[tokio::test]
    async fn same_group_join_and_leave_is_rejected_outright() {
        let mut request = batch();
        request.leave_group = request.join_group;
        let processor = processor(untouchable_store(), permitting_policy(), accepting_verifier());

        let outcome = processor.process(request).await;
        let BatchOutcome::Rejected { redirect } = outcome else {
            panic!("expected rejection");
        };
        assert_eq!(redirect.location, "http://host/users?page=2");
    }

    #[rstest]
    #[tokio::test]
    async fn missing_actions_are_rejected() {
        let mut request = batch();
        request.join_group = None;
        // Gate fails before any collaborator is consulted.
        let processor = processor(
            untouchable_store(),
            MockModerationPolicy::new(),
            MockReplayTokenVerifier::new(),
        );

        assert!(matches!(
            processor.process(request).await,
            BatchOutcome::Rejected { .. }
        ));
    }

    #[rstest]
    #[tokio::test]
    async fn unpermitted_actors_are_rejected_silently() {
        let mut policy = MockModerationPolicy::new();
        policy.expect_can_moderate_groups().returning(|_| false);
        let processor = processor(untouchable_store(), policy, MockReplayTokenVerifier::new());

        assert!(matches!(
            processor.process(batch()).await,
            BatchOutcome::Rejected { .. }
        ));
    }

    #[rstest]
    #[tokio::test]
    async fn missing_or_invalid_replay_tokens_are_rejected() {
        let mut request = batch();
        request.replay_token = None;
        let processor = processor(
            untouchable_store(),
            permitting_policy(),
            MockReplayTokenVerifier::new(),
        );
        assert!(matches!(
            processor.process(request).await,
            BatchOutcome::Rejected { .. }
        ));

        let mut rejecting = MockReplayTokenVerifier::new();
        rejecting.expect_verify().returning(|_, _| false);
        let processor = processor_with_rejecting_tokens(rejecting);
        assert!(matches!(
            processor.process(batch()).await,
            BatchOutcome::Rejected { .. }
        ));
    }

    fn processor_with_rejecting_tokens(tokens: MockReplayTokenVerifier) -> BulkMembershipProcessor {
        BulkMembershipProcessor::new(
            Arc::new(untouchable_store()),
            Arc::new(permitting_policy()),
            Arc::new(tokens),
            Vec::new(),
        )
    }

    #[rstest]
    #[tokio::test]
    async fn empty_user_lists_are_rejected() {
        let mut request = batch();
        request.user_ids.clear();
        let processor = processor(untouchable_store(), permitting_policy(), accepting_verifier());

        assert!(matches!(
            processor.process(request).await,
            BatchOutcome::Rejected { .. }
        ));
    }

    #[rstest]
    #[tokio::test]
    async fn token_verification_runs_on_every_batch() {
        let mut verifier = MockReplayTokenVerifier::new();
        let mut accepted_once = false;
        verifier.expect_verify().times(2).returning(move |_, _| {
            // Single-use collaborator: first verification consumes the
            // token, the resubmission fails.
            let fresh = !accepted_once;
            accepted_once = true;
            fresh
        });

        let mut store = MockMembershipStore::new();
        store.expect_join().times(3).returning(|_, _| true);

        let processor = BulkMembershipProcessor::new(
            Arc::new(store),
            Arc::new(permitting_policy()),
            Arc::new(verifier),
            Vec::new(),
        );

        assert!(matches!(
            processor.process(batch()).await,
            BatchOutcome::Completed { .. }
        ));
        assert!(matches!(
            processor.process(batch()).await,
            BatchOutcome::Rejected { .. }
        ));
    }

    #[rstest]
    #[tokio::test]
    async fn observers_are_notified_after_apply() {
        let mut store = MockMembershipStore::new();
        store.expect_join().times(3).returning(|_, _| true);

        let mut observer = MockMutationObserver::new();
        observer
            .expect_on_applied()
            .times(1)
            .withf(|result| result.joined == 3 && result.join_group == Some(gid(10)))
            .returning(|_| ());

        let processor = BulkMembershipProcessor::new(
            Arc::new(store),
            Arc::new(permitting_policy()),
            Arc::new(accepting_verifier()),
            vec![Arc::new(observer)],
        );

        assert!(matches!(
            processor.process(batch()).await,
            BatchOutcome::Completed { .. }
        ));
    }

    #[rstest]
    #[tokio::test]
    async fn observers_do_not_run_for_rejected_batches() {
        let mut observer = MockMutationObserver::new();
        observer.expect_on_applied().times(0);

        let mut request = batch();
        request.user_ids.clear();
        let processor = BulkMembershipProcessor::new(
            Arc::new(untouchable_store()),
            Arc::new(permitting_policy()),
            Arc::new(accepting_verifier()),
            vec![Arc::new(observer)],
        );

        assert!(matches!(
            processor.process(request).await,
            BatchOutcome::Rejected { .. }
        ));
    }
}
