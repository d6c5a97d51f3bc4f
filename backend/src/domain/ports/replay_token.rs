//! Port for replay-token verification.

use async_trait::async_trait;

use crate::domain::ReplayToken;

/// Action family a token was issued for.
///
/// A token minted for one form cannot authorize another scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum TokenScope {
    /// The bulk membership mutation form.
    BulkMembership,
}

impl TokenScope {
    /// Stable scope label used by token issuers.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BulkMembership => "bulk-membership",
        }
    }
}

/// Verification contract for single-purpose form tokens.
///
/// Single-use invalidation belongs to the implementation: a verifier that
/// consumes tokens on success makes resubmission fail here. The processor
/// re-verifies on every batch and never caches a prior result.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReplayTokenVerifier: Send + Sync {
    /// Whether `token` is valid for `scope`.
    async fn verify(&self, token: &ReplayToken, scope: TokenScope) -> bool;
}

/// Verifier rejecting every token, the safe default for unwired deployments.
#[derive(Debug, Default, Clone, Copy)]
pub struct RejectAllReplayTokenVerifier;

#[async_trait]
impl ReplayTokenVerifier for RejectAllReplayTokenVerifier {
    async fn verify(&self, _token: &ReplayToken, _scope: TokenScope) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn scopes_have_stable_labels() {
        assert_eq!(TokenScope::BulkMembership.as_str(), "bulk-membership");
    }

    #[rstest]
    #[tokio::test]
    async fn reject_all_rejects_every_token() {
        let verifier = RejectAllReplayTokenVerifier;
        let token = ReplayToken::new("tok").expect("token");
        assert!(!verifier.verify(&token, TokenScope::BulkMembership).await);
    }
}
