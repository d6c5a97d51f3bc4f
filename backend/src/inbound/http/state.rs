//! Shared HTTP adapter state.
//!
//! Handlers accept this state via `actix_web::web::Data`, so they depend
//! only on constructed domain services and remain testable without I/O.
//! There is no process-wide singleton; construction happens in `main` (or
//! a test harness) and the bundle is passed in explicitly.

use std::sync::Arc;

use crate::domain::ports::ModerationPolicy;
use crate::domain::{BulkMembershipProcessor, GroupOptionsService, UserListService};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Read path: composed user listing.
    pub user_list: UserListService,
    /// Write path: the bulk mutation processor.
    pub bulk: BulkMembershipProcessor,
    /// Selection widget data.
    pub group_options: GroupOptionsService,
    /// Capability check, shared with the processor.
    pub moderation: Arc<dyn ModerationPolicy>,
}

impl HttpState {
    /// Bundle the constructed services.
    pub fn new(
        user_list: UserListService,
        bulk: BulkMembershipProcessor,
        group_options: GroupOptionsService,
        moderation: Arc<dyn ModerationPolicy>,
    ) -> Self {
        Self {
            user_list,
            bulk,
            group_options,
            moderation,
        }
    }
}
