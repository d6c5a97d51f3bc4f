//! Reachable-set expansion over the group forest.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use tracing::debug;

use crate::domain::ports::GroupHierarchyStore;
use crate::domain::GroupId;

/// Expands a set of root groups to the full set reachable via child-of
/// edges.
///
/// Traversal is breadth first with a dedup-guarded enqueue, so it
/// terminates even when the child lookup is reached for an id more than
/// once transitively. A lookup failure stops that branch silently and the
/// partial set is still returned; expansion degrades rather than aborting
/// the whole filter.
#[derive(Clone)]
pub struct HierarchyExpander {
    store: Arc<dyn GroupHierarchyStore>,
}

impl HierarchyExpander {
    /// Create an expander over the given hierarchy store.
    pub fn new(store: Arc<dyn GroupHierarchyStore>) -> Self {
        Self { store }
    }

    /// The roots plus every transitive descendant, deduplicated, in
    /// breadth-first discovery order.
    pub async fn expand(&self, roots: &[GroupId]) -> Vec<GroupId> {
        let mut seen: HashSet<GroupId> = HashSet::new();
        let mut result: Vec<GroupId> = Vec::new();
        let mut queue: VecDeque<GroupId> = VecDeque::new();

        for &root in roots {
            if seen.insert(root) {
                result.push(root);
                queue.push_back(root);
            }
        }

        while let Some(current) = queue.pop_front() {
            let children = match self.store.direct_children(current).await {
                Ok(children) => children,
                Err(err) => {
                    debug!(group = %current, error = %err, "hierarchy lookup failed, branch skipped");
                    continue;
                }
            };
            for child in children {
                if seen.insert(child) {
                    result.push(child);
                    queue.push_back(child);
                }
            }
        }

        result
    }
}
