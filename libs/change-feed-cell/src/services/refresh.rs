use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tracing::debug;

/// Sequence guard for re-fetch runs.
///
/// Every refresh of a view scope takes the next sequence number; only the
/// holder of the latest sequence may commit its result. An in-flight
/// aggregation that resolves after a newer one started is stale and must be
/// discarded, so out-of-order responses can never overwrite fresher data.
pub struct RefreshCoordinator {
    latest: Arc<Mutex<HashMap<String, u64>>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshTicket {
    scope: String,
    seq: u64,
}

impl RefreshCoordinator {
    pub fn new() -> Self {
        Self {
            latest: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Start a refresh run for `scope` and become the latest.
    pub fn begin(&self, scope: &str) -> RefreshTicket {
        let mut latest = self.latest.lock().expect("refresh lock poisoned");
        let seq = latest
            .entry(scope.to_string())
            .and_modify(|s| *s += 1)
            .or_insert(1);
        RefreshTicket {
            scope: scope.to_string(),
            seq: *seq,
        }
    }

    /// True when the ticket still holds the latest sequence for its scope.
    /// A `false` means a newer run superseded this one; its result must be
    /// dropped.
    pub fn is_current(&self, ticket: &RefreshTicket) -> bool {
        let latest = self.latest.lock().expect("refresh lock poisoned");
        let current = latest.get(&ticket.scope).copied().unwrap_or(0);
        if current != ticket.seq {
            debug!(
                "Discarding stale refresh for {} (seq {} < {})",
                ticket.scope, ticket.seq, current
            );
        }
        current == ticket.seq
    }
}

impl Default for RefreshCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for RefreshCoordinator {
    fn clone(&self) -> Self {
        Self {
            latest: Arc::clone(&self.latest),
        }
    }
}
