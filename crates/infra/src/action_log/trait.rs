use std::sync::Arc;

use cargohold_events::{ActionFilter, ActionLogEntry};

use crate::state_store::StoreError;

/// Append-only audit trail of cargo operations.
///
/// Entries are immutable once appended. `query` returns matching entries in
/// append order; callers that want newest-first reverse the result.
pub trait ActionLog: Send + Sync {
    fn append(&self, entry: ActionLogEntry) -> Result<(), StoreError>;

    fn query(&self, filter: &ActionFilter) -> Result<Vec<ActionLogEntry>, StoreError>;
}

impl<L> ActionLog for Arc<L>
where
    L: ActionLog + ?Sized,
{
    fn append(&self, entry: ActionLogEntry) -> Result<(), StoreError> {
        (**self).append(entry)
    }

    fn query(&self, filter: &ActionFilter) -> Result<Vec<ActionLogEntry>, StoreError> {
        (**self).query(filter)
    }
}
