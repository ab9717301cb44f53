use std::sync::RwLock;

use cargohold_events::{ActionFilter, ActionLogEntry};

use super::r#trait::ActionLog;
use crate::state_store::StoreError;

/// In-memory action log for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryActionLog {
    entries: RwLock<Vec<ActionLogEntry>>,
}

impl InMemoryActionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ActionLog for InMemoryActionLog {
    fn append(&self, entry: ActionLogEntry) -> Result<(), StoreError> {
        let mut entries = self.entries.write().map_err(|_| StoreError::LockPoisoned)?;
        entries.push(entry);
        Ok(())
    }

    fn query(&self, filter: &ActionFilter) -> Result<Vec<ActionLogEntry>, StoreError> {
        let entries = self.entries.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(filter.apply(entries.iter()))
    }
}
