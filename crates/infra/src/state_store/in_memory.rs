use std::sync::RwLock;

use cargohold_storage::CargoState;

use super::r#trait::{StateStore, StoreError};

/// In-memory state store.
///
/// Intended for tests/dev. Keeps a full copy of the last saved document.
#[derive(Debug, Default)]
pub struct InMemoryStateStore {
    inner: RwLock<Option<CargoState>>,
}

impl InMemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with `state`, as if it had been saved earlier.
    pub fn with_state(state: CargoState) -> Self {
        Self {
            inner: RwLock::new(Some(state)),
        }
    }
}

impl StateStore for InMemoryStateStore {
    fn load(&self) -> Result<Option<CargoState>, StoreError> {
        let guard = self.inner.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(guard.clone())
    }

    fn save(&self, state: &CargoState) -> Result<(), StoreError> {
        let mut guard = self.inner.write().map_err(|_| StoreError::LockPoisoned)?;
        *guard = Some(state.clone());
        Ok(())
    }
}
