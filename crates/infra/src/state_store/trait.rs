use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

use cargohold_storage::CargoState;

/// Persistence failure in either collaborator (state store or action log).
///
/// These are **infrastructure errors** as opposed to domain errors: they never
/// describe a rejected operation, only a failure to make an accepted one durable.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization failed: {0}")]
    Serialization(String),

    #[error("lock poisoned")]
    LockPoisoned,
}

impl StoreError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization(value.to_string())
    }
}

/// Whole-document persistence for the cargo state.
///
/// There are no partial writes: `save` replaces the stored document in full,
/// and `load` returns the last document saved. `Ok(None)` means nothing has
/// been saved yet.
///
/// Implementations must make `save` atomic from a reader's point of view: a
/// concurrent or subsequent `load` sees either the old document or the new one.
pub trait StateStore: Send + Sync {
    fn load(&self) -> Result<Option<CargoState>, StoreError>;

    fn save(&self, state: &CargoState) -> Result<(), StoreError>;
}

impl<S> StateStore for Arc<S>
where
    S: StateStore + ?Sized,
{
    fn load(&self) -> Result<Option<CargoState>, StoreError> {
        (**self).load()
    }

    fn save(&self, state: &CargoState) -> Result<(), StoreError> {
        (**self).save(state)
    }
}
