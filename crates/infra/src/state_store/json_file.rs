use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use cargohold_storage::CargoState;

use super::r#trait::{StateStore, StoreError};

/// State store backed by a single pretty-printed JSON document.
///
/// Saves write a sibling temporary file and rename it over the target, so a
/// crash mid-write leaves the previous document intact.
#[derive(Debug)]
pub struct JsonFileStateStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl StateStore for JsonFileStateStore {
    fn load(&self) -> Result<Option<CargoState>, StoreError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StoreError::io(&self.path, e)),
        };
        if raw.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_str(&raw)?))
    }

    fn save(&self, state: &CargoState) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().map_err(|_| StoreError::LockPoisoned)?;
        let body = serde_json::to_string_pretty(state)?;
        let temp = self.temp_path();
        fs::write(&temp, body).map_err(|e| StoreError::io(&temp, e))?;
        fs::rename(&temp, &self.path).map_err(|e| StoreError::io(&self.path, e))
    }
}
