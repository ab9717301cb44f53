use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use cargohold_events::{ActionFilter, ActionLogEntry};

use super::r#trait::ActionLog;
use crate::state_store::StoreError;

/// Action log stored as one JSON object per line.
///
/// Appends only ever add a line, so existing entries are never rewritten.
#[derive(Debug)]
pub struct JsonLinesActionLog {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonLinesActionLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<Vec<ActionLogEntry>, StoreError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::io(&self.path, e)),
        };
        raw.lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str(line).map_err(StoreError::from))
            .collect()
    }
}

impl ActionLog for JsonLinesActionLog {
    fn append(&self, entry: ActionLogEntry) -> Result<(), StoreError> {
        let mut line = serde_json::to_string(&entry)?;
        line.push('\n');

        let _guard = self.write_lock.lock().map_err(|_| StoreError::LockPoisoned)?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| StoreError::io(&self.path, e))?;
        file.write_all(line.as_bytes())
            .and_then(|_| file.flush())
            .map_err(|e| StoreError::io(&self.path, e))
    }

    fn query(&self, filter: &ActionFilter) -> Result<Vec<ActionLogEntry>, StoreError> {
        let _guard = self.write_lock.lock().map_err(|_| StoreError::LockPoisoned)?;
        let entries = self.read_all()?;
        Ok(filter.apply(entries.iter()))
    }
}
