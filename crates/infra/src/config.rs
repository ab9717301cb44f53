//! Environment-driven configuration for the persistence layer.

use std::path::PathBuf;
use std::sync::Arc;

use crate::action_log::{ActionLog, InMemoryActionLog, JsonLinesActionLog};
use crate::state_store::{InMemoryStateStore, JsonFileStateStore, StateStore};

pub const ENV_STORE: &str = "CARGOHOLD_STORE";
pub const ENV_DATA_FILE: &str = "CARGOHOLD_DATA_FILE";
pub const ENV_LOG_FILE: &str = "CARGOHOLD_LOG_FILE";
pub const ENV_SEED_SAMPLE: &str = "CARGOHOLD_SEED_SAMPLE";

pub const DEFAULT_DATA_FILE: &str = "cargo_data.json";
pub const DEFAULT_LOG_FILE: &str = "cargo_logs.jsonl";

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum StoreKind {
    #[default]
    File,
    Memory,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfraConfig {
    pub store: StoreKind,
    pub data_file: PathBuf,
    pub log_file: PathBuf,
    /// Seed the sample hold when the store holds no document yet.
    pub seed_sample: bool,
}

impl Default for InfraConfig {
    fn default() -> Self {
        Self {
            store: StoreKind::File,
            data_file: PathBuf::from(DEFAULT_DATA_FILE),
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
            seed_sample: true,
        }
    }
}

impl InfraConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Unrecognized values fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let store = match lookup(ENV_STORE).as_deref().map(str::trim) {
            None | Some("") => defaults.store,
            Some(v) if v.eq_ignore_ascii_case("file") => StoreKind::File,
            Some(v) if v.eq_ignore_ascii_case("memory") => StoreKind::Memory,
            Some(other) => {
                tracing::warn!(key = ENV_STORE, value = other, "unknown store kind, using file");
                defaults.store
            }
        };

        let seed_sample = match lookup(ENV_SEED_SAMPLE).as_deref().map(str::trim) {
            None | Some("") => defaults.seed_sample,
            Some(v) if matches!(v, "1" | "true" | "TRUE" | "yes") => true,
            Some(v) if matches!(v, "0" | "false" | "FALSE" | "no") => false,
            Some(other) => {
                tracing::warn!(key = ENV_SEED_SAMPLE, value = other, "expected true/false, using default");
                defaults.seed_sample
            }
        };

        let path = |key: &str, fallback: PathBuf| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or(fallback)
        };

        Self {
            store,
            data_file: path(ENV_DATA_FILE, defaults.data_file),
            log_file: path(ENV_LOG_FILE, defaults.log_file),
            seed_sample,
        }
    }

    /// Construct the configured state store and action log.
    pub fn open_stores(&self) -> (Arc<dyn StateStore>, Arc<dyn ActionLog>) {
        match self.store {
            StoreKind::File => (
                Arc::new(JsonFileStateStore::new(&self.data_file)),
                Arc::new(JsonLinesActionLog::new(&self.log_file)),
            ),
            StoreKind::Memory => (
                Arc::new(InMemoryStateStore::new()),
                Arc::new(InMemoryActionLog::new()),
            ),
        }
    }
}
