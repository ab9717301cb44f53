use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::action::{Action, ACTION_TAG, DETAILS_TAG};

/// A single, immutable action-log record.
///
/// This is the unit the action log persists. The payload stays untyped
/// (`details`) so the log itself never depends on domain crates; use
/// [`ActionLogEntry::to_typed`] to recover the domain action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionLogEntry {
    pub entry_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub action: String,
    pub details: JsonValue,
}

impl ActionLogEntry {
    /// Wrap a typed action into a log entry stamped with `timestamp`.
    pub fn from_typed<A>(timestamp: DateTime<Utc>, action: &A) -> Result<Self, serde_json::Error>
    where
        A: Action + Serialize,
    {
        let mut value = serde_json::to_value(action)?;
        let details = value
            .get_mut(DETAILS_TAG)
            .map(JsonValue::take)
            .unwrap_or(JsonValue::Null);

        Ok(Self {
            entry_id: Uuid::now_v7(),
            timestamp,
            action: action.action_type().to_string(),
            details,
        })
    }

    /// Decode the entry back into a typed action.
    pub fn to_typed<A>(&self) -> Result<A, serde_json::Error>
    where
        A: DeserializeOwned,
    {
        let mut tagged = serde_json::Map::with_capacity(2);
        tagged.insert(ACTION_TAG.to_string(), JsonValue::String(self.action.clone()));
        tagged.insert(DETAILS_TAG.to_string(), self.details.clone());
        serde_json::from_value(JsonValue::Object(tagged))
    }
}
