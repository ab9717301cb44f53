use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entry::ActionLogEntry;

/// Filter criteria for action-log queries.
///
/// All criteria are optional and combine with AND. `limit` keeps the most
/// recent matches; results are always returned in append order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionFilter {
    /// Only entries with this action name (e.g. `"retrieve_item"`).
    pub action: Option<String>,
    /// Only entries at or after this instant.
    pub since: Option<DateTime<Utc>>,
    /// Only entries at or before this instant.
    pub until: Option<DateTime<Utc>>,
    /// Keep at most this many of the most recent matches.
    pub limit: Option<usize>,
}

impl ActionFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn action(action: impl Into<String>) -> Self {
        Self {
            action: Some(action.into()),
            ..Self::default()
        }
    }

    pub fn matches(&self, entry: &ActionLogEntry) -> bool {
        if let Some(action) = &self.action {
            if entry.action != *action {
                return false;
            }
        }
        if let Some(since) = self.since {
            if entry.timestamp < since {
                return false;
            }
        }
        if let Some(until) = self.until {
            if entry.timestamp > until {
                return false;
            }
        }
        true
    }

    /// Apply the filter to an append-ordered sequence of entries.
    pub fn apply<'a, I>(&self, entries: I) -> Vec<ActionLogEntry>
    where
        I: IntoIterator<Item = &'a ActionLogEntry>,
    {
        let mut matched: Vec<ActionLogEntry> =
            entries.into_iter().filter(|e| self.matches(e)).cloned().collect();
        if let Some(limit) = self.limit {
            let skip = matched.len().saturating_sub(limit);
            matched.drain(..skip);
        }
        matched
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use uuid::Uuid;

    fn entry(action: &str, at: DateTime<Utc>) -> ActionLogEntry {
        ActionLogEntry {
            entry_id: Uuid::now_v7(),
            timestamp: at,
            action: action.to_string(),
            details: serde_json::Value::Null,
        }
    }

    #[test]
    fn filters_by_action_and_window() {
        let t0 = Utc::now();
        let entries = vec![
            entry("place_item", t0),
            entry("retrieve_item", t0 + Duration::minutes(1)),
            entry("place_item", t0 + Duration::minutes(2)),
        ];

        let filter = ActionFilter {
            action: Some("place_item".to_string()),
            since: Some(t0 + Duration::seconds(30)),
            ..ActionFilter::default()
        };
        let out = filter.apply(&entries);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].timestamp, t0 + Duration::minutes(2));
    }

    #[test]
    fn limit_keeps_most_recent_in_append_order() {
        let t0 = Utc::now();
        let entries: Vec<_> = (0..5)
            .map(|i| entry("search_item", t0 + Duration::seconds(i)))
            .collect();

        let filter = ActionFilter {
            limit: Some(2),
            ..ActionFilter::all()
        };
        let out = filter.apply(&entries);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].timestamp, t0 + Duration::seconds(3));
        assert_eq!(out[1].timestamp, t0 + Duration::seconds(4));
    }
}
