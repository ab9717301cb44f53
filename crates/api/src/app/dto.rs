use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use cargohold_core::DomainError;
use cargohold_events::ActionFilter;
use cargohold_storage::{Move, NewItem, UndockPlanType};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct PlaceItemRequest {
    #[serde(flatten)]
    pub item: NewItem,
    pub container_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RearrangeRequest {
    #[serde(default)]
    pub rearrangement_plan: Vec<Move>,
}

#[derive(Debug, Deserialize)]
pub struct MarkAsWasteRequest {
    pub item_id: Option<String>,
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UndockPlanRequest {
    pub module_id: Option<String>,
    pub undock_date: Option<NaiveDate>,
    #[serde(rename = "type", default)]
    pub plan_type: UndockPlanType,
}

#[derive(Debug, Deserialize)]
pub struct FindItemQuery {
    #[serde(default)]
    pub query: String,
    pub category: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ExpiringItemsQuery {
    pub days: Option<u32>,
}

pub const DEFAULT_LOG_LIMIT: usize = 100;

#[derive(Debug, Default, Deserialize)]
pub struct LogsQuery {
    /// RFC3339 instant or `YYYY-MM-DD` (midnight UTC).
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub action_type: Option<String>,
    pub limit: Option<usize>,
}

impl LogsQuery {
    pub fn into_filter(self) -> Result<ActionFilter, DomainError> {
        Ok(ActionFilter {
            action: self.action_type.filter(|a| !a.trim().is_empty()),
            since: self.start_date.as_deref().map(parse_instant).transpose()?,
            until: self.end_date.as_deref().map(parse_instant).transpose()?,
            limit: Some(self.limit.unwrap_or(DEFAULT_LOG_LIMIT)),
        })
    }
}

fn parse_instant(raw: &str) -> Result<DateTime<Utc>, DomainError> {
    let raw = raw.trim();
    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Ok(at.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(|date| date.and_time(NaiveTime::MIN).and_utc())
        .map_err(|_| DomainError::invalid_input(format!("invalid date '{raw}'")))
}

/// Pull a required id out of a body, reporting its absence as invalid input.
pub fn required(field: &str, value: Option<String>) -> Result<String, DomainError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| DomainError::invalid_input(format!("{field} is required")))
}

// -------------------------
// Response helpers
// -------------------------

/// Body flattened under a `"status": "success"` marker.
#[derive(Debug, Serialize)]
pub struct Success<T> {
    status: &'static str,
    #[serde(flatten)]
    body: T,
}

pub fn success<T: Serialize>(body: T) -> Success<T> {
    Success {
        status: "success",
        body,
    }
}
