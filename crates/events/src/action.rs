/// Serde tag carrying the action name in an adjacently tagged action enum.
pub const ACTION_TAG: &str = "action";

/// Serde tag carrying the detail payload in an adjacently tagged action enum.
pub const DETAILS_TAG: &str = "details";

/// A domain-agnostic, loggable action.
///
/// Actions are facts: once appended to the log they are never modified.
/// Implementors are expected to serialize as an adjacently tagged enum
/// (`#[serde(tag = "action", content = "details")]`) so that
/// [`ActionLogEntry`](crate::ActionLogEntry) can split name and payload.
pub trait Action: Clone + core::fmt::Debug + Send + Sync + 'static {
    /// Stable action name (e.g. `"place_item"`).
    fn action_type(&self) -> &'static str;
}
