//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures (validation,
/// capacity, conflicts). Persistence failures belong to the infra layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A request was missing required fields or carried malformed values.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// An item or container id is unknown.
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: String },

    /// A create collided with an existing id, or the target is in the wrong state.
    #[error("conflict: {0}")]
    Conflict(String),

    /// An explicitly chosen target cannot absorb the volume or weight.
    #[error("capacity exceeded: {0}")]
    CapacityExceeded(String),

    /// No eligible container and no viable rearrangement.
    #[error("no capacity: {0}")]
    NoCapacity(String),

    /// No waste container accepts the item's category with room to spare.
    #[error("no suitable waste container for category '{0}'")]
    NoWasteContainer(String),

    /// A rearrangement move references a stale item or container.
    #[error("invalid move: {0}")]
    InvalidMove(String),

    /// A state invariant was violated (e.g. a corrupt persisted document).
    #[error("invariant violated: {0}")]
    InvariantViolation(String),
}

impl DomainError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn not_found(kind: &'static str, id: impl core::fmt::Display) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn capacity_exceeded(msg: impl Into<String>) -> Self {
        Self::CapacityExceeded(msg.into())
    }

    pub fn no_capacity(msg: impl Into<String>) -> Self {
        Self::NoCapacity(msg.into())
    }

    pub fn invalid_move(msg: impl Into<String>) -> Self {
        Self::InvalidMove(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }
}
