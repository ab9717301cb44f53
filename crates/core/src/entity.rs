//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Ord + core::fmt::Debug + core::fmt::Display;

    /// Human-readable kind used in error messages (`"item"`, `"container"`).
    const KIND: &'static str;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}
