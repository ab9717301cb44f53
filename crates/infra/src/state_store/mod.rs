//! Whole-state persistence boundary.
//!
//! The cargo document (items, storage containers, waste containers) is loaded
//! and replaced as a unit; there are no partial transactions.

pub mod in_memory;
pub mod json_file;
pub mod r#trait;

pub use in_memory::InMemoryStateStore;
pub use json_file::JsonFileStateStore;
pub use r#trait::{StateStore, StoreError};
