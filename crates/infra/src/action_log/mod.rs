//! Append-only action log boundary.

pub mod in_memory;
pub mod json_lines;
pub mod r#trait;

pub use in_memory::InMemoryActionLog;
pub use json_lines::JsonLinesActionLog;
pub use r#trait::ActionLog;
