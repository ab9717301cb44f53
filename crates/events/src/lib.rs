//! Action log vocabulary: the append-only record of everything operators did.
//!
//! Domain crates define their own typed actions and implement [`Action`];
//! this crate only knows how to wrap them into timestamped [`ActionLogEntry`]
//! records and how to filter those records.

pub mod action;
pub mod entry;
pub mod filter;

pub use action::{Action, ACTION_TAG, DETAILS_TAG};
pub use entry::ActionLogEntry;
pub use filter::ActionFilter;
