//! Cargo-hold storage domain.
//!
//! Pure, IO-free logic over a [`CargoState`] document: placement scoring and
//! allocation, rearrangement planning, retrieval estimation, the waste
//! lifecycle, and derived metrics. Every mutating operation takes the current
//! time from its caller and returns an [`Outcome`] naming the action to log;
//! persisting the state and appending the log entry is the caller's job.

pub mod action;
pub mod allocation;
pub mod container;
pub mod item;
pub mod metrics;
pub mod rearrangement;
pub mod retrieval;
pub mod scoring;
pub mod state;
pub mod waste;

pub use action::{CargoAction, Outcome};
pub use allocation::{place, PlacementOutcome};
pub use container::{
    Capacity, ContainerType, NewContainer, NewWasteContainer, StorageContainer, WasteContainer,
};
pub use item::{Item, ItemStatus, ItemUpdate, Location, NewItem, Priority};
pub use metrics::{EfficiencyMetrics, ExpiringItem, StorageStatus};
pub use rearrangement::Move;
pub use retrieval::{ItemDetails, SearchHit};
pub use state::CargoState;
pub use waste::{ReturnPlan, ReturnReceipt, UndockPlan, UndockPlanType, WasteAssignment};
