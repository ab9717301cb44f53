//! Command execution pipeline for the cargo hold.
//!
//! `CargoService` owns the single in-process copy of the cargo state and runs
//! every operation against it:
//!
//! ```text
//! request
//!   ↓
//! 1. Take the state lock (write for mutations, read for views)
//!   ↓
//! 2. Run the pure domain operation on a private copy
//!   ↓
//! 3. Save the new document to the state store
//!   ↓
//! 4. Append the action-log entry
//!   ↓
//! 5. Swap the copy in and release the lock
//! ```
//!
//! Capacity checks and commits happen under one write lock, so two placements
//! can never both pass a check against stale totals. Views share a read lock
//! and always see a fully committed state.
//!
//! If step 3 fails nothing was persisted. If step 4 fails the previous document
//! is saved back before the error is returned. In both cases the in-memory
//! state is left untouched and the caller gets `ServiceError::StoreFailure`.
//!
//! If step 4 fails and saving the previous document back also fails, the store
//! holds the new document with no log entry for it. Memory then adopts that
//! document so a restart sees the same state the process was serving, and the
//! caller still gets `ServiceError::StoreFailure`.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;

use cargohold_core::{ContainerId, DomainError, DomainResult, ItemId, WasteContainerId};
use cargohold_events::{Action, ActionFilter, ActionLogEntry};
use cargohold_storage::{
    allocation, metrics, rearrangement, retrieval, waste, CargoAction, CargoState,
    EfficiencyMetrics, ExpiringItem, Item, ItemDetails, ItemUpdate, Move, NewContainer, NewItem,
    NewWasteContainer, Outcome, PlacementOutcome, ReturnPlan, ReturnReceipt, SearchHit,
    StorageContainer, StorageStatus, UndockPlan, UndockPlanType, WasteAssignment, WasteContainer,
};

use crate::action_log::ActionLog;
use crate::state_store::{StateStore, StoreError};

#[derive(Debug, Error)]
pub enum ServiceError {
    /// The operation was rejected; nothing changed.
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Persistence failed; the operation has no log entry.
    #[error("store failure: {0}")]
    StoreFailure(#[from] StoreError),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// A page of action-log entries, newest first.
#[derive(Debug, Clone, PartialEq)]
pub struct LogPage {
    /// Matches before the limit was applied.
    pub total: usize,
    pub entries: Vec<ActionLogEntry>,
}

pub struct CargoService<S, L> {
    state: RwLock<CargoState>,
    store: S,
    log: L,
    clock: fn() -> DateTime<Utc>,
}

impl<S, L> core::fmt::Debug for CargoService<S, L> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CargoService").finish_non_exhaustive()
    }
}

impl<S, L> CargoService<S, L>
where
    S: StateStore,
    L: ActionLog,
{
    /// Load the persisted document, or start from `seed` (saved immediately)
    /// or an empty hold when the store has none.
    ///
    /// A loaded document must satisfy the accounting invariants.
    pub fn open(store: S, log: L, seed: Option<CargoState>) -> ServiceResult<Self> {
        let state = match store.load()? {
            Some(state) => {
                state.check_invariants()?;
                tracing::info!(
                    items = state.items.len(),
                    containers = state.containers.len(),
                    waste_containers = state.waste_containers.len(),
                    "cargo state loaded"
                );
                state
            }
            None => match seed {
                Some(seed) => {
                    store.save(&seed)?;
                    tracing::info!(items = seed.items.len(), "seeded sample cargo state");
                    seed
                }
                None => CargoState::default(),
            },
        };

        Ok(Self {
            state: RwLock::new(state),
            store,
            log,
            clock: Utc::now,
        })
    }

    /// Replace the time source.
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }

    fn read(&self) -> ServiceResult<RwLockReadGuard<'_, CargoState>> {
        self.state.read().map_err(|_| StoreError::LockPoisoned.into())
    }

    fn write(&self) -> ServiceResult<RwLockWriteGuard<'_, CargoState>> {
        self.state.write().map_err(|_| StoreError::LockPoisoned.into())
    }

    fn append(&self, timestamp: DateTime<Utc>, action: &CargoAction) -> Result<(), StoreError> {
        let entry = ActionLogEntry::from_typed(timestamp, action)?;
        self.log.append(entry)
    }

    /// Run a mutating operation. Outcomes without an action are proposals and
    /// are returned without persisting anything.
    fn mutate<T>(
        &self,
        op: impl FnOnce(&mut CargoState, DateTime<Utc>) -> DomainResult<Outcome<T>>,
    ) -> ServiceResult<T> {
        let mut guard = self.write()?;
        let now = self.now();
        let mut next = guard.clone();

        let outcome = op(&mut next, now)?;
        let Some(action) = outcome.action else {
            return Ok(outcome.value);
        };

        self.store.save(&next)?;
        if let Err(err) = self.append(now, &action) {
            tracing::warn!(
                action = action.action_type(),
                error = %err,
                "action log append failed, restoring previous state"
            );
            if let Err(restore) = self.store.save(&guard) {
                tracing::error!(
                    action = action.action_type(),
                    error = %restore,
                    "failed to restore previous state, keeping the saved document in memory"
                );
                *guard = next;
            }
            return Err(err.into());
        }

        *guard = next;
        tracing::info!(action = action.action_type(), "action committed");
        Ok(outcome.value)
    }

    /// Run a read-only operation, logging its action if it has one.
    fn observe<T>(
        &self,
        op: impl FnOnce(&CargoState, DateTime<Utc>) -> DomainResult<Outcome<T>>,
    ) -> ServiceResult<T> {
        let guard = self.read()?;
        let now = self.now();
        let outcome = op(&guard, now)?;
        if let Some(action) = &outcome.action {
            self.append(now, action)?;
            tracing::debug!(action = action.action_type(), "read action logged");
        }
        Ok(outcome.value)
    }

    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> ServiceResult<CargoState> {
        Ok(self.read()?.clone())
    }

    pub fn place_item(
        &self,
        item: NewItem,
        container_id: Option<&str>,
    ) -> ServiceResult<PlacementOutcome> {
        let target = container_id.map(ContainerId::new).transpose()?;
        let outcome = self.mutate(|state, now| allocation::place(state, item, target, now))?;
        match &outcome {
            PlacementOutcome::Placed {
                item_id,
                container_id,
            } => tracing::info!(item_id = %item_id, container_id = %container_id, "item placed"),
            PlacementOutcome::RearrangementNeeded(moves) => {
                tracing::info!(moves = moves.len(), "placement needs rearrangement")
            }
        }
        Ok(outcome)
    }

    pub fn search(&self, query: &str, category: Option<&str>) -> ServiceResult<Vec<SearchHit>> {
        self.observe(|state, now| retrieval::search(state, query, category, now.date_naive()))
    }

    pub fn retrieve_item(&self, item_id: &str) -> ServiceResult<Item> {
        let item_id = ItemId::new(item_id)?;
        self.mutate(|state, now| retrieval::retrieve(state, &item_id, now))
    }

    pub fn item_details(&self, item_id: &str) -> ServiceResult<ItemDetails> {
        let item_id = ItemId::new(item_id)?;
        self.observe(|state, now| retrieval::describe_item(state, &item_id, now.date_naive()))
    }

    pub fn update_item(&self, item_id: &str, update: ItemUpdate) -> ServiceResult<Item> {
        let item_id = ItemId::new(item_id)?;
        self.mutate(|state, now| state.update_item(&item_id, update, now))
    }

    pub fn rearrange(&self, moves: Vec<Move>) -> ServiceResult<Vec<Move>> {
        let applied = self.mutate(|state, now| rearrangement::apply(state, moves, now))?;
        tracing::info!(moves = applied.len(), "rearrangement applied");
        Ok(applied)
    }

    pub fn mark_as_waste(
        &self,
        item_id: &str,
        reason: Option<String>,
    ) -> ServiceResult<WasteAssignment> {
        let item_id = ItemId::new(item_id)?;
        let assignment = self.mutate(|state, _| waste::mark_as_waste(state, &item_id, reason))?;
        tracing::info!(
            item_id = %assignment.item_id,
            waste_container = %assignment.waste_container,
            "item marked as waste"
        );
        Ok(assignment)
    }

    pub fn plan_return(&self, waste_container_id: &str) -> ServiceResult<ReturnPlan> {
        let id = WasteContainerId::new(waste_container_id)?;
        self.observe(|state, _| waste::plan_return(state, &id))
    }

    pub fn confirm_return(&self, waste_container_id: &str) -> ServiceResult<ReturnReceipt> {
        let id = WasteContainerId::new(waste_container_id)?;
        let receipt = self.mutate(|state, _| waste::confirm_return(state, &id))?;
        tracing::info!(
            waste_container_id = %receipt.waste_container_id,
            items_removed = receipt.items_removed,
            "waste container returned"
        );
        Ok(receipt)
    }

    pub fn schedule_undock(
        &self,
        module_id: &str,
        undock_date: Option<NaiveDate>,
        plan_type: UndockPlanType,
    ) -> ServiceResult<UndockPlan> {
        let id = WasteContainerId::new(module_id)?;
        self.mutate(|state, now| {
            waste::schedule_undock(state, &id, undock_date, plan_type, now.date_naive())
        })
    }

    pub fn add_container(&self, input: NewContainer) -> ServiceResult<StorageContainer> {
        self.mutate(|state, _| state.add_container(input))
    }

    pub fn add_waste_container(&self, input: NewWasteContainer) -> ServiceResult<WasteContainer> {
        self.mutate(|state, _| state.add_waste_container(input))
    }

    pub fn storage_status(&self) -> ServiceResult<StorageStatus> {
        let today = self.today();
        let guard = self.read()?;
        Ok(metrics::storage_status(&guard, today))
    }

    pub fn efficiency_metrics(&self) -> ServiceResult<EfficiencyMetrics> {
        let today = self.today();
        let guard = self.read()?;
        let entries = self.log.query(&ActionFilter::all())?;
        Ok(metrics::efficiency_metrics(&guard, &entries, today))
    }

    pub fn expiring_items(&self, days: u32) -> ServiceResult<Vec<ExpiringItem>> {
        let today = self.today();
        let guard = self.read()?;
        Ok(metrics::expiring_items(&guard, days, today)?)
    }

    /// Filtered log entries, newest first. `filter.limit` caps the page but
    /// not `total`.
    pub fn logs(&self, filter: ActionFilter) -> ServiceResult<LogPage> {
        let limit = filter.limit;
        let unbounded = ActionFilter {
            limit: None,
            ..filter
        };
        let mut entries = self.log.query(&unbounded)?;
        let total = entries.len();
        entries.reverse();
        if let Some(limit) = limit {
            entries.truncate(limit);
        }
        Ok(LogPage { total, entries })
    }
}
