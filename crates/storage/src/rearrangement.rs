//! Rearrangement planning and application.
//!
//! A plan is advisory: [`plan`] only reads state. Committing a plan is the
//! separate [`apply`] step, which is all-or-nothing.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use cargohold_core::{ContainerId, DomainError, DomainResult, ItemId};

use crate::action::{CargoAction, ItemsRearranged, Outcome};
use crate::container::Capacity;
use crate::item::ItemSpec;
use crate::state::CargoState;

/// One proposed relocation of an item between storage containers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Move {
    pub item_id: ItemId,
    #[serde(default)]
    pub item_name: String,
    pub from_container: ContainerId,
    pub to_container: ContainerId,
    #[serde(default)]
    pub volume_freed: f64,
    #[serde(default)]
    pub weight_freed: f64,
}

/// Propose moves that would free enough capacity for `item`.
///
/// Source containers are storage containers whose total capacity could hold
/// the item once emptied enough. Candidates are taken largest volume first;
/// a candidate is skipped when its item is already planned or its destination
/// could not absorb it after the moves accepted so far. An empty plan means
/// no rearrangement helps.
pub fn plan(state: &CargoState, item: &ItemSpec) -> Vec<Move> {
    let mut candidates = Vec::new();
    let sources = state.storage_containers().filter(|c| {
        c.capacity.total_volume >= item.volume && c.capacity.max_weight >= item.weight
    });
    for source in sources {
        for item_id in &source.items {
            let Ok(resident) = state.item(item_id) else {
                continue;
            };
            for destination in state.storage_containers() {
                if destination.id == source.id
                    || !destination.capacity.fits(resident.volume, resident.weight)
                {
                    continue;
                }
                candidates.push(Move {
                    item_id: resident.id.clone(),
                    item_name: resident.name.clone(),
                    from_container: source.id.clone(),
                    to_container: destination.id.clone(),
                    volume_freed: resident.volume,
                    weight_freed: resident.weight,
                });
            }
        }
    }
    // Stable: equal volumes keep container/item order.
    candidates.sort_by(|a, b| b.volume_freed.total_cmp(&a.volume_freed));

    let mut projected: BTreeMap<ContainerId, Capacity> = state
        .storage_containers()
        .map(|c| (c.id.clone(), c.capacity))
        .collect();
    let mut planned: BTreeSet<ItemId> = BTreeSet::new();
    let mut moves = Vec::new();
    let (mut freed_volume, mut freed_weight) = (0.0, 0.0);

    for candidate in candidates {
        if freed_volume >= item.volume && freed_weight >= item.weight {
            break;
        }
        if planned.contains(&candidate.item_id) {
            continue;
        }
        let Some(destination) = projected.get_mut(&candidate.to_container) else {
            continue;
        };
        if !destination.fits(candidate.volume_freed, candidate.weight_freed) {
            continue;
        }
        destination.load(candidate.volume_freed, candidate.weight_freed);
        if let Some(source) = projected.get_mut(&candidate.from_container) {
            source.unload(candidate.volume_freed, candidate.weight_freed);
        }

        freed_volume += candidate.volume_freed;
        freed_weight += candidate.weight_freed;
        planned.insert(candidate.item_id.clone());
        moves.push(candidate);
    }
    moves
}

/// Apply a plan in listed order. Either every move commits or none does.
///
/// Returns the moves as applied, with names and freed totals taken from the
/// current item records rather than from the caller.
pub fn apply(
    state: &mut CargoState,
    moves: Vec<Move>,
    now: DateTime<Utc>,
) -> DomainResult<Outcome<Vec<Move>>> {
    if moves.is_empty() {
        return Err(DomainError::invalid_input("no rearrangement plan provided"));
    }

    let mut next = state.clone();
    let mut applied = Vec::with_capacity(moves.len());
    for mv in moves {
        let (name, volume, weight) = {
            let item = next
                .item(&mv.item_id)
                .map_err(|_| stale(&mv, "unknown item"))?;
            if item.location.storage_id() != Some(&mv.from_container) {
                return Err(stale(&mv, "item is not in the source container"));
            }
            (item.name.clone(), item.volume, item.weight)
        };
        if mv.from_container == mv.to_container {
            return Err(stale(&mv, "source and destination are the same"));
        }
        next.container(&mv.from_container)
            .map_err(|_| stale(&mv, "unknown source container"))?;
        let destination = next
            .container(&mv.to_container)
            .map_err(|_| stale(&mv, "unknown destination container"))?;
        if !destination.is_storage() {
            return Err(stale(&mv, "destination is not a storage container"));
        }
        destination.capacity.ensure_fits(
            volume,
            weight,
            &format!("container {}", mv.to_container),
        )?;

        next.transfer(&mv.item_id, &mv.from_container, &mv.to_container)?;
        next.item_mut(&mv.item_id)?.last_accessed = now;
        applied.push(Move {
            item_name: name,
            volume_freed: volume,
            weight_freed: weight,
            ..mv
        });
    }

    *state = next;
    let action = CargoAction::ItemsRearranged(ItemsRearranged {
        plan: applied.clone(),
    });
    Ok(Outcome::logged(applied, action))
}

fn stale(mv: &Move, reason: &str) -> DomainError {
    DomainError::invalid_move(format!(
        "invalid move of {} from {} to {}: {reason}",
        mv.item_id, mv.from_container, mv.to_container
    ))
}
