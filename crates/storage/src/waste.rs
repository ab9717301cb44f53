//! Waste lifecycle: active -> waste -> removed.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use cargohold_core::{DomainError, DomainResult, ItemId, WasteContainerId};

use crate::action::{
    CargoAction, ItemMarkedAsWaste, Outcome, ReturnConfirmed, ReturnPlanned, UndockPlanned,
};
use crate::container::{percentage, WasteContainer};
use crate::item::{Item, ItemStatus, Location};
use crate::state::CargoState;

/// Reason recorded when a caller gives none.
pub const DEFAULT_WASTE_REASON: &str = "used";
/// Days ahead an undock is scheduled when no date is given.
pub const DEFAULT_UNDOCK_DAYS: i64 = 7;
/// Shown in a return plan when no undock date is set.
pub const NOT_SCHEDULED: &str = "Not scheduled";

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UndockPlanType {
    #[default]
    Waste,
    Return,
}

impl core::fmt::Display for UndockPlanType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Waste => f.write_str("waste"),
            Self::Return => f.write_str("return"),
        }
    }
}

/// Waste container that accepts `item` and fits it most tightly. Ties go to
/// the smallest id.
pub fn best_waste_container<'a>(state: &'a CargoState, item: &Item) -> Option<&'a WasteContainer> {
    let mut best: Option<(&WasteContainer, f64)> = None;
    for container in state.waste_containers.values() {
        if !container.accepts(&item.category) || !container.capacity.fits(item.volume, item.weight)
        {
            continue;
        }
        let efficiency = container.capacity.space_efficiency(item.volume);
        if best.is_none_or(|(_, top)| efficiency > top) {
            best = Some((container, efficiency));
        }
    }
    best.map(|(container, _)| container)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WasteAssignment {
    pub item_id: ItemId,
    pub waste_container: WasteContainerId,
}

/// Move an active item's accounting from its storage container into the best
/// matching waste container.
pub fn mark_as_waste(
    state: &mut CargoState,
    item_id: &ItemId,
    reason: Option<String>,
) -> DomainResult<Outcome<WasteAssignment>> {
    let item = state.item(item_id)?.clone();
    if !item.is_active() {
        return Err(DomainError::conflict(format!(
            "item {item_id} is already marked as waste"
        )));
    }
    let target = best_waste_container(state, &item)
        .map(|c| c.id.clone())
        .ok_or_else(|| DomainError::NoWasteContainer(item.category.clone()))?;
    let from = item
        .location
        .storage_id()
        .ok_or_else(|| DomainError::invariant(format!("active item {item_id} is not in storage")))?;

    state.container_mut(from)?.release(item_id, item.volume, item.weight);
    state
        .waste_container_mut(&target)?
        .capacity
        .load(item.volume, item.weight);
    let stored = state.item_mut(item_id)?;
    stored.status = ItemStatus::Waste;
    stored.location = Location::Waste(target.clone());

    let reason = reason
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty())
        .unwrap_or_else(|| DEFAULT_WASTE_REASON.to_string());
    let action = CargoAction::ItemMarkedAsWaste(ItemMarkedAsWaste {
        item_id: item_id.clone(),
        item_name: item.name,
        reason,
        waste_container: target.clone(),
    });
    Ok(Outcome::logged(
        WasteAssignment {
            item_id: item_id.clone(),
            waste_container: target,
        },
        action,
    ))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WasteItemRow {
    pub item_id: ItemId,
    pub name: String,
    pub category: String,
    pub volume: f64,
    pub weight: f64,
    pub status: ItemStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpaceReclamation {
    pub volume_reclaimed: f64,
    pub weight_reclaimed: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReturnPlan {
    pub container_id: WasteContainerId,
    pub container_name: String,
    /// The scheduled date, or [`NOT_SCHEDULED`].
    pub undock_date: String,
    pub waste_items: Vec<WasteItemRow>,
    pub total_items: usize,
    pub total_volume: f64,
    pub total_weight: f64,
    pub volume_utilization: f64,
    pub weight_utilization: f64,
    pub space_reclamation: SpaceReclamation,
}

/// Summarize everything that would leave with a waste container.
pub fn plan_return(
    state: &CargoState,
    waste_container_id: &WasteContainerId,
) -> DomainResult<Outcome<ReturnPlan>> {
    let container = state.waste_container(waste_container_id)?;
    let waste_items: Vec<WasteItemRow> = state
        .waste_items(waste_container_id)
        .map(|item| WasteItemRow {
            item_id: item.id.clone(),
            name: item.name.clone(),
            category: item.category.clone(),
            volume: item.volume,
            weight: item.weight,
            status: item.status,
        })
        .collect();
    let total_volume: f64 = waste_items.iter().map(|i| i.volume).sum();
    let total_weight: f64 = waste_items.iter().map(|i| i.weight).sum();

    let plan = ReturnPlan {
        container_id: container.id.clone(),
        container_name: container.name.clone(),
        undock_date: container
            .undock_date
            .map(|d| d.to_string())
            .unwrap_or_else(|| NOT_SCHEDULED.to_string()),
        total_items: waste_items.len(),
        total_volume,
        total_weight,
        volume_utilization: percentage(total_volume, container.capacity.total_volume),
        weight_utilization: percentage(total_weight, container.capacity.max_weight),
        space_reclamation: SpaceReclamation {
            volume_reclaimed: total_volume,
            weight_reclaimed: total_weight,
        },
        waste_items,
    };
    let action = CargoAction::ReturnPlanned(ReturnPlanned {
        waste_container_id: plan.container_id.clone(),
        total_items: plan.total_items,
        total_volume,
        total_weight,
    });
    Ok(Outcome::logged(plan, action))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UndockPlan {
    pub module_id: WasteContainerId,
    pub undock_date: NaiveDate,
    #[serde(rename = "type")]
    pub plan_type: UndockPlanType,
    pub items_count: usize,
}

/// Set or overwrite a waste container's undock date. Only `waste` plans name
/// a reachable module; any other type is reported as not found.
pub fn schedule_undock(
    state: &mut CargoState,
    module_id: &WasteContainerId,
    undock_date: Option<NaiveDate>,
    plan_type: UndockPlanType,
    today: NaiveDate,
) -> DomainResult<Outcome<UndockPlan>> {
    if plan_type != UndockPlanType::Waste || !state.waste_containers.contains_key(module_id) {
        return Err(DomainError::not_found(
            "waste container",
            format!("{module_id} (type {plan_type})"),
        ));
    }
    let undock_date = undock_date.unwrap_or(today + Duration::days(DEFAULT_UNDOCK_DAYS));
    let items_count = state.waste_items(module_id).count();
    state.waste_container_mut(module_id)?.undock_date = Some(undock_date);

    let plan = UndockPlan {
        module_id: module_id.clone(),
        undock_date,
        plan_type,
        items_count,
    };
    let action = CargoAction::UndockPlanned(UndockPlanned {
        module_id: module_id.clone(),
        undock_date,
        plan_type,
        items_count,
    });
    Ok(Outcome::logged(plan, action))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReturnReceipt {
    pub waste_container_id: WasteContainerId,
    pub container_name: String,
    pub items_removed: usize,
}

/// Delete a waste container and every item referencing it. Irreversible.
pub fn confirm_return(
    state: &mut CargoState,
    waste_container_id: &WasteContainerId,
) -> DomainResult<Outcome<ReturnReceipt>> {
    let container = state.waste_container(waste_container_id)?.clone();
    let doomed: Vec<ItemId> = state
        .waste_items(waste_container_id)
        .map(|item| item.id.clone())
        .collect();
    for id in &doomed {
        state.items.remove(id);
    }
    state.waste_containers.remove(waste_container_id);

    let receipt = ReturnReceipt {
        waste_container_id: container.id,
        container_name: container.name,
        items_removed: doomed.len(),
    };
    let action = CargoAction::ReturnConfirmed(ReturnConfirmed {
        waste_container_id: receipt.waste_container_id.clone(),
        container_name: receipt.container_name.clone(),
        items_removed: receipt.items_removed,
    });
    Ok(Outcome::logged(receipt, action))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::NewWasteContainer;
    use crate::item::NewItem;
    use crate::state::fixtures::*;

    fn hold_with_food() -> (CargoState, ItemId) {
        let mut state = CargoState::default();
        with_storage(&mut state, "storage_001", 100.0, 200.0, 0.9);
        let id = stow(
            &mut state,
            "storage_001",
            NewItem::new("item_001", "Food Packet", 1.0, 0.5).with_category("food"),
        );
        state
            .add_waste_container(
                NewWasteContainer::new("waste_001", 30.0, 50.0).accepting(["general", "organic"]),
            )
            .unwrap();
        (state, id)
    }

    #[test]
    fn marked_item_moves_into_waste_namespace() {
        let (mut state, id) = hold_with_food();
        let out = mark_as_waste(&mut state, &id, Some("expired".into())).unwrap();
        assert_eq!(out.value.waste_container, wid("waste_001"));

        let item = state.item(&id).unwrap();
        assert_eq!(item.status, ItemStatus::Waste);
        assert_eq!(item.location.to_string(), "waste_waste_001");

        let storage = state.container(&cid("storage_001")).unwrap();
        assert!(storage.items.is_empty());
        assert_eq!(storage.capacity.used_volume, 0.0);
        let waste = state.waste_container(&wid("waste_001")).unwrap();
        assert_eq!(waste.capacity.used_volume, 1.0);
        state.check_invariants().unwrap();

        match out.action {
            Some(CargoAction::ItemMarkedAsWaste(a)) => assert_eq!(a.reason, "expired"),
            other => panic!("unexpected action {other:?}"),
        }
    }

    #[test]
    fn marking_twice_conflicts() {
        let (mut state, id) = hold_with_food();
        mark_as_waste(&mut state, &id, None).unwrap();
        let err = mark_as_waste(&mut state, &id, None).unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[test]
    fn no_matching_waste_container() {
        let mut state = CargoState::default();
        with_storage(&mut state, "s", 10.0, 10.0, 0.5);
        let id = stow(&mut state, "s", NewItem::new("i", "Battery", 1.0, 1.0).with_category("hazard"));
        state
            .add_waste_container(NewWasteContainer::new("w", 10.0, 10.0).accepting(["organic"]))
            .unwrap();
        let before = state.clone();

        let err = mark_as_waste(&mut state, &id, None).unwrap_err();
        assert!(matches!(err, DomainError::NoWasteContainer(_)));
        assert_eq!(state, before);
    }

    #[test]
    fn tighter_waste_container_wins() {
        let (mut state, id) = hold_with_food();
        state
            .add_waste_container(NewWasteContainer::new("waste_000", 2.0, 50.0))
            .unwrap();
        let out = mark_as_waste(&mut state, &id, None).unwrap();
        assert_eq!(out.value.waste_container, wid("waste_000"));
    }

    #[test]
    fn return_plan_totals_members() {
        let (mut state, id) = hold_with_food();
        mark_as_waste(&mut state, &id, None).unwrap();

        let out = plan_return(&state, &wid("waste_001")).unwrap();
        let plan = out.value;
        assert_eq!(plan.total_items, 1);
        assert_eq!(plan.total_volume, 1.0);
        assert_eq!(plan.undock_date, NOT_SCHEDULED);
        assert!((plan.volume_utilization - 100.0 / 30.0).abs() < 1e-9);
        assert_eq!(plan.waste_items[0].item_id, id);
    }

    #[test]
    fn undock_defaults_to_a_week_out() {
        let (mut state, _) = hold_with_food();
        let today = test_time().date_naive();
        let out = schedule_undock(&mut state, &wid("waste_001"), None, UndockPlanType::Waste, today)
            .unwrap();
        assert_eq!(out.value.undock_date, today + Duration::days(7));
        assert_eq!(
            state.waste_container(&wid("waste_001")).unwrap().undock_date,
            Some(today + Duration::days(7))
        );

        let err = schedule_undock(&mut state, &wid("waste_001"), None, UndockPlanType::Return, today)
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
        let err = schedule_undock(&mut state, &wid("nope"), None, UndockPlanType::Waste, today)
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }

    #[test]
    fn confirmed_return_removes_items_and_container() {
        let (mut state, id) = hold_with_food();
        mark_as_waste(&mut state, &id, None).unwrap();

        let out = confirm_return(&mut state, &wid("waste_001")).unwrap();
        assert_eq!(out.value.items_removed, 1);
        assert!(matches!(
            state.item(&id),
            Err(DomainError::NotFound { kind: "item", .. })
        ));
        assert!(state.waste_container(&wid("waste_001")).is_err());
        state.check_invariants().unwrap();
    }
}
