//! Allocation engine: chooses a container for a new item.

use chrono::{DateTime, Utc};

use cargohold_core::{ContainerId, DomainError, DomainResult, ItemId};

use crate::action::{CargoAction, ItemPlaced, Outcome};
use crate::item::{ItemSpec, NewItem};
use crate::rearrangement::{self, Move};
use crate::scoring;
use crate::state::CargoState;

#[derive(Debug, Clone, PartialEq)]
pub enum PlacementOutcome {
    Placed {
        item_id: ItemId,
        container_id: ContainerId,
    },
    /// No container fits as-is; these moves would make room. Nothing was
    /// committed.
    RearrangementNeeded(Vec<Move>),
}

/// Highest-scoring eligible storage container. Containers are visited in id
/// order and only a strictly better score replaces the current best, so ties
/// go to the smallest id.
pub fn best_container<'a>(state: &'a CargoState, item: &ItemSpec) -> Option<(&'a ContainerId, f64)> {
    let mut best: Option<(&ContainerId, f64)> = None;
    for container in state.storage_containers() {
        let Some(score) = scoring::score(container, item) else {
            continue;
        };
        tracing::debug!(container_id = %container.id, item_id = %item.id, score, "scored container");
        if best.is_none_or(|(_, top)| score > top) {
            best = Some((&container.id, score));
        }
    }
    best
}

/// Place a new item, either into `target` or into the best-scoring container.
pub fn place(
    state: &mut CargoState,
    input: NewItem,
    target: Option<ContainerId>,
    now: DateTime<Utc>,
) -> DomainResult<Outcome<PlacementOutcome>> {
    let item = input.validate()?;
    if state.items.contains_key(&item.id) {
        return Err(DomainError::conflict(format!(
            "item id {} already exists",
            item.id
        )));
    }

    let container_id = match target {
        Some(id) => {
            state.container(&id)?.capacity.ensure_fits(
                item.volume,
                item.weight,
                &format!("container {id}"),
            )?;
            id
        }
        None => match best_container(state, &item) {
            Some((id, _)) => id.clone(),
            None => {
                let moves = rearrangement::plan(state, &item);
                tracing::debug!(item_id = %item.id, moves = moves.len(), "no container fits, planned rearrangement");
                if moves.is_empty() {
                    return Err(DomainError::no_capacity(format!(
                        "no space available for item {}, and rearrangement not possible",
                        item.id
                    )));
                }
                return Ok(Outcome::unlogged(PlacementOutcome::RearrangementNeeded(moves)));
            }
        },
    };

    let item_id = item.id.clone();
    state
        .container_mut(&container_id)?
        .admit(item_id.clone(), item.volume, item.weight);
    state
        .items
        .insert(item_id.clone(), item.into_item(container_id.clone(), now));

    let action = CargoAction::ItemPlaced(ItemPlaced {
        item_id: item_id.clone(),
        container_id: container_id.clone(),
    });
    Ok(Outcome::logged(
        PlacementOutcome::Placed {
            item_id,
            container_id,
        },
        action,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::ContainerType;
    use crate::container::NewContainer;
    use crate::state::fixtures::*;
    use proptest::prelude::*;

    #[test]
    fn places_into_only_eligible_container() {
        let mut state = CargoState::default();
        with_storage(&mut state, "storage_001", 100.0, 200.0, 0.9);
        stow(&mut state, "storage_001", NewItem::new("item_000", "Seed", 0.5, 0.3));

        let input = NewItem::new("item_001", "Food Packet", 0.5, 0.3).with_priority(4);
        let out = place(&mut state, input, None, test_time()).unwrap();

        assert_eq!(
            out.value,
            PlacementOutcome::Placed {
                item_id: iid("item_001"),
                container_id: cid("storage_001"),
            }
        );
        let container = state.container(&cid("storage_001")).unwrap();
        assert!((container.capacity.used_volume - 1.0).abs() < 1e-12);
        assert!((container.capacity.current_weight - 0.6).abs() < 1e-12);
        assert_eq!(container.items.iter().filter(|i| **i == iid("item_001")).count(), 1);
        assert!(matches!(out.action, Some(CargoAction::ItemPlaced(_))));
    }

    #[test]
    fn ties_break_toward_smallest_container_id() {
        let mut state = CargoState::default();
        with_storage(&mut state, "zeta", 10.0, 10.0, 0.5);
        with_storage(&mut state, "alpha", 10.0, 10.0, 0.5);

        let out = place(&mut state, NewItem::new("i", "Thing", 1.0, 1.0), None, test_time()).unwrap();
        assert!(matches!(
            out.value,
            PlacementOutcome::Placed { container_id, .. } if container_id == cid("alpha")
        ));
    }

    #[test]
    fn high_priority_items_favour_accessible_containers() {
        let mut state = CargoState::default();
        with_storage(&mut state, "deep", 10.0, 10.0, 0.1);
        with_storage(&mut state, "front", 10.0, 10.0, 1.0);

        let input = NewItem::new("med", "Medkit", 1.0, 1.0).with_priority(5);
        let out = place(&mut state, input, None, test_time()).unwrap();
        assert!(matches!(
            out.value,
            PlacementOutcome::Placed { container_id, .. } if container_id == cid("front")
        ));
    }

    #[test]
    fn non_storage_containers_are_skipped() {
        let mut state = CargoState::default();
        state
            .add_container(NewContainer::new("dock", 100.0, 100.0).with_type(ContainerType::Return))
            .unwrap();
        let err = place(&mut state, NewItem::new("i", "Thing", 1.0, 1.0), None, test_time()).unwrap_err();
        assert!(matches!(err, DomainError::NoCapacity(_)));
    }

    #[test]
    fn explicit_target_is_validated() {
        let mut state = CargoState::default();
        with_storage(&mut state, "small", 1.0, 1.0, 0.5);

        let err = place(
            &mut state,
            NewItem::new("i", "Thing", 1.0, 1.0),
            Some(cid("missing")),
            test_time(),
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::NotFound { kind: "container", .. }));

        let err = place(
            &mut state,
            NewItem::new("i", "Thing", 2.0, 0.5),
            Some(cid("small")),
            test_time(),
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::CapacityExceeded(_)));
        assert!(state.items.is_empty());
    }

    #[test]
    fn duplicate_item_ids_conflict() {
        let mut state = CargoState::default();
        with_storage(&mut state, "c", 10.0, 10.0, 0.5);
        place(&mut state, NewItem::new("i", "Thing", 1.0, 1.0), None, test_time()).unwrap();
        let err = place(&mut state, NewItem::new("i", "Thing", 1.0, 1.0), None, test_time()).unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[test]
    fn full_hold_proposes_rearrangement_without_committing() {
        let mut state = CargoState::default();
        with_storage(&mut state, "a", 10.0, 100.0, 0.5);
        with_storage(&mut state, "b", 5.0, 100.0, 0.5);
        stow(&mut state, "a", NewItem::new("bulky", "Bulky", 8.0, 1.0));
        stow(&mut state, "b", NewItem::new("tiny", "Tiny", 1.0, 1.0));
        let before = state.clone();

        // 4.5 units fit nowhere as-is; moving `tiny` out of `b` is proposed.
        let out = place(&mut state, NewItem::new("new", "New", 4.5, 1.0), None, test_time()).unwrap();
        match out.value {
            PlacementOutcome::RearrangementNeeded(moves) => assert!(!moves.is_empty()),
            other => panic!("expected rearrangement proposal, got {other:?}"),
        }
        assert!(out.action.is_none());
        assert_eq!(state, before);
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 128,
            ..ProptestConfig::default()
        })]

        /// Property: no sequence of placements pushes a container past its
        /// volume or weight limit, and every placed item is counted once.
        #[test]
        fn placements_never_exceed_capacity(
            items in prop::collection::vec((0.1f64..15.0, 0.1f64..15.0, 1u8..=5), 1..40)
        ) {
            let mut state = CargoState::default();
            with_storage(&mut state, "a", 40.0, 30.0, 0.8);
            with_storage(&mut state, "b", 25.0, 50.0, 0.3);
            with_storage(&mut state, "c", 10.0, 10.0, 1.0);

            for (i, (volume, weight, priority)) in items.into_iter().enumerate() {
                let input = NewItem::new(format!("item_{i:03}"), "Thing", volume, weight)
                    .with_priority(priority);
                let _ = place(&mut state, input, None, test_time());
                for container in state.containers.values() {
                    prop_assert!(container.capacity.is_within_bounds());
                }
            }
            prop_assert!(state.check_invariants().is_ok());
        }
    }
}
