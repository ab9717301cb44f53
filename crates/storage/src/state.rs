//! The whole cargo document: items, storage containers and waste containers.
//!
//! Every map is ordered by id, so any scan over containers (scoring, planning,
//! waste matching) visits them in lexicographic order.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use cargohold_core::{
    ContainerId, DomainError, DomainResult, Entity, ItemId, WasteContainerId,
};

use crate::action::{CargoAction, ContainerAdded, ItemUpdated, Outcome, WasteContainerAdded};
use crate::container::{NewContainer, NewWasteContainer, StorageContainer, WasteContainer};
use crate::item::{normalize_category, Item, ItemStatus, ItemUpdate, Location, Priority};

/// Tolerance used when comparing accumulated float totals.
const TOTALS_EPSILON: f64 = 1e-6;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CargoState {
    #[serde(default)]
    pub items: BTreeMap<ItemId, Item>,
    #[serde(default)]
    pub containers: BTreeMap<ContainerId, StorageContainer>,
    #[serde(default)]
    pub waste_containers: BTreeMap<WasteContainerId, WasteContainer>,
}

fn lookup<'a, E: Entity>(map: &'a BTreeMap<E::Id, E>, id: &E::Id) -> DomainResult<&'a E> {
    map.get(id).ok_or_else(|| DomainError::not_found(E::KIND, id))
}

fn lookup_mut<'a, E: Entity>(
    map: &'a mut BTreeMap<E::Id, E>,
    id: &E::Id,
) -> DomainResult<&'a mut E> {
    map.get_mut(id).ok_or_else(|| DomainError::not_found(E::KIND, id))
}

fn insert_new<E: Entity + Clone>(map: &mut BTreeMap<E::Id, E>, entity: E) -> DomainResult<E> {
    if map.contains_key(entity.id()) {
        return Err(DomainError::conflict(format!(
            "{} id {} already exists",
            E::KIND,
            entity.id()
        )));
    }
    map.insert(entity.id().clone(), entity.clone());
    Ok(entity)
}

impl CargoState {
    pub fn item(&self, id: &ItemId) -> DomainResult<&Item> {
        lookup(&self.items, id)
    }

    pub(crate) fn item_mut(&mut self, id: &ItemId) -> DomainResult<&mut Item> {
        lookup_mut(&mut self.items, id)
    }

    pub fn container(&self, id: &ContainerId) -> DomainResult<&StorageContainer> {
        lookup(&self.containers, id)
    }

    pub(crate) fn container_mut(&mut self, id: &ContainerId) -> DomainResult<&mut StorageContainer> {
        lookup_mut(&mut self.containers, id)
    }

    pub fn waste_container(&self, id: &WasteContainerId) -> DomainResult<&WasteContainer> {
        lookup(&self.waste_containers, id)
    }

    pub(crate) fn waste_container_mut(
        &mut self,
        id: &WasteContainerId,
    ) -> DomainResult<&mut WasteContainer> {
        lookup_mut(&mut self.waste_containers, id)
    }

    /// Containers of type `storage`, the only ones allocation may use.
    pub fn storage_containers(&self) -> impl Iterator<Item = &StorageContainer> {
        self.containers.values().filter(|c| c.is_storage())
    }

    /// Items whose location references the given waste container.
    pub fn waste_items<'a>(
        &'a self,
        waste_container_id: &'a WasteContainerId,
    ) -> impl Iterator<Item = &'a Item> + 'a {
        self.items
            .values()
            .filter(move |item| item.location.waste_id() == Some(waste_container_id))
    }

    pub fn add_container(&mut self, input: NewContainer) -> DomainResult<Outcome<StorageContainer>> {
        let container = insert_new(&mut self.containers, input.validate()?)?;
        let action = CargoAction::ContainerAdded(ContainerAdded {
            container_id: container.id.clone(),
            container_name: container.name.clone(),
            container_type: container.container_type,
        });
        Ok(Outcome::logged(container, action))
    }

    pub fn add_waste_container(
        &mut self,
        input: NewWasteContainer,
    ) -> DomainResult<Outcome<WasteContainer>> {
        let container = insert_new(&mut self.waste_containers, input.validate()?)?;
        let action = CargoAction::WasteContainerAdded(WasteContainerAdded {
            container_id: container.id.clone(),
            container_name: container.name.clone(),
            waste_categories: container.waste_categories.iter().cloned().collect(),
        });
        Ok(Outcome::logged(container, action))
    }

    /// Move an active item between storage containers, keeping both aggregates
    /// in step. Capacity must have been checked by the caller.
    pub(crate) fn transfer(
        &mut self,
        item_id: &ItemId,
        from: &ContainerId,
        to: &ContainerId,
    ) -> DomainResult<()> {
        let (volume, weight) = {
            let item = self.item(item_id)?;
            (item.volume, item.weight)
        };
        self.container_mut(from)?.release(item_id, volume, weight);
        self.container_mut(to)?.admit(item_id.clone(), volume, weight);
        self.item_mut(item_id)?.location = Location::Storage(to.clone());
        Ok(())
    }

    /// Apply a bounded field update, relocating the item if a new storage
    /// container is named. All validation happens before any field changes.
    pub fn update_item(
        &mut self,
        item_id: &ItemId,
        update: ItemUpdate,
        now: DateTime<Utc>,
    ) -> DomainResult<Outcome<Item>> {
        let item = self.item(item_id)?.clone();

        let name = match update.name {
            Some(name) if name.trim().is_empty() => {
                return Err(DomainError::invalid_input("name cannot be empty"));
            }
            other => other,
        };
        let priority = update.priority.map(Priority::new).transpose()?;

        let relocation = match update.location {
            Some(raw) => {
                let target = ContainerId::new(raw)?;
                if item.location.storage_id() == Some(&target) {
                    None
                } else {
                    if !item.is_active() {
                        return Err(DomainError::invalid_input(
                            "waste items cannot be relocated",
                        ));
                    }
                    let destination = self.container(&target)?;
                    destination.capacity.ensure_fits(
                        item.volume,
                        item.weight,
                        &format!("container {target}"),
                    )?;
                    Some(target)
                }
            }
            None => None,
        };

        let mut changed_fields = Vec::new();
        let mut relocated_from = None;
        if let Some(target) = &relocation {
            let from = item
                .location
                .storage_id()
                .cloned()
                .ok_or_else(|| DomainError::invariant("active item has no storage location"))?;
            self.transfer(item_id, &from, target)?;
            relocated_from = Some(from);
            changed_fields.push("location".to_string());
        }

        let stored = self.item_mut(item_id)?;
        if let Some(name) = name {
            stored.name = name;
            changed_fields.push("name".to_string());
        }
        if let Some(priority) = priority {
            stored.priority = priority;
            changed_fields.push("priority".to_string());
        }
        if let Some(date) = update.expiration_date {
            stored.expiration_date = Some(date);
            changed_fields.push("expiration_date".to_string());
        }
        if update.category.is_some() {
            stored.category = normalize_category(update.category);
            changed_fields.push("category".to_string());
        }
        stored.last_accessed = now;
        let updated = stored.clone();

        let action = CargoAction::ItemUpdated(ItemUpdated {
            item_id: item_id.clone(),
            changed_fields,
            relocated_from,
            relocated_to: relocation,
        });
        Ok(Outcome::logged(updated, action))
    }

    /// Verify the accounting invariants: every item counted in exactly one
    /// container, container sequences matching active items, and capacities
    /// within bounds.
    pub fn check_invariants(&self) -> DomainResult<()> {
        let mut storage_totals: BTreeMap<&ContainerId, (f64, f64, BTreeSet<&ItemId>)> =
            BTreeMap::new();
        let mut waste_totals: BTreeMap<&WasteContainerId, (f64, f64)> = BTreeMap::new();

        for item in self.items.values() {
            match (&item.location, item.status) {
                (Location::Storage(cid), ItemStatus::Active) => {
                    if !self.containers.contains_key(cid) {
                        return Err(DomainError::invariant(format!(
                            "item {} references unknown container {cid}",
                            item.id
                        )));
                    }
                    let entry = storage_totals.entry(cid).or_default();
                    entry.0 += item.volume;
                    entry.1 += item.weight;
                    entry.2.insert(&item.id);
                }
                (Location::Waste(wid), ItemStatus::Waste) => {
                    if !self.waste_containers.contains_key(wid) {
                        return Err(DomainError::invariant(format!(
                            "item {} references unknown waste container {wid}",
                            item.id
                        )));
                    }
                    let entry = waste_totals.entry(wid).or_default();
                    entry.0 += item.volume;
                    entry.1 += item.weight;
                }
                _ => {
                    return Err(DomainError::invariant(format!(
                        "item {} status does not match its location {}",
                        item.id, item.location
                    )));
                }
            }
        }

        for container in self.containers.values() {
            let empty = (0.0, 0.0, BTreeSet::new());
            let (volume, weight, members) = storage_totals.get(&container.id).unwrap_or(&empty);
            let listed: BTreeSet<&ItemId> = container.items.iter().collect();
            if listed.len() != container.items.len() || listed != *members {
                return Err(DomainError::invariant(format!(
                    "container {} item sequence does not match its active items",
                    container.id
                )));
            }
            check_totals(
                container.id.as_str(),
                &container.capacity,
                *volume,
                *weight,
            )?;
        }

        for container in self.waste_containers.values() {
            let (volume, weight) = waste_totals.get(&container.id).copied().unwrap_or_default();
            check_totals(container.id.as_str(), &container.capacity, volume, weight)?;
        }

        Ok(())
    }
}

fn check_totals(
    owner: &str,
    capacity: &crate::container::Capacity,
    volume: f64,
    weight: f64,
) -> DomainResult<()> {
    if !capacity.is_within_bounds() {
        return Err(DomainError::invariant(format!(
            "container {owner} exceeds its capacity"
        )));
    }
    if (capacity.used_volume - volume).abs() > TOTALS_EPSILON
        || (capacity.current_weight - weight).abs() > TOTALS_EPSILON
    {
        return Err(DomainError::invariant(format!(
            "container {owner} totals do not match its items"
        )));
    }
    Ok(())
}
