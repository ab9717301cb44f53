//! Retrieval estimation, search and single-item access.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use cargohold_core::{ContainerId, DomainError, DomainResult, ItemId, WasteContainerId};

use crate::action::{CargoAction, ItemRetrieved, ItemViewed, ItemsSearched, Outcome};
use crate::container::{ContainerType, StorageContainer};
use crate::item::{Item, Location, Priority};
use crate::metrics::round2;
use crate::state::CargoState;

/// Items expiring within this many days are flagged in search results.
pub const EXPIRING_SOON_DAYS: i64 = 7;

const BASE_MINUTES: f64 = 10.0;
const POSITION_MINUTES: f64 = 5.0;

/// Estimated minutes to reach `item_id` inside `container`.
///
/// The first item in the access order is nearest the opening; each later
/// item adds a share of the position penalty.
/// Returns `None` if the item is not in the container.
pub fn estimate_minutes(container: &StorageContainer, item_id: &ItemId) -> Option<f64> {
    let index = container.position_of(item_id)?;
    let base = (1.0 - container.accessibility_factor) * BASE_MINUTES;
    let position_factor = index as f64 / container.items.len().max(1) as f64;
    Some(base + position_factor * POSITION_MINUTES)
}

/// `0 <= days <= 7`: inside the expiring-soon window.
pub fn is_expiring_soon(days_to_expiry: i64) -> bool {
    (0..=EXPIRING_SOON_DAYS).contains(&days_to_expiry)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    pub item_id: ItemId,
    pub name: String,
    pub location: ContainerId,
    pub container_name: String,
    pub priority: Priority,
    pub category: String,
    pub estimated_retrieval_time_minutes: f64,
    pub expiration_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_to_expiry: Option<i64>,
    pub expiring_soon: bool,
}

/// Case-insensitive search over active items by name or id, ranked fastest
/// access first. An empty query matches everything.
pub fn search(
    state: &CargoState,
    query: &str,
    category: Option<&str>,
    today: NaiveDate,
) -> DomainResult<Outcome<Vec<SearchHit>>> {
    let needle = query.trim().to_lowercase();
    let category = category.map(str::trim).filter(|c| !c.is_empty());

    let mut hits = Vec::new();
    for item in state.items.values().filter(|i| i.is_active()) {
        let matches_text = item.name.to_lowercase().contains(&needle)
            || item.id.as_str().to_lowercase().contains(&needle);
        if !matches_text || category.is_some_and(|c| item.category != c) {
            continue;
        }

        let container = storage_container_of(state, item)?;
        let minutes = estimate_minutes(container, &item.id).ok_or_else(|| {
            DomainError::invariant(format!(
                "item {} is missing from container {}",
                item.id, container.id
            ))
        })?;
        let days_to_expiry = item.days_to_expiry(today);
        hits.push(SearchHit {
            item_id: item.id.clone(),
            name: item.name.clone(),
            location: container.id.clone(),
            container_name: container.name.clone(),
            priority: item.priority,
            category: item.category.clone(),
            estimated_retrieval_time_minutes: round2(minutes),
            expiration_date: item.expiration_date,
            days_to_expiry,
            expiring_soon: days_to_expiry.is_some_and(is_expiring_soon),
        });
    }
    hits.sort_by(|a, b| {
        a.estimated_retrieval_time_minutes
            .total_cmp(&b.estimated_retrieval_time_minutes)
    });

    let action = CargoAction::ItemsSearched(ItemsSearched {
        query: needle,
        category: category.map(str::to_string),
        results_count: hits.len(),
        results: hits.iter().map(|h| h.item_id.clone()).collect(),
    });
    Ok(Outcome::logged(hits, action))
}

/// Record that an item was physically retrieved.
pub fn retrieve(
    state: &mut CargoState,
    item_id: &ItemId,
    now: DateTime<Utc>,
) -> DomainResult<Outcome<Item>> {
    let item = state.item_mut(item_id)?;
    item.last_accessed = now;
    let item = item.clone();

    let action = CargoAction::ItemRetrieved(ItemRetrieved {
        item_id: item.id.clone(),
        item_name: item.name.clone(),
        location: item.location.to_string(),
    });
    Ok(Outcome::logged(item, action))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ContainerSummary {
    Storage {
        container_id: ContainerId,
        name: String,
        #[serde(rename = "type")]
        container_type: ContainerType,
        accessibility_factor: f64,
    },
    Waste {
        container_id: WasteContainerId,
        name: String,
        #[serde(rename = "type")]
        container_type: ContainerType,
        undock_date: Option<NaiveDate>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemDetails {
    #[serde(flatten)]
    pub item: Item,
    pub container: Option<ContainerSummary>,
    pub days_to_expiry: Option<i64>,
}

/// Item record with a summary of wherever it is accounted.
pub fn describe_item(
    state: &CargoState,
    item_id: &ItemId,
    today: NaiveDate,
) -> DomainResult<Outcome<ItemDetails>> {
    let item = state.item(item_id)?;
    let container = match &item.location {
        Location::Storage(id) => state.containers.get(id).map(|c| ContainerSummary::Storage {
            container_id: c.id.clone(),
            name: c.name.clone(),
            container_type: c.container_type,
            accessibility_factor: c.accessibility_factor,
        }),
        Location::Waste(id) => state.waste_containers.get(id).map(|w| ContainerSummary::Waste {
            container_id: w.id.clone(),
            name: w.name.clone(),
            container_type: ContainerType::Waste,
            undock_date: w.undock_date,
        }),
    };

    let details = ItemDetails {
        item: item.clone(),
        container,
        days_to_expiry: item.days_to_expiry(today),
    };
    let action = CargoAction::ItemViewed(ItemViewed {
        item_id: item_id.clone(),
    });
    Ok(Outcome::logged(details, action))
}

pub(crate) fn storage_container_of<'a>(
    state: &'a CargoState,
    item: &Item,
) -> DomainResult<&'a StorageContainer> {
    let id = item.location.storage_id().ok_or_else(|| {
        DomainError::invariant(format!("active item {} is not in storage", item.id))
    })?;
    state.container(id)
}
