//! Read-only views derived from the current state and the action log.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use cargohold_core::{ContainerId, DomainResult, ItemId, WasteContainerId};
use cargohold_events::ActionLogEntry;

use crate::action::CargoAction;
use crate::container::{percentage, Capacity, ContainerType};
use crate::item::{ItemStatus, Priority};
use crate::retrieval::{is_expiring_soon, storage_container_of, EXPIRING_SOON_DAYS};
use crate::state::CargoState;

/// Round to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PoolStats {
    pub total_volume: f64,
    pub used_volume: f64,
    pub volume_utilization: f64,
    pub total_weight_capacity: f64,
    pub current_weight: f64,
    pub weight_utilization: f64,
    pub container_count: usize,
}

impl PoolStats {
    fn from_capacities<'a>(capacities: impl Iterator<Item = &'a Capacity>) -> Self {
        let mut stats = Self {
            total_volume: 0.0,
            used_volume: 0.0,
            volume_utilization: 0.0,
            total_weight_capacity: 0.0,
            current_weight: 0.0,
            weight_utilization: 0.0,
            container_count: 0,
        };
        for capacity in capacities {
            stats.total_volume += capacity.total_volume;
            stats.used_volume += capacity.used_volume;
            stats.total_weight_capacity += capacity.max_weight;
            stats.current_weight += capacity.current_weight;
            stats.container_count += 1;
        }
        stats.volume_utilization = round2(percentage(stats.used_volume, stats.total_volume));
        stats.weight_utilization =
            round2(percentage(stats.current_weight, stats.total_weight_capacity));
        stats
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemStats {
    pub total_active_items: usize,
    pub total_waste_items: usize,
    pub items_by_category: BTreeMap<String, usize>,
    pub items_expiring_soon: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StorageContainerRow {
    pub container_id: ContainerId,
    pub name: String,
    #[serde(rename = "type")]
    pub container_type: ContainerType,
    pub volume_utilization: f64,
    pub weight_utilization: f64,
    pub item_count: usize,
    pub accessibility_factor: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WasteContainerRow {
    pub container_id: WasteContainerId,
    pub name: String,
    pub volume_utilization: f64,
    pub weight_utilization: f64,
    pub waste_categories: Vec<String>,
    pub undock_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StorageStatus {
    pub storage_stats: PoolStats,
    pub waste_stats: PoolStats,
    pub item_stats: ItemStats,
    pub storage_containers: Vec<StorageContainerRow>,
    pub waste_containers: Vec<WasteContainerRow>,
}

pub fn storage_status(state: &CargoState, today: NaiveDate) -> StorageStatus {
    let storage_stats = PoolStats::from_capacities(state.containers.values().map(|c| &c.capacity));
    let waste_stats =
        PoolStats::from_capacities(state.waste_containers.values().map(|c| &c.capacity));

    let mut item_stats = ItemStats {
        total_active_items: 0,
        total_waste_items: 0,
        items_by_category: BTreeMap::new(),
        items_expiring_soon: 0,
    };
    for item in state.items.values() {
        match item.status {
            ItemStatus::Active => {
                item_stats.total_active_items += 1;
                *item_stats
                    .items_by_category
                    .entry(item.category.clone())
                    .or_default() += 1;
                if item.days_to_expiry(today).is_some_and(is_expiring_soon) {
                    item_stats.items_expiring_soon += 1;
                }
            }
            ItemStatus::Waste => item_stats.total_waste_items += 1,
        }
    }

    let storage_containers = state
        .containers
        .values()
        .map(|c| StorageContainerRow {
            container_id: c.id.clone(),
            name: c.name.clone(),
            container_type: c.container_type,
            volume_utilization: round2(c.capacity.volume_utilization()),
            weight_utilization: round2(c.capacity.weight_utilization()),
            item_count: c.items.len(),
            accessibility_factor: c.accessibility_factor,
        })
        .collect();
    let waste_containers = state
        .waste_containers
        .values()
        .map(|c| WasteContainerRow {
            container_id: c.id.clone(),
            name: c.name.clone(),
            volume_utilization: round2(c.capacity.volume_utilization()),
            weight_utilization: round2(c.capacity.weight_utilization()),
            waste_categories: c.waste_categories.iter().cloned().collect(),
            undock_date: c.undock_date,
        })
        .collect();

    StorageStatus {
        storage_stats,
        waste_stats,
        item_stats,
        storage_containers,
        waste_containers,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RearrangementEfficiency {
    pub avg_moves_per_rearrangement: f64,
    pub total_rearrangements: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpirationManagement {
    pub efficiency_percentage: f64,
    pub expired_items: usize,
    pub total_items: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EfficiencyMetrics {
    pub space_utilization: f64,
    pub average_retrieval_time_seconds: f64,
    pub waste_management_efficiency: f64,
    pub rearrangement_efficiency: RearrangementEfficiency,
    pub expiration_management: ExpirationManagement,
}

/// `log` must be in append order.
pub fn efficiency_metrics(
    state: &CargoState,
    log: &[ActionLogEntry],
    today: NaiveDate,
) -> EfficiencyMetrics {
    let storage = PoolStats::from_capacities(state.containers.values().map(|c| &c.capacity));
    let waste = PoolStats::from_capacities(state.waste_containers.values().map(|c| &c.capacity));

    let latencies = retrieval_latencies(log);
    let average_retrieval = mean(&latencies);

    let moves_per_rearrangement: Vec<f64> = log
        .iter()
        .filter(|e| e.action == CargoAction::REARRANGE_ITEMS)
        .filter_map(|e| match e.to_typed::<CargoAction>() {
            Ok(CargoAction::ItemsRearranged(r)) => Some(r.plan.len() as f64),
            _ => None,
        })
        .collect();

    let active: Vec<_> = state.items.values().filter(|i| i.is_active()).collect();
    let expired = active
        .iter()
        .filter(|i| i.expiration_date.is_some_and(|d| d < today))
        .count();
    let efficiency_percentage = if active.is_empty() {
        100.0
    } else {
        100.0 - expired as f64 / active.len() as f64 * 100.0
    };

    EfficiencyMetrics {
        space_utilization: round2(percentage(storage.used_volume, storage.total_volume)),
        average_retrieval_time_seconds: round2(average_retrieval),
        waste_management_efficiency: round2(percentage(waste.used_volume, waste.total_volume)),
        rearrangement_efficiency: RearrangementEfficiency {
            avg_moves_per_rearrangement: round2(mean(&moves_per_rearrangement)),
            total_rearrangements: moves_per_rearrangement.len(),
        },
        expiration_management: ExpirationManagement {
            efficiency_percentage: round2(efficiency_percentage),
            expired_items: expired,
            total_items: active.len(),
        },
    }
}

/// Seconds between a search listing an item and the first retrieval of that
/// item afterwards. Entries that do not decode are ignored.
pub fn retrieval_latencies(log: &[ActionLogEntry]) -> Vec<f64> {
    let mut pending: BTreeMap<ItemId, DateTime<Utc>> = BTreeMap::new();
    let mut latencies = Vec::new();
    for entry in log {
        if entry.action != CargoAction::SEARCH_ITEM && entry.action != CargoAction::RETRIEVE_ITEM {
            continue;
        }
        match entry.to_typed::<CargoAction>() {
            Ok(CargoAction::ItemsSearched(search)) => {
                for id in search.results {
                    pending.insert(id, entry.timestamp);
                }
            }
            Ok(CargoAction::ItemRetrieved(retrieval)) => {
                if let Some(searched_at) = pending.remove(&retrieval.item_id) {
                    let elapsed = entry.timestamp - searched_at;
                    latencies.push(elapsed.num_milliseconds() as f64 / 1000.0);
                }
            }
            _ => {}
        }
    }
    latencies
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpiringItem {
    pub item_id: ItemId,
    pub name: String,
    pub days_to_expiry: i64,
    pub expiration_date: NaiveDate,
    pub location: ContainerId,
    pub container_name: String,
    pub priority: Priority,
    pub category: String,
}

/// Active items expiring within `days` (inclusive), soonest first.
pub fn expiring_items(
    state: &CargoState,
    days: u32,
    today: NaiveDate,
) -> DomainResult<Vec<ExpiringItem>> {
    let window = i64::from(days);
    let mut rows = Vec::new();
    for item in state.items.values().filter(|i| i.is_active()) {
        let (Some(expiration_date), Some(remaining)) =
            (item.expiration_date, item.days_to_expiry(today))
        else {
            continue;
        };
        if !(0..=window).contains(&remaining) {
            continue;
        }
        let container = storage_container_of(state, item)?;
        rows.push(ExpiringItem {
            item_id: item.id.clone(),
            name: item.name.clone(),
            days_to_expiry: remaining,
            expiration_date,
            location: container.id.clone(),
            container_name: container.name.clone(),
            priority: item.priority,
            category: item.category.clone(),
        });
    }
    rows.sort_by_key(|row| row.days_to_expiry);
    Ok(rows)
}

/// Default window for [`expiring_items`].
pub const DEFAULT_EXPIRY_WINDOW_DAYS: u32 = EXPIRING_SOON_DAYS as u32;
