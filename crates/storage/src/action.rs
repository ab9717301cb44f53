//! Typed action-log vocabulary for cargo operations.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use cargohold_core::{ContainerId, ItemId, WasteContainerId};
use cargohold_events::Action;

use crate::container::ContainerType;
use crate::rearrangement::Move;
use crate::waste::UndockPlanType;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemPlaced {
    pub item_id: ItemId,
    pub container_id: ContainerId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemsSearched {
    pub query: String,
    pub category: Option<String>,
    pub results_count: usize,
    /// Matching item ids, in ranking order.
    pub results: Vec<ItemId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemRetrieved {
    pub item_id: ItemId,
    pub item_name: String,
    pub location: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemViewed {
    pub item_id: ItemId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemUpdated {
    pub item_id: ItemId,
    pub changed_fields: Vec<String>,
    pub relocated_from: Option<ContainerId>,
    pub relocated_to: Option<ContainerId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemsRearranged {
    pub plan: Vec<Move>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemMarkedAsWaste {
    pub item_id: ItemId,
    pub item_name: String,
    pub reason: String,
    pub waste_container: WasteContainerId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnPlanned {
    pub waste_container_id: WasteContainerId,
    pub total_items: usize,
    pub total_volume: f64,
    pub total_weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnConfirmed {
    pub waste_container_id: WasteContainerId,
    pub container_name: String,
    pub items_removed: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UndockPlanned {
    pub module_id: WasteContainerId,
    pub undock_date: NaiveDate,
    #[serde(rename = "type")]
    pub plan_type: UndockPlanType,
    pub items_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerAdded {
    pub container_id: ContainerId,
    pub container_name: String,
    #[serde(rename = "type")]
    pub container_type: ContainerType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WasteContainerAdded {
    pub container_id: WasteContainerId,
    pub container_name: String,
    pub waste_categories: Vec<String>,
}

/// Everything that can be written to the action log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", content = "details")]
pub enum CargoAction {
    #[serde(rename = "place_item")]
    ItemPlaced(ItemPlaced),
    #[serde(rename = "search_item")]
    ItemsSearched(ItemsSearched),
    #[serde(rename = "retrieve_item")]
    ItemRetrieved(ItemRetrieved),
    #[serde(rename = "view_item")]
    ItemViewed(ItemViewed),
    #[serde(rename = "update_item")]
    ItemUpdated(ItemUpdated),
    #[serde(rename = "rearrange_items")]
    ItemsRearranged(ItemsRearranged),
    #[serde(rename = "mark_as_waste")]
    ItemMarkedAsWaste(ItemMarkedAsWaste),
    #[serde(rename = "return_planning")]
    ReturnPlanned(ReturnPlanned),
    #[serde(rename = "confirm_return")]
    ReturnConfirmed(ReturnConfirmed),
    #[serde(rename = "create_undock_plan")]
    UndockPlanned(UndockPlanned),
    #[serde(rename = "add_container")]
    ContainerAdded(ContainerAdded),
    #[serde(rename = "add_waste_container")]
    WasteContainerAdded(WasteContainerAdded),
}

impl CargoAction {
    pub const SEARCH_ITEM: &'static str = "search_item";
    pub const RETRIEVE_ITEM: &'static str = "retrieve_item";
    pub const REARRANGE_ITEMS: &'static str = "rearrange_items";
}

impl Action for CargoAction {
    fn action_type(&self) -> &'static str {
        match self {
            CargoAction::ItemPlaced(_) => "place_item",
            CargoAction::ItemsSearched(_) => Self::SEARCH_ITEM,
            CargoAction::ItemRetrieved(_) => Self::RETRIEVE_ITEM,
            CargoAction::ItemViewed(_) => "view_item",
            CargoAction::ItemUpdated(_) => "update_item",
            CargoAction::ItemsRearranged(_) => Self::REARRANGE_ITEMS,
            CargoAction::ItemMarkedAsWaste(_) => "mark_as_waste",
            CargoAction::ReturnPlanned(_) => "return_planning",
            CargoAction::ReturnConfirmed(_) => "confirm_return",
            CargoAction::UndockPlanned(_) => "create_undock_plan",
            CargoAction::ContainerAdded(_) => "add_container",
            CargoAction::WasteContainerAdded(_) => "add_waste_container",
        }
    }
}

/// A domain operation's result together with the action to log for it.
///
/// `action` is `None` when the operation produced a proposal rather than a
/// change (e.g. a rearrangement suggestion), in which case nothing is persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome<T> {
    pub value: T,
    pub action: Option<CargoAction>,
}

impl<T> Outcome<T> {
    pub fn logged(value: T, action: CargoAction) -> Self {
        Self {
            value,
            action: Some(action),
        }
    }

    pub fn unlogged(value: T) -> Self {
        Self {
            value,
            action: None,
        }
    }
}
