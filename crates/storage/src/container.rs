//! Storage and waste containers with their volume and weight accounting.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use cargohold_core::{ContainerId, DomainError, DomainResult, Entity, ItemId, WasteContainerId};

use crate::item::{positive, DEFAULT_CATEGORY, WASTE_LOCATION_PREFIX};

/// Accessibility assumed when a container is provisioned without one.
pub const DEFAULT_ACCESSIBILITY: f64 = 0.5;

/// Scalar volume/weight capacity shared by storage and waste containers.
///
/// Invariant: `0 <= used_volume <= total_volume` and
/// `0 <= current_weight <= max_weight`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Capacity {
    pub total_volume: f64,
    pub used_volume: f64,
    pub max_weight: f64,
    pub current_weight: f64,
}

impl Capacity {
    pub fn empty(total_volume: f64, max_weight: f64) -> Self {
        Self {
            total_volume,
            used_volume: 0.0,
            max_weight,
            current_weight: 0.0,
        }
    }

    pub fn residual_volume(&self) -> f64 {
        self.total_volume - self.used_volume
    }

    pub fn fits(&self, volume: f64, weight: f64) -> bool {
        self.used_volume + volume <= self.total_volume
            && self.current_weight + weight <= self.max_weight
    }

    /// Like [`Capacity::fits`], but reports which dimension overflows.
    pub fn ensure_fits(&self, volume: f64, weight: f64, owner: &str) -> DomainResult<()> {
        if self.used_volume + volume > self.total_volume {
            return Err(DomainError::capacity_exceeded(format!(
                "not enough space in {owner}"
            )));
        }
        if self.current_weight + weight > self.max_weight {
            return Err(DomainError::capacity_exceeded(format!(
                "weight limit exceeded in {owner}"
            )));
        }
        Ok(())
    }

    pub fn load(&mut self, volume: f64, weight: f64) {
        self.used_volume += volume;
        self.current_weight += weight;
    }

    pub fn unload(&mut self, volume: f64, weight: f64) {
        self.used_volume = (self.used_volume - volume).max(0.0);
        self.current_weight = (self.current_weight - weight).max(0.0);
    }

    /// Tight fits score close to 1; loose fits drift toward (and below) 0.
    pub fn space_efficiency(&self, volume: f64) -> f64 {
        1.0 - (self.residual_volume() - volume) / self.total_volume
    }

    pub fn volume_utilization(&self) -> f64 {
        percentage(self.used_volume, self.total_volume)
    }

    pub fn weight_utilization(&self) -> f64 {
        percentage(self.current_weight, self.max_weight)
    }

    pub fn is_within_bounds(&self) -> bool {
        self.used_volume >= 0.0
            && self.used_volume <= self.total_volume
            && self.current_weight >= 0.0
            && self.current_weight <= self.max_weight
    }
}

pub(crate) fn percentage(part: f64, whole: f64) -> f64 {
    if whole > 0.0 { part / whole * 100.0 } else { 0.0 }
}

/// Container role. Only [`ContainerType::Storage`] takes part in allocation and
/// rearrangement.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerType {
    #[default]
    Storage,
    Waste,
    Return,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageContainer {
    pub id: ContainerId,
    pub name: String,
    #[serde(flatten)]
    pub capacity: Capacity,
    /// Insertion order is physical access order: later entries sit further
    /// back and take longer to reach.
    pub items: Vec<ItemId>,
    #[serde(rename = "type")]
    pub container_type: ContainerType,
    pub accessibility_factor: f64,
}

impl Entity for StorageContainer {
    type Id = ContainerId;
    const KIND: &'static str = "container";

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl StorageContainer {
    pub fn is_storage(&self) -> bool {
        self.container_type == ContainerType::Storage
    }

    pub fn position_of(&self, item_id: &ItemId) -> Option<usize> {
        self.items.iter().position(|id| id == item_id)
    }

    pub(crate) fn admit(&mut self, item_id: ItemId, volume: f64, weight: f64) {
        self.capacity.load(volume, weight);
        self.items.push(item_id);
    }

    pub(crate) fn release(&mut self, item_id: &ItemId, volume: f64, weight: f64) {
        self.capacity.unload(volume, weight);
        self.items.retain(|id| id != item_id);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WasteContainer {
    pub id: WasteContainerId,
    pub name: String,
    #[serde(flatten)]
    pub capacity: Capacity,
    pub waste_categories: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub undock_date: Option<NaiveDate>,
}

impl Entity for WasteContainer {
    type Id = WasteContainerId;
    const KIND: &'static str = "waste container";

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl WasteContainer {
    /// Accepts the category itself, or anything when `general` is listed.
    pub fn accepts(&self, category: &str) -> bool {
        self.waste_categories.contains(category) || self.waste_categories.contains(DEFAULT_CATEGORY)
    }
}

/// Storage container provisioning input.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewContainer {
    pub container_id: Option<String>,
    pub name: Option<String>,
    pub total_volume: Option<f64>,
    pub max_weight: Option<f64>,
    #[serde(rename = "type")]
    pub container_type: Option<ContainerType>,
    pub accessibility_factor: Option<f64>,
}

impl NewContainer {
    pub fn new(container_id: impl Into<String>, total_volume: f64, max_weight: f64) -> Self {
        Self {
            container_id: Some(container_id.into()),
            total_volume: Some(total_volume),
            max_weight: Some(max_weight),
            ..Self::default()
        }
    }

    pub fn with_accessibility(mut self, factor: f64) -> Self {
        self.accessibility_factor = Some(factor);
        self
    }

    pub fn with_type(mut self, container_type: ContainerType) -> Self {
        self.container_type = Some(container_type);
        self
    }

    pub fn validate(self) -> DomainResult<StorageContainer> {
        let id = ContainerId::new(
            self.container_id
                .ok_or_else(|| DomainError::invalid_input("container_id is required"))?,
        )?;
        if id.as_str().starts_with(WASTE_LOCATION_PREFIX) {
            return Err(DomainError::invalid_input(format!(
                "storage container ids may not start with '{WASTE_LOCATION_PREFIX}'"
            )));
        }
        let total_volume = positive("total_volume", self.total_volume)?;
        let max_weight = positive("max_weight", self.max_weight)?;
        let accessibility_factor = self.accessibility_factor.unwrap_or(DEFAULT_ACCESSIBILITY);
        if !(0.0..=1.0).contains(&accessibility_factor) {
            return Err(DomainError::invalid_input(
                "accessibility_factor must be between 0 and 1",
            ));
        }

        Ok(StorageContainer {
            name: display_name(self.name, id.as_str()),
            id,
            capacity: Capacity::empty(total_volume, max_weight),
            items: Vec::new(),
            container_type: self.container_type.unwrap_or_default(),
            accessibility_factor,
        })
    }
}

/// Waste container provisioning input.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewWasteContainer {
    pub container_id: Option<String>,
    pub name: Option<String>,
    pub total_volume: Option<f64>,
    pub max_weight: Option<f64>,
    pub waste_categories: Option<Vec<String>>,
    pub undock_date: Option<NaiveDate>,
}

impl NewWasteContainer {
    pub fn new(container_id: impl Into<String>, total_volume: f64, max_weight: f64) -> Self {
        Self {
            container_id: Some(container_id.into()),
            total_volume: Some(total_volume),
            max_weight: Some(max_weight),
            ..Self::default()
        }
    }

    pub fn accepting<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.waste_categories = Some(categories.into_iter().map(Into::into).collect());
        self
    }

    pub fn validate(self) -> DomainResult<WasteContainer> {
        let id = WasteContainerId::new(
            self.container_id
                .ok_or_else(|| DomainError::invalid_input("container_id is required"))?,
        )?;
        let total_volume = positive("total_volume", self.total_volume)?;
        let max_weight = positive("max_weight", self.max_weight)?;

        let mut waste_categories: BTreeSet<String> = self
            .waste_categories
            .unwrap_or_default()
            .into_iter()
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .collect();
        if waste_categories.is_empty() {
            waste_categories.insert(DEFAULT_CATEGORY.to_string());
        }

        Ok(WasteContainer {
            name: display_name(self.name, id.as_str()),
            id,
            capacity: Capacity::empty(total_volume, max_weight),
            waste_categories,
            undock_date: self.undock_date,
        })
    }
}

fn display_name(name: Option<String>, id: &str) -> String {
    name.filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| id.to_string())
}
