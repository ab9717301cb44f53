use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use cargohold_core::{ContainerId, DomainError, DomainResult, Entity, ItemId, WasteContainerId};

/// Category assigned when none is given; waste containers treat it as a wildcard.
pub const DEFAULT_CATEGORY: &str = "general";

/// Prefix that namespaces waste-container references inside an item location.
pub const WASTE_LOCATION_PREFIX: &str = "waste_";

/// Retrieval priority, 1 (lowest) to 5 (highest).
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Priority(u8);

impl Priority {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn new(value: u8) -> DomainResult<Self> {
        if !(Self::MIN..=Self::MAX).contains(&value) {
            return Err(DomainError::invalid_input(format!(
                "priority must be between {} and {}, got {value}",
                Self::MIN,
                Self::MAX
            )));
        }
        Ok(Self(value))
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// Priority as a fraction of the maximum (`priority / 5`).
    pub fn fraction(self) -> f64 {
        f64::from(self.0) / f64::from(Self::MAX)
    }
}

impl Default for Priority {
    fn default() -> Self {
        Self(3)
    }
}

impl TryFrom<u8> for Priority {
    type Error = DomainError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Priority> for u8 {
    fn from(value: Priority) -> Self {
        value.0
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    Active,
    Waste,
}

/// Where an item's volume and weight are accounted.
///
/// Serialized as a plain string: the storage container id, or
/// `waste_<waste container id>` for items awaiting disposal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Location {
    Storage(ContainerId),
    Waste(WasteContainerId),
}

impl Location {
    pub fn parse(raw: &str) -> DomainResult<Self> {
        match raw.strip_prefix(WASTE_LOCATION_PREFIX) {
            Some(rest) => Ok(Self::Waste(WasteContainerId::new(rest)?)),
            None => Ok(Self::Storage(ContainerId::new(raw)?)),
        }
    }

    pub fn storage_id(&self) -> Option<&ContainerId> {
        match self {
            Self::Storage(id) => Some(id),
            Self::Waste(_) => None,
        }
    }

    pub fn waste_id(&self) -> Option<&WasteContainerId> {
        match self {
            Self::Storage(_) => None,
            Self::Waste(id) => Some(id),
        }
    }
}

impl core::fmt::Display for Location {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Storage(id) => write!(f, "{id}"),
            Self::Waste(id) => write!(f, "{WASTE_LOCATION_PREFIX}{id}"),
        }
    }
}

impl Serialize for Location {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Location {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// A stored item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub category: String,
    pub volume: f64,
    pub weight: f64,
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<NaiveDate>,
    pub status: ItemStatus,
    pub location: Location,
    pub arrival_date: DateTime<Utc>,
    pub last_accessed: DateTime<Utc>,
}

impl Entity for Item {
    type Id = ItemId;
    const KIND: &'static str = "item";

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl Item {
    pub fn is_active(&self) -> bool {
        self.status == ItemStatus::Active
    }

    /// Whole calendar days from `today` until expiry; negative once expired.
    pub fn days_to_expiry(&self, today: NaiveDate) -> Option<i64> {
        self.expiration_date.map(|date| (date - today).num_days())
    }
}

/// Raw placement input, as received from a caller. Every field is optional so
/// that missing fields surface as `InvalidInput` rather than a decode failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewItem {
    pub item_id: Option<String>,
    pub name: Option<String>,
    pub category: Option<String>,
    pub volume: Option<f64>,
    pub weight: Option<f64>,
    pub priority: Option<u8>,
    pub expiration_date: Option<NaiveDate>,
}

impl NewItem {
    pub fn new(item_id: impl Into<String>, name: impl Into<String>, volume: f64, weight: f64) -> Self {
        Self {
            item_id: Some(item_id.into()),
            name: Some(name.into()),
            volume: Some(volume),
            weight: Some(weight),
            ..Self::default()
        }
    }

    pub fn with_priority(mut self, priority: u8) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_expiration(mut self, date: NaiveDate) -> Self {
        self.expiration_date = Some(date);
        self
    }

    pub fn validate(self) -> DomainResult<ItemSpec> {
        let id = ItemId::new(
            self.item_id
                .ok_or_else(|| DomainError::invalid_input("item_id is required"))?,
        )?;
        let name = self
            .name
            .filter(|n| !n.trim().is_empty())
            .ok_or_else(|| DomainError::invalid_input("name is required"))?;
        let volume = positive("volume", self.volume)?;
        let weight = positive("weight", self.weight)?;
        let priority = self.priority.map(Priority::new).transpose()?.unwrap_or_default();
        let category = normalize_category(self.category);

        Ok(ItemSpec {
            id,
            name,
            category,
            volume,
            weight,
            priority,
            expiration_date: self.expiration_date,
        })
    }
}

/// Validated attributes of an item awaiting placement.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemSpec {
    pub id: ItemId,
    pub name: String,
    pub category: String,
    pub volume: f64,
    pub weight: f64,
    pub priority: Priority,
    pub expiration_date: Option<NaiveDate>,
}

impl ItemSpec {
    pub fn into_item(self, container_id: ContainerId, now: DateTime<Utc>) -> Item {
        Item {
            id: self.id,
            name: self.name,
            category: self.category,
            volume: self.volume,
            weight: self.weight,
            priority: self.priority,
            expiration_date: self.expiration_date,
            status: ItemStatus::Active,
            location: Location::Storage(container_id),
            arrival_date: now,
            last_accessed: now,
        }
    }
}

/// Bounded field update. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemUpdate {
    pub name: Option<String>,
    pub priority: Option<u8>,
    pub expiration_date: Option<NaiveDate>,
    pub category: Option<String>,
    /// Target storage container; capacity is re-validated before moving.
    pub location: Option<String>,
}

pub(crate) fn positive(field: &str, value: Option<f64>) -> DomainResult<f64> {
    match value {
        Some(v) if v.is_finite() && v > 0.0 => Ok(v),
        Some(v) => Err(DomainError::invalid_input(format!(
            "{field} must be a positive number, got {v}"
        ))),
        None => Err(DomainError::invalid_input(format!("{field} is required"))),
    }
}

pub(crate) fn normalize_category(category: Option<String>) -> String {
    category
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| DEFAULT_CATEGORY.to_string())
}
