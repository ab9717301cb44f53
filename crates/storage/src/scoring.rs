//! Placement scoring for (container, item) pairs.

use crate::container::StorageContainer;
use crate::item::ItemSpec;

/// Weight of the space-efficiency term in the combined score.
pub const SPACE_WEIGHT: f64 = 0.5;
/// Weight of the accessibility term in the combined score.
pub const ACCESSIBILITY_WEIGHT: f64 = 0.5;

/// Score a storage container for an incoming item. Higher is better.
///
/// Returns `None` for containers that are not of type `storage` or lack the
/// residual volume or weight; those are excluded rather than scored low.
pub fn score(container: &StorageContainer, item: &ItemSpec) -> Option<f64> {
    if !container.is_storage() || !container.capacity.fits(item.volume, item.weight) {
        return None;
    }
    let space_efficiency = container.capacity.space_efficiency(item.volume);
    let accessibility = container.accessibility_factor * item.priority.fraction();
    Some(SPACE_WEIGHT * space_efficiency + ACCESSIBILITY_WEIGHT * accessibility)
}
