//! Sample hold used to bootstrap an empty store.

use chrono::{DateTime, Duration, Utc};

use cargohold_core::{ContainerId, DomainResult};
use cargohold_storage::{
    place, CargoState, NewContainer, NewItem, NewWasteContainer,
};

/// Two storage containers, one item in each, and a general waste container
/// scheduled to undock in 30 days.
pub fn sample_state(now: DateTime<Utc>) -> DomainResult<CargoState> {
    let today = now.date_naive();
    let mut state = CargoState::default();

    let mut main = NewContainer::new("storage_001", 100.0, 200.0).with_accessibility(0.9);
    main.name = Some("Main Storage A".to_string());
    state.add_container(main)?;

    let mut medical = NewContainer::new("storage_002", 50.0, 100.0).with_accessibility(0.8);
    medical.name = Some("Medical Storage".to_string());
    state.add_container(medical)?;

    let mut waste = NewWasteContainer::new("waste_001", 30.0, 50.0).accepting(["general", "organic"]);
    waste.name = Some("General Waste".to_string());
    waste.undock_date = Some(today + Duration::days(30));
    state.add_waste_container(waste)?;

    place(
        &mut state,
        NewItem::new("item_001", "Food Packet A", 0.5, 0.3)
            .with_priority(4)
            .with_category("food")
            .with_expiration(today + Duration::days(90)),
        Some(ContainerId::new("storage_001")?),
        now - Duration::days(10),
    )?;
    place(
        &mut state,
        NewItem::new("item_002", "Medical Kit", 2.0, 1.5)
            .with_priority(5)
            .with_category("medical")
            .with_expiration(today + Duration::days(180)),
        Some(ContainerId::new("storage_002")?),
        now - Duration::days(5),
    )?;

    Ok(state)
}
