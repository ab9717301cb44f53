//! Service wiring: pick the configured stores and open the cargo service.

use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;

use cargohold_infra::action_log::ActionLog;
use cargohold_infra::seed::sample_state;
use cargohold_infra::state_store::StateStore;
use cargohold_infra::{CargoService, InfraConfig};

/// The service as the API holds it: store kinds are chosen at startup.
pub type AppServices = CargoService<Arc<dyn StateStore>, Arc<dyn ActionLog>>;

/// Open the configured stores, seeding the sample hold into an empty store
/// when enabled.
pub fn build_services(config: &InfraConfig) -> anyhow::Result<AppServices> {
    let (store, log) = config.open_stores();
    let seed = if config.seed_sample {
        Some(sample_state(Utc::now()).context("failed to build sample cargo state")?)
    } else {
        None
    };
    CargoService::open(store, log, seed).context("failed to open cargo state")
}
