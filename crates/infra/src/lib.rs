//! Infrastructure layer: persistence adapters, configuration, and the
//! service that serializes every operation against the shared cargo state.

pub mod action_log;
pub mod config;
pub mod seed;
pub mod service;
pub mod state_store;

mod integration_tests;

pub use config::{InfraConfig, StoreKind};
pub use service::{CargoService, LogPage, ServiceError, ServiceResult};
