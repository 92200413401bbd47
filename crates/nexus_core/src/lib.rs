//! Core storage and domain logic for Nexus Hub.
//! This crate owns the persisted collections and every rule applied to them.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{core_config, CoreConfig};
pub use logging::{default_log_level, init_logging, init_logging_from_config, logging_status};
pub use model::license::{DownloadDenial, License};
pub use model::software::Software;
pub use model::video::Video;
pub use model::{Collection, Record, UnknownCollection};
pub use repo::store::{RecordStore, SqliteStore, StorageError, StorageResult};
pub use service::catalog_service::{CatalogError, CatalogResult, CatalogService};
pub use service::license_service::{DownloadGrant, LicenseError, LicenseResult, LicenseService};
pub use service::seed::{default_software, seed_defaults, SeedOutcome};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
