//! Shared domain types, configuration and the storage seam for PetrolScan.

pub mod app_config;
pub mod config;
pub mod fuel;
pub mod observation;
pub mod stations;
pub mod store;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use fuel::{FuelQuality, FuelType, Station};
pub use observation::{
    ClassifiedObservation, IdentityKey, Location, Observation, RecordFields, UNGEOCODED,
};
pub use stations::{load_stations, parse_stations, StationConfig, StationsFile};
pub use store::{FuelPriceStore, NewFuelPriceRecord, StoreError, StoredRecord};

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("unknown station: {0}")]
    UnknownStation(String),
    #[error("invalid fuel type: {0}")]
    InvalidFuelType(String),
    #[error("invalid fuel quality: {0}")]
    InvalidFuelQuality(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
    #[error("failed to read stations file {path}: {source}")]
    StationsFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse stations file: {0}")]
    StationsFileParse(#[source] serde_yaml::Error),
    #[error("invalid station configuration: {0}")]
    Validation(String),
}
