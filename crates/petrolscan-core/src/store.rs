//! Storage seam for persisted fuel price records.
//!
//! The ingest pipeline only talks to [`FuelPriceStore`]; the Postgres adapter
//! lives in `petrolscan-db` and an in-memory one in `petrolscan-ingest`.

use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::fuel::{FuelQuality, FuelType};
use crate::observation::{IdentityKey, RecordFields};

/// A persisted row of `fuel_price_records`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRecord {
    pub id: i64,
    /// Server time of the last write.
    pub timestamp: DateTime<Utc>,
    pub station_name: String,
    pub location_name: String,
    pub lat: f64,
    pub lon: f64,
    pub fuel_type: FuelType,
    pub fuel_quality: Option<FuelQuality>,
    pub fuel_name: String,
    pub price: f64,
}

impl StoredRecord {
    #[must_use]
    pub fn identity_key(&self) -> IdentityKey {
        IdentityKey {
            station_name: self.station_name.clone(),
            lat: self.lat,
            lon: self.lon,
            fuel_type: self.fuel_type,
            fuel_quality: self.fuel_quality,
        }
    }

    #[must_use]
    pub fn fields(&self) -> RecordFields {
        RecordFields {
            location_name: self.location_name.clone(),
            fuel_name: self.fuel_name.clone(),
            price: self.price,
        }
    }
}

/// Input for creating a new record: its identity plus initial mutable fields.
#[derive(Debug, Clone, PartialEq)]
pub struct NewFuelPriceRecord {
    pub key: IdentityKey,
    pub fields: RecordFields,
}

#[derive(Debug, Error)]
pub enum StoreError {
    /// Another writer created a row with the same identity key first.
    #[error("a record with this identity key already exists")]
    UniqueViolation,
    #[error("no record exists for this identity key")]
    NotFound,
    /// The row read back from the backend could not be decoded.
    #[error("malformed stored record: {0}")]
    Malformed(String),
    #[error("store backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Persistence operations required by the change-detection pipeline.
///
/// Implementations must match identity keys exactly, including an unspecified
/// quality only matching another unspecified quality.
pub trait FuelPriceStore: Send + Sync {
    /// Returns the record stored under `key`, if any.
    fn lookup_existing(
        &self,
        key: &IdentityKey,
    ) -> impl Future<Output = Result<Option<StoredRecord>, StoreError>> + Send;

    /// Creates a record. Fails with [`StoreError::UniqueViolation`] when the
    /// key is already taken.
    fn insert_record(
        &self,
        record: &NewFuelPriceRecord,
    ) -> impl Future<Output = Result<StoredRecord, StoreError>> + Send;

    /// Overwrites the mutable fields of the record under `key` and refreshes
    /// its timestamp. Fails with [`StoreError::NotFound`] when absent.
    fn update_record(
        &self,
        key: &IdentityKey,
        fields: &RecordFields,
    ) -> impl Future<Output = Result<StoredRecord, StoreError>> + Send;
}

impl<T: FuelPriceStore> FuelPriceStore for Arc<T> {
    fn lookup_existing(
        &self,
        key: &IdentityKey,
    ) -> impl Future<Output = Result<Option<StoredRecord>, StoreError>> + Send {
        (**self).lookup_existing(key)
    }

    fn insert_record(
        &self,
        record: &NewFuelPriceRecord,
    ) -> impl Future<Output = Result<StoredRecord, StoreError>> + Send {
        (**self).insert_record(record)
    }

    fn update_record(
        &self,
        key: &IdentityKey,
        fields: &RecordFields,
    ) -> impl Future<Output = Result<StoredRecord, StoreError>> + Send {
        (**self).update_record(key, fields)
    }
}
