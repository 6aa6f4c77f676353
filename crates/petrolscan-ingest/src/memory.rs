//! In-memory [`FuelPriceStore`] used by dry runs and tests.

use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use petrolscan_core::{
    FuelPriceStore, IdentityKey, NewFuelPriceRecord, RecordFields, StoreError, StoredRecord,
};

#[derive(Debug, Default)]
struct Inner {
    records: Vec<StoredRecord>,
    next_id: i64,
    inserts: usize,
    updates: usize,
    fail_lookups: bool,
}

/// Keeps records in a `Vec` behind a mutex, enforcing the same identity-key
/// uniqueness as the Postgres table.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshot of all stored records in insertion order.
    #[must_use]
    pub fn records(&self) -> Vec<StoredRecord> {
        self.lock().records.clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of successful inserts plus updates since creation.
    #[must_use]
    pub fn write_count(&self) -> usize {
        let inner = self.lock();
        inner.inserts + inner.updates
    }

    /// Makes every subsequent lookup fail with a backend error.
    pub fn set_fail_lookups(&self, fail: bool) {
        self.lock().fail_lookups = fail;
    }
}

impl FuelPriceStore for MemoryStore {
    async fn lookup_existing(&self, key: &IdentityKey) -> Result<Option<StoredRecord>, StoreError> {
        let inner = self.lock();
        if inner.fail_lookups {
            return Err(StoreError::Backend("lookup unavailable".into()));
        }
        Ok(inner
            .records
            .iter()
            .find(|record| record.identity_key() == *key)
            .cloned())
    }

    async fn insert_record(&self, record: &NewFuelPriceRecord) -> Result<StoredRecord, StoreError> {
        let mut inner = self.lock();
        if inner.records.iter().any(|r| r.identity_key() == record.key) {
            return Err(StoreError::UniqueViolation);
        }

        inner.next_id += 1;
        let stored = StoredRecord {
            id: inner.next_id,
            timestamp: Utc::now(),
            station_name: record.key.station_name.clone(),
            location_name: record.fields.location_name.clone(),
            lat: record.key.lat,
            lon: record.key.lon,
            fuel_type: record.key.fuel_type,
            fuel_quality: record.key.fuel_quality,
            fuel_name: record.fields.fuel_name.clone(),
            price: record.fields.price,
        };
        inner.records.push(stored.clone());
        inner.inserts += 1;
        Ok(stored)
    }

    async fn update_record(
        &self,
        key: &IdentityKey,
        fields: &RecordFields,
    ) -> Result<StoredRecord, StoreError> {
        let mut inner = self.lock();
        let record = inner
            .records
            .iter_mut()
            .find(|record| record.identity_key() == *key)
            .ok_or(StoreError::NotFound)?;

        record.location_name.clone_from(&fields.location_name);
        record.fuel_name.clone_from(&fields.fuel_name);
        record.price = fields.price;
        record.timestamp = Utc::now();
        let updated = record.clone();

        inner.updates += 1;
        Ok(updated)
    }
}
