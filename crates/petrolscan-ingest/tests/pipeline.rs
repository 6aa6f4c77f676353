//! End-to-end pipeline behaviour against in-memory stores.

use std::sync::Arc;

use petrolscan_core::{
    FuelPriceStore, FuelQuality, FuelType, IdentityKey, Location, NewFuelPriceRecord,
    Observation, RecordFields, Station, StoreError, StoredRecord,
};
use petrolscan_ingest::{
    apply, decide, Decision, IngestError, IngestSummary, MemoryStore, Pipeline, WriteResult,
};
use tracing::Span;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn observation(station: Station, station_name: &str, fuel_name: &str, price: f64) -> Observation {
    Observation {
        station,
        station_name: station_name.to_string(),
        location: Location {
            name: "Praha Zličín".to_string(),
            lat: 50.05,
            lon: 14.29,
        },
        fuel_name: fuel_name.to_string(),
        price,
    }
}

fn globus(fuel_name: &str, price: f64) -> Observation {
    observation(Station::Globus, "Globus Praha Zličín", fuel_name, price)
}

fn pipeline() -> Pipeline<MemoryStore> {
    Pipeline::new(MemoryStore::new(), Span::none())
}

/// Fails every lookup for one outlet and delegates everything else.
struct FlakyStore {
    inner: MemoryStore,
    broken_station_name: &'static str,
}

impl FuelPriceStore for FlakyStore {
    async fn lookup_existing(&self, key: &IdentityKey) -> Result<Option<StoredRecord>, StoreError> {
        if key.station_name == self.broken_station_name {
            return Err(StoreError::Backend("connection reset".into()));
        }
        self.inner.lookup_existing(key).await
    }

    async fn insert_record(&self, record: &NewFuelPriceRecord) -> Result<StoredRecord, StoreError> {
        self.inner.insert_record(record).await
    }

    async fn update_record(
        &self,
        key: &IdentityKey,
        fields: &RecordFields,
    ) -> Result<StoredRecord, StoreError> {
        self.inner.update_record(key, fields).await
    }
}

/// Lets a competing worker win every insert race.
struct RacingStore {
    inner: MemoryStore,
    competitor_price: f64,
}

impl FuelPriceStore for RacingStore {
    async fn lookup_existing(&self, key: &IdentityKey) -> Result<Option<StoredRecord>, StoreError> {
        self.inner.lookup_existing(key).await
    }

    async fn insert_record(&self, record: &NewFuelPriceRecord) -> Result<StoredRecord, StoreError> {
        let competitor = NewFuelPriceRecord {
            key: record.key.clone(),
            fields: RecordFields {
                price: self.competitor_price,
                ..record.fields.clone()
            },
        };
        // Ignore the outcome: the competitor may already have won earlier.
        let _ = self.inner.insert_record(&competitor).await;
        self.inner.insert_record(record).await
    }

    async fn update_record(
        &self,
        key: &IdentityKey,
        fields: &RecordFields,
    ) -> Result<StoredRecord, StoreError> {
        self.inner.update_record(key, fields).await
    }
}

/// Reports a uniqueness violation for a record it never returns.
struct GhostStore;

impl FuelPriceStore for GhostStore {
    async fn lookup_existing(&self, _key: &IdentityKey) -> Result<Option<StoredRecord>, StoreError> {
        Ok(None)
    }

    async fn insert_record(&self, _record: &NewFuelPriceRecord) -> Result<StoredRecord, StoreError> {
        Err(StoreError::UniqueViolation)
    }

    async fn update_record(
        &self,
        _key: &IdentityKey,
        _fields: &RecordFields,
    ) -> Result<StoredRecord, StoreError> {
        Err(StoreError::NotFound)
    }
}

// ---------------------------------------------------------------------------
// Section 1: change detection through the pipeline
// ---------------------------------------------------------------------------

#[tokio::test]
async fn reingesting_identical_observation_inserts_then_skips() {
    let pipeline = pipeline();

    let first = pipeline.process(globus("Natural 95", 34.90)).await.unwrap();
    let second = pipeline.process(globus("Natural 95", 34.90)).await.unwrap();

    assert!(matches!(first, WriteResult::Inserted(_)));
    assert_eq!(second, WriteResult::Unchanged);
    assert_eq!(pipeline.store().len(), 1);
    assert_eq!(pipeline.store().write_count(), 1);
}

#[tokio::test]
async fn any_price_change_is_an_update() {
    let pipeline = pipeline();
    pipeline.process(globus("Natural 95", 34.90)).await.unwrap();

    let result = pipeline.process(globus("Natural 95", 34.91)).await.unwrap();

    let WriteResult::Updated(record) = result else {
        panic!("expected update, got {result:?}");
    };
    assert!((record.price - 34.91).abs() < f64::EPSILON);
    assert_eq!(pipeline.store().len(), 1);
}

#[tokio::test]
async fn diesel_price_rise_updates_existing_record_in_place() {
    let store = MemoryStore::new();
    let outlet = || observation(Station::Orlen, "Orlen Brno", "Diesel", 32.50);

    let pipeline = Pipeline::new(store, Span::none());
    let inserted = pipeline.process(outlet()).await.unwrap();
    let inserted = inserted.record().cloned().unwrap();
    assert_eq!(inserted.fuel_type, FuelType::Diesel);

    let mut rise = outlet();
    rise.price = 32.80;
    let classified = petrolscan_classify::classify_observation(rise.clone());
    assert_eq!(
        decide(pipeline.store(), &classified).await.unwrap(),
        Decision::Update
    );

    let updated = pipeline.process(rise).await.unwrap();
    let updated = updated.record().cloned().unwrap();

    assert_eq!(updated.id, inserted.id);
    assert_eq!(updated.identity_key(), inserted.identity_key());
    assert!((updated.price - 32.80).abs() < f64::EPSILON);
    assert!(updated.timestamp >= inserted.timestamp);
}

#[tokio::test]
async fn globus_standard_diesel_rise_updates_same_record() {
    let outlet = |price| Observation {
        station: Station::Globus,
        station_name: "Globus Praha Čakovice".to_string(),
        location: Location {
            name: "Praha Čakovice".to_string(),
            lat: 50.1,
            lon: 14.2,
        },
        fuel_name: "Diesel".to_string(),
        price,
    };
    let pipeline = pipeline();

    let first = pipeline.process(outlet(32.50)).await.unwrap();
    let WriteResult::Inserted(inserted) = first else {
        panic!("expected insert, got {first:?}");
    };
    assert_eq!(inserted.fuel_type, FuelType::Diesel);
    assert_eq!(inserted.fuel_quality, Some(FuelQuality::Standard));

    let classified = petrolscan_classify::classify_observation(outlet(32.80));
    assert_eq!(
        decide(pipeline.store(), &classified).await.unwrap(),
        Decision::Update
    );

    let second = pipeline.process(outlet(32.80)).await.unwrap();
    let WriteResult::Updated(updated) = second else {
        panic!("expected update, got {second:?}");
    };
    assert_eq!(updated.id, inserted.id);
    assert_eq!(updated.fuel_quality, Some(FuelQuality::Standard));
    assert!((updated.lat - 50.1).abs() < f64::EPSILON);
    assert!((updated.lon - 14.2).abs() < f64::EPSILON);
    assert!((updated.price - 32.80).abs() < f64::EPSILON);
    assert_eq!(pipeline.store().len(), 1);
}

#[tokio::test]
async fn quality_variants_are_separate_records() {
    let pipeline = pipeline();

    pipeline.process(globus("Natural 95", 34.90)).await.unwrap();
    let premium = pipeline
        .process(globus("Natural 95 Plus", 36.90))
        .await
        .unwrap();

    assert!(matches!(premium, WriteResult::Inserted(_)));

    let records = pipeline.store().records();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].fuel_quality, Some(FuelQuality::Standard));
    assert_eq!(records[1].fuel_quality, Some(FuelQuality::Premium));
    assert!(records.iter().all(|r| r.fuel_type == FuelType::Petrol));
}

#[tokio::test]
async fn unclassified_fuels_are_still_stored() {
    let pipeline = pipeline();
    let result = pipeline
        .process(observation(Station::Makro, "Makro Brno", "Mycí program", 99.0))
        .await
        .unwrap();

    let record = result.record().unwrap();
    assert_eq!(record.fuel_type, FuelType::Unclassified);
    assert!(record.fuel_quality.is_none());
    assert_eq!(record.fuel_name, "Mycí program");
}

// ---------------------------------------------------------------------------
// Section 2: failure handling
// ---------------------------------------------------------------------------

#[tokio::test]
async fn lookup_failure_writes_nothing() {
    let pipeline = pipeline();
    pipeline.store().set_fail_lookups(true);

    let err = pipeline
        .process(globus("Diesel", 32.50))
        .await
        .unwrap_err();

    assert!(matches!(err, IngestError::Lookup { .. }));
    assert!(err.is_retryable());
    assert_eq!(pipeline.store().write_count(), 0);
    assert!(pipeline.store().is_empty());
}

#[tokio::test]
async fn lost_insert_race_is_resolved_as_update() {
    let store = RacingStore {
        inner: MemoryStore::new(),
        competitor_price: 33.00,
    };
    let pipeline = Pipeline::new(store, Span::none());

    let result = pipeline.process(globus("Diesel", 32.50)).await.unwrap();

    let WriteResult::Updated(record) = result else {
        panic!("expected conflict to resolve as update, got {result:?}");
    };
    assert!((record.price - 32.50).abs() < f64::EPSILON);
    assert_eq!(pipeline.store().inner.len(), 1);
}

#[tokio::test]
async fn unresolvable_conflict_is_reported() {
    let classified = petrolscan_classify::classify_observation(globus("Diesel", 32.50));

    let err = apply(&GhostStore, Decision::Insert, &classified)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        IngestError::Conflict { ref station_name, .. } if station_name == "Globus Praha Zličín"
    ));
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn update_of_vanished_record_is_a_write_error() {
    let classified = petrolscan_classify::classify_observation(globus("Diesel", 32.50));

    let err = apply(&GhostStore, Decision::Update, &classified)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        IngestError::Write {
            source: StoreError::NotFound
        }
    ));
}

#[tokio::test]
async fn skip_decision_never_touches_the_store() {
    let classified = petrolscan_classify::classify_observation(globus("Diesel", 32.50));
    let result = apply(&GhostStore, Decision::Skip, &classified).await.unwrap();
    assert_eq!(result, WriteResult::Unchanged);
}

#[tokio::test]
async fn one_failing_observation_does_not_stop_the_batch() {
    let store = FlakyStore {
        inner: MemoryStore::new(),
        broken_station_name: "Globus Ostrava",
    };
    let pipeline = Pipeline::new(store, Span::none());

    let summary = pipeline
        .ingest(vec![
            globus("Natural 95", 34.90),
            observation(Station::Globus, "Globus Ostrava", "Diesel", 32.10),
            globus("Diesel", 32.50),
        ])
        .await;

    assert_eq!(
        summary,
        IngestSummary {
            inserted: 2,
            updated: 0,
            skipped: 0,
            failed: 1,
            dropped: 0,
        }
    );
    assert_eq!(pipeline.store().inner.len(), 2);
}

// ---------------------------------------------------------------------------
// Section 3: batches and ungeocoded outlets
// ---------------------------------------------------------------------------

#[tokio::test]
async fn ingest_summary_counts_each_outcome() {
    let pipeline = pipeline();
    pipeline
        .ingest(vec![globus("Natural 95", 34.90), globus("Diesel", 32.50)])
        .await;

    let summary = pipeline
        .ingest(vec![
            globus("Natural 95", 34.90),
            globus("Diesel", 32.80),
            globus("AdBlue", 18.90),
        ])
        .await;

    assert_eq!(summary.inserted, 1);
    assert_eq!(summary.updated, 1);
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.failed, 0);
    assert_eq!(summary.written(), 2);
    assert_eq!(summary.processed(), 3);
}

#[tokio::test]
async fn ungeocoded_outlets_are_kept_by_default() {
    let pipeline = pipeline();
    let mut obs = globus("Diesel", 32.50);
    obs.location = Location::ungeocoded("Neznámá");

    let summary = pipeline.ingest(vec![obs]).await;

    assert_eq!(summary.inserted, 1);
    assert!(pipeline.store().records()[0].identity_key().lat.abs() < f64::EPSILON);
}

#[tokio::test]
async fn ungeocoded_outlets_can_be_dropped() {
    let pipeline = pipeline().skip_ungeocoded(true);
    let mut obs = globus("Diesel", 32.50);
    obs.location = Location::ungeocoded("Neznámá");

    let summary = pipeline.ingest(vec![obs, globus("Diesel", 32.50)]).await;

    assert_eq!(summary.dropped, 1);
    assert_eq!(summary.inserted, 1);
    assert_eq!(pipeline.store().len(), 1);
}

#[tokio::test]
async fn workers_can_share_one_store() {
    let store = Arc::new(MemoryStore::new());
    let globus_worker = Pipeline::new(Arc::clone(&store), Span::none());
    let ono_worker = Pipeline::new(Arc::clone(&store), Span::none());

    let (a, b) = tokio::join!(
        globus_worker.ingest(vec![globus("Diesel", 32.50)]),
        ono_worker.ingest(vec![observation(Station::Ono, "ONO Praha", "nmc", 31.90)]),
    );

    assert_eq!(a.inserted + b.inserted, 2);
    assert_eq!(store.len(), 2);
}
