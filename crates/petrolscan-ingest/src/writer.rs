//! Applies a [`Decision`] to the store.

use petrolscan_core::{
    ClassifiedObservation, FuelPriceStore, NewFuelPriceRecord, StoreError, StoredRecord,
};

use crate::detect::Decision;
use crate::error::IngestError;

/// Outcome of [`apply`].
#[derive(Debug, Clone, PartialEq)]
pub enum WriteResult {
    Inserted(StoredRecord),
    Updated(StoredRecord),
    Unchanged,
}

impl WriteResult {
    /// The record as it was written, if anything was written.
    #[must_use]
    pub fn record(&self) -> Option<&StoredRecord> {
        match self {
            Self::Inserted(record) | Self::Updated(record) => Some(record),
            Self::Unchanged => None,
        }
    }
}

/// Executes `decision` for `observation`.
///
/// An insert that loses a race with another worker (uniqueness violation)
/// is retried as an update of the record that won.
///
/// # Errors
///
/// Returns [`IngestError::Conflict`] if a colliding insert cannot be turned
/// into an update, or [`IngestError::Write`] for any other store failure.
pub async fn apply<S: FuelPriceStore>(
    store: &S,
    decision: Decision,
    observation: &ClassifiedObservation,
) -> Result<WriteResult, IngestError> {
    match decision {
        Decision::Skip => Ok(WriteResult::Unchanged),
        Decision::Update => update(store, observation).await.map(WriteResult::Updated),
        Decision::Insert => {
            let record = NewFuelPriceRecord {
                key: observation.identity_key(),
                fields: observation.record_fields(),
            };
            match store.insert_record(&record).await {
                Ok(inserted) => Ok(WriteResult::Inserted(inserted)),
                Err(StoreError::UniqueViolation) => {
                    tracing::debug!(
                        station_name = %observation.observation.station_name,
                        fuel_name = %observation.observation.fuel_name,
                        "insert collided with a concurrent writer, retrying as update"
                    );
                    resolve_conflict(store, observation)
                        .await
                        .map(WriteResult::Updated)
                }
                Err(source) => Err(IngestError::Write { source }),
            }
        }
    }
}

async fn update<S: FuelPriceStore>(
    store: &S,
    observation: &ClassifiedObservation,
) -> Result<StoredRecord, IngestError> {
    store
        .update_record(&observation.identity_key(), &observation.record_fields())
        .await
        .map_err(|source| IngestError::Write { source })
}

async fn resolve_conflict<S: FuelPriceStore>(
    store: &S,
    observation: &ClassifiedObservation,
) -> Result<StoredRecord, IngestError> {
    let conflict = |reason: String| IngestError::Conflict {
        station_name: observation.observation.station_name.clone(),
        reason,
    };

    match store.lookup_existing(&observation.identity_key()).await {
        Ok(Some(_)) => update(store, observation).await,
        Ok(None) => Err(conflict(
            "record reported as duplicate but not found on re-lookup".to_string(),
        )),
        Err(err) => Err(conflict(format!("re-lookup failed: {err}"))),
    }
}
