//! Change detection: decides whether an observation needs to be written.

use std::fmt;

use petrolscan_core::{ClassifiedObservation, FuelPriceStore, StoredRecord};

use crate::error::IngestError;

/// What the writer must do with an observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// No record exists under the identity key.
    Insert,
    /// A record exists but at least one mutable field differs.
    Update,
    /// The stored record already carries the observed values.
    Skip,
}

impl Decision {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Insert => "insert",
            Self::Update => "update",
            Self::Skip => "skip",
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compares an observation against the record stored under its key.
///
/// Location name, fuel name and price are compared exactly; a price moving
/// from 34.90 to 34.91 is an update.
#[must_use]
pub fn compare(existing: Option<&StoredRecord>, observation: &ClassifiedObservation) -> Decision {
    match existing {
        None => Decision::Insert,
        Some(record) if record.fields() == observation.record_fields() => Decision::Skip,
        Some(_) => Decision::Update,
    }
}

/// Looks up the stored record for `observation` and decides what to write.
///
/// # Errors
///
/// Returns [`IngestError::Lookup`] if the store cannot be queried. The
/// observation must then not be written at all.
pub async fn decide<S: FuelPriceStore>(
    store: &S,
    observation: &ClassifiedObservation,
) -> Result<Decision, IngestError> {
    let existing = store
        .lookup_existing(&observation.identity_key())
        .await
        .map_err(|source| IngestError::Lookup { source })?;

    Ok(compare(existing.as_ref(), observation))
}
