use serde::{Deserialize, Serialize};

use crate::fuel::{FuelQuality, FuelType, Station};

/// Coordinates reported when geocoding a station address failed.
pub const UNGEOCODED: (f64, f64) = (0.0, 0.0);

/// A named station outlet with (possibly sentinel) GPS coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
}

impl Location {
    /// Builds a location whose coordinates could not be resolved.
    #[must_use]
    pub fn ungeocoded(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            lat: UNGEOCODED.0,
            lon: UNGEOCODED.1,
        }
    }

    /// Returns `true` when the coordinates are the `(0, 0)` sentinel.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn is_ungeocoded(&self) -> bool {
        self.lat == UNGEOCODED.0 && self.lon == UNGEOCODED.1
    }
}

/// One scraped fuel price at one outlet, before classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub station: Station,
    /// Display name of the specific outlet, e.g. `"Globus Praha Zličín"`.
    pub station_name: String,
    pub location: Location,
    /// Fuel name exactly as rendered by the source site.
    pub fuel_name: String,
    /// Price in the local currency unit of the source. Never converted.
    pub price: f64,
}

/// An [`Observation`] with its canonical fuel type and quality attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedObservation {
    pub observation: Observation,
    pub fuel_type: FuelType,
    pub fuel_quality: Option<FuelQuality>,
}

impl ClassifiedObservation {
    /// Identity key under which this observation is stored.
    #[must_use]
    pub fn identity_key(&self) -> IdentityKey {
        IdentityKey {
            station_name: self.observation.station_name.clone(),
            lat: self.observation.location.lat,
            lon: self.observation.location.lon,
            fuel_type: self.fuel_type,
            fuel_quality: self.fuel_quality,
        }
    }

    /// The mutable fields carried by this observation.
    #[must_use]
    pub fn record_fields(&self) -> RecordFields {
        RecordFields {
            location_name: self.observation.location.name.clone(),
            fuel_name: self.observation.fuel_name.clone(),
            price: self.observation.price,
        }
    }
}

/// Natural identity of a stored fuel price record.
///
/// `fuel_quality: None` only ever matches another `None`; it is not a wildcard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentityKey {
    pub station_name: String,
    pub lat: f64,
    pub lon: f64,
    pub fuel_type: FuelType,
    pub fuel_quality: Option<FuelQuality>,
}

/// Fields of a stored record that may change after it is created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordFields {
    pub location_name: String,
    pub fuel_name: String,
    pub price: f64,
}
