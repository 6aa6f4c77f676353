//! Fuel name classification.
//!
//! Maps a `(station, raw fuel name)` pair to the canonical
//! [`FuelType`] / [`FuelQuality`] taxonomy using fixed per-station rule
//! tables (see [`tables`]). Classification is pure and total: names that no
//! rule covers come back as [`FuelType::Unclassified`] and `None`.

pub mod rules;
pub mod tables;

use petrolscan_core::{ClassifiedObservation, FuelQuality, FuelType, Observation, Station};

use crate::rules::{first_match, matching_text};

/// Classifies a raw fuel name as rendered by `station`'s website.
///
/// Type and quality are resolved independently; either may be missing.
#[must_use]
pub fn classify(station: Station, fuel_name: &str) -> (FuelType, Option<FuelQuality>) {
    let name = matching_text(fuel_name);
    let fuel_type =
        first_match(tables::type_rules(station), &name).unwrap_or(FuelType::Unclassified);
    let fuel_quality = first_match(tables::quality_rules(station), &name);
    (fuel_type, fuel_quality)
}

/// Like [`classify`], but accepts a station identifier as text.
///
/// Unknown identifiers classify as `(Unclassified, None)`.
#[must_use]
pub fn classify_str(station: &str, fuel_name: &str) -> (FuelType, Option<FuelQuality>) {
    match station.parse::<Station>() {
        Ok(station) => classify(station, fuel_name),
        Err(_) => (FuelType::Unclassified, None),
    }
}

/// Attaches type and quality to an observation. Only the station and the raw
/// fuel name are consulted.
#[must_use]
pub fn classify_observation(observation: Observation) -> ClassifiedObservation {
    let (fuel_type, fuel_quality) = classify(observation.station, &observation.fuel_name);
    ClassifiedObservation {
        observation,
        fuel_type,
        fuel_quality,
    }
}

#[cfg(test)]
#[path = "classify_test.rs"]
mod tests;
