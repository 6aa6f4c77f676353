//! Observation sources.
//!
//! Browser automation is owned by a separate crawler process that dumps one
//! JSON dataset per station. [`DatasetFileSource`] turns such a dump into
//! [`Observation`]s; other sources only need to implement
//! [`ObservationSource`].

use std::collections::HashMap;
use std::future::Future;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use petrolscan_core::{Location, Observation, Station};
use serde::Deserialize;

use crate::error::SourceError;

/// Produces the current batch of observations for one station.
pub trait ObservationSource: Send + Sync {
    fn station(&self) -> Station;

    fn fetch_observations(
        &self,
    ) -> impl Future<Output = Result<Vec<Observation>, SourceError>> + Send;
}

// ---------------------------------------------------------------------------
// Dataset wire format
// ---------------------------------------------------------------------------

/// A crawler dump holds either one push or a list of pushes. Crawlee keeps
/// every push of a station, so older prices stay in the file.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DatasetFile {
    Many(Vec<DatasetEntry>),
    One(DatasetEntry),
}

#[derive(Debug, Deserialize)]
struct DatasetEntry {
    #[serde(default)]
    crawler: Option<String>,
    #[serde(default)]
    timestamp: Option<DateTime<Utc>>,
    /// Some crawlers push `null` when a page yielded nothing.
    #[serde(default)]
    data: Option<Vec<DatasetLocation>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DatasetLocation {
    station_name: String,
    location: String,
    #[serde(default)]
    lat: Option<f64>,
    #[serde(default)]
    lon: Option<f64>,
    #[serde(default)]
    fuels: Option<Vec<DatasetFuel>>,
}

#[derive(Debug, Deserialize)]
struct DatasetFuel {
    name: String,
    #[serde(default)]
    price: Option<RawPrice>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawPrice {
    Number(f64),
    Text(String),
}

impl RawPrice {
    fn value(&self) -> Option<f64> {
        match self {
            Self::Number(n) => (n.is_finite() && *n >= 0.0).then_some(*n),
            Self::Text(text) => parse_price(text),
        }
    }
}

/// Parses a price as rendered by a station website, e.g. `"34,90 Kč"`.
///
/// Currency symbols and whitespace are dropped and a decimal comma is
/// accepted. Returns `None` for empty, negative or unparsable text.
#[must_use]
pub fn parse_price(text: &str) -> Option<f64> {
    let cleaned: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, ',' | '.' | '-'))
        .collect::<String>()
        .replace(',', ".");
    let cleaned = cleaned.trim_end_matches('.');

    let value = cleaned.parse::<f64>().ok()?;
    (value.is_finite() && value >= 0.0).then_some(value)
}

/// Converts the content of a dataset dump into observations for `station`.
///
/// Pushes are applied oldest first by their `timestamp` (untimed pushes count
/// as oldest, file order breaks ties), and only the newest price of each
/// outlet and fuel name is kept. Fuel rows without a usable price are skipped
/// with a warning. Outlets without coordinates get the `(0, 0)` sentinel.
///
/// # Errors
///
/// Returns [`SourceError::Deserialize`] if the content is not a dataset, or
/// [`SourceError::StationMismatch`] if it was produced by another station's
/// crawler.
pub fn parse_dataset(station: Station, content: &str) -> Result<Vec<Observation>, SourceError> {
    let file: DatasetFile =
        serde_json::from_str(content).map_err(|source| SourceError::Deserialize {
            context: format!("{station} dataset"),
            source,
        })?;

    let mut entries = match file {
        DatasetFile::Many(entries) => entries,
        DatasetFile::One(entry) => vec![entry],
    };
    entries.sort_by_key(|entry| entry.timestamp);

    let mut observations: Vec<Observation> = Vec::new();
    let mut latest: HashMap<(String, String, String), usize> = HashMap::new();
    for entry in entries {
        if let Some(crawler) = entry.crawler.as_deref() {
            // Crawler labels that are not station ids are tolerated.
            if let Ok(found) = crawler.parse::<Station>() {
                if found != station {
                    return Err(SourceError::StationMismatch {
                        expected: station.to_string(),
                        found: found.to_string(),
                    });
                }
            }
        }

        for location in entry.data.unwrap_or_default() {
            let place = match (location.lat, location.lon) {
                (Some(lat), Some(lon)) => Location {
                    name: location.location,
                    lat,
                    lon,
                },
                _ => {
                    tracing::warn!(
                        station = %station,
                        station_name = %location.station_name,
                        location = %location.location,
                        "outlet has no coordinates, using (0, 0)"
                    );
                    Location::ungeocoded(location.location)
                }
            };

            for fuel in location.fuels.unwrap_or_default() {
                let Some(price) = fuel.price.as_ref().and_then(RawPrice::value) else {
                    tracing::warn!(
                        station = %station,
                        station_name = %location.station_name,
                        fuel_name = %fuel.name,
                        "skipping fuel row without a usable price"
                    );
                    continue;
                };

                let key = (
                    location.station_name.clone(),
                    place.name.clone(),
                    fuel.name.clone(),
                );
                let observation = Observation {
                    station,
                    station_name: location.station_name.clone(),
                    location: place.clone(),
                    fuel_name: fuel.name,
                    price,
                };
                match latest.get(&key) {
                    Some(&index) => observations[index] = observation,
                    None => {
                        latest.insert(key, observations.len());
                        observations.push(observation);
                    }
                }
            }
        }
    }

    Ok(observations)
}

// ---------------------------------------------------------------------------
// File-backed source
// ---------------------------------------------------------------------------

/// Reads the dataset dump of one station from disk.
#[derive(Debug, Clone)]
pub struct DatasetFileSource {
    station: Station,
    path: PathBuf,
}

impl DatasetFileSource {
    #[must_use]
    pub fn new(station: Station, path: impl Into<PathBuf>) -> Self {
        Self {
            station,
            path: path.into(),
        }
    }

    /// Source for `<dir>/<station>.json`.
    #[must_use]
    pub fn in_dir(dir: &Path, station: Station) -> Self {
        Self::new(station, dir.join(format!("{station}.json")))
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ObservationSource for DatasetFileSource {
    fn station(&self) -> Station {
        self.station
    }

    async fn fetch_observations(&self) -> Result<Vec<Observation>, SourceError> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| SourceError::Io {
                path: self.path.display().to_string(),
                source,
            })?;

        let observations = parse_dataset(self.station, &content)?;
        tracing::debug!(
            station = %self.station,
            path = %self.path.display(),
            count = observations.len(),
            "loaded dataset"
        );
        Ok(observations)
    }
}

#[cfg(test)]
#[path = "source_test.rs"]
mod tests;
