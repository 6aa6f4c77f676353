use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::fuel::Station;
use crate::ConfigError;

/// One crawler entry from `config/stations.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StationConfig {
    pub station: Station,
    /// Human-readable chain name, e.g. `"EuroOil"`.
    pub name: String,
    /// Landing page the browser crawler starts from.
    pub url: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub struct StationsFile {
    pub stations: Vec<StationConfig>,
}

impl StationsFile {
    /// Enabled stations, optionally narrowed to a single one.
    #[must_use]
    pub fn enabled(&self, only: Option<Station>) -> Vec<&StationConfig> {
        self.stations
            .iter()
            .filter(|s| s.enabled)
            .filter(|s| only.is_none_or(|wanted| s.station == wanted))
            .collect()
    }

    #[must_use]
    pub fn get(&self, station: Station) -> Option<&StationConfig> {
        self.stations.iter().find(|s| s.station == station)
    }
}

/// Load and validate the station registry from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_stations(path: &Path) -> Result<StationsFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::StationsFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_stations(&content)
}

/// Parse and validate station registry YAML.
///
/// # Errors
///
/// Returns `ConfigError` if the YAML is malformed or fails validation.
pub fn parse_stations(content: &str) -> Result<StationsFile, ConfigError> {
    let stations_file: StationsFile =
        serde_yaml::from_str(content).map_err(ConfigError::StationsFileParse)?;

    validate_stations(&stations_file)?;

    Ok(stations_file)
}

fn validate_stations(stations_file: &StationsFile) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();

    for entry in &stations_file.stations {
        if entry.name.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "station '{}' must have a non-empty name",
                entry.station
            )));
        }

        if !(entry.url.starts_with("https://") || entry.url.starts_with("http://")) {
            return Err(ConfigError::Validation(format!(
                "station '{}' has invalid url '{}'; must start with http:// or https://",
                entry.station, entry.url
            )));
        }

        if !seen.insert(entry.station) {
            return Err(ConfigError::Validation(format!(
                "duplicate station entry: '{}'",
                entry.station
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "stations_test.rs"]
mod tests;
