//! Canonical station and fuel taxonomy shared by every crate in the workspace.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::CoreError;

/// A fuel retail chain whose website is crawled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Station {
    Globus,
    Orlen,
    Shell,
    EuroOil,
    Ono,
    Mol,
    Omv,
    Prim,
    Makro,
}

impl Station {
    /// Every known station, in registry order.
    pub const ALL: [Station; 9] = [
        Station::Globus,
        Station::Orlen,
        Station::Shell,
        Station::EuroOil,
        Station::Ono,
        Station::Mol,
        Station::Omv,
        Station::Prim,
        Station::Makro,
    ];

    /// Lower-case identifier used in config files, dataset names and logs.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Station::Globus => "globus",
            Station::Orlen => "orlen",
            Station::Shell => "shell",
            Station::EuroOil => "eurooil",
            Station::Ono => "ono",
            Station::Mol => "mol",
            Station::Omv => "omv",
            Station::Prim => "prim",
            Station::Makro => "makro",
        }
    }
}

impl std::fmt::Display for Station {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Station {
    type Err = CoreError;

    /// Parses a station identifier, ignoring case and surrounding whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Station::ALL
            .into_iter()
            .find(|station| station.as_str() == wanted)
            .ok_or_else(|| CoreError::UnknownStation(s.to_string()))
    }
}

/// Kind of product sold at the pump (or at the counter, for the non-fuels).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FuelType {
    Petrol,
    Diesel,
    Cng,
    Lpg,
    Hvo,
    #[serde(rename = "ADBLUE")]
    AdBlue,
    WindscreenCleaner,
    /// No rule matched the raw fuel name. A valid outcome, not an error.
    Unclassified,
}

impl FuelType {
    /// Value stored in the `fuel_type` column.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            FuelType::Petrol => "PETROL",
            FuelType::Diesel => "DIESEL",
            FuelType::Cng => "CNG",
            FuelType::Lpg => "LPG",
            FuelType::Hvo => "HVO",
            FuelType::AdBlue => "ADBLUE",
            FuelType::WindscreenCleaner => "WINDSCREEN_CLEANER",
            FuelType::Unclassified => "UNCLASSIFIED",
        }
    }

    #[must_use]
    pub fn is_classified(self) -> bool {
        self != FuelType::Unclassified
    }
}

impl std::fmt::Display for FuelType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FuelType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PETROL" => Ok(FuelType::Petrol),
            "DIESEL" => Ok(FuelType::Diesel),
            "CNG" => Ok(FuelType::Cng),
            "LPG" => Ok(FuelType::Lpg),
            "HVO" => Ok(FuelType::Hvo),
            "ADBLUE" => Ok(FuelType::AdBlue),
            "WINDSCREEN_CLEANER" => Ok(FuelType::WindscreenCleaner),
            "UNCLASSIFIED" => Ok(FuelType::Unclassified),
            other => Err(CoreError::InvalidFuelType(other.to_string())),
        }
    }
}

/// Grade of a fuel within its type.
///
/// An unspecified quality is modelled as `Option::None` and stored as `NULL`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FuelQuality {
    Standard,
    Midgrade,
    Premium,
    Racing,
}

impl FuelQuality {
    /// Value stored in the `fuel_quality` column.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            FuelQuality::Standard => "STANDARD",
            FuelQuality::Midgrade => "MIDGRADE",
            FuelQuality::Premium => "PREMIUM",
            FuelQuality::Racing => "RACING",
        }
    }
}

impl std::fmt::Display for FuelQuality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FuelQuality {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "STANDARD" => Ok(FuelQuality::Standard),
            "MIDGRADE" => Ok(FuelQuality::Midgrade),
            "PREMIUM" => Ok(FuelQuality::Premium),
            "RACING" => Ok(FuelQuality::Racing),
            other => Err(CoreError::InvalidFuelQuality(other.to_string())),
        }
    }
}
