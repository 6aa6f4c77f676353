//! Per-station classification tables.
//!
//! Table order is the tie-break: within one station the rules are written to
//! be mutually exclusive, but when two could fire the earlier one wins.
//! Stations whose fuel names carry no grade information have an empty
//! quality table.

use petrolscan_core::{FuelQuality, FuelType, Station};

use crate::rules::Matcher::{Contains, Lacks, NoPremiumMarker, PremiumMarker, StartsWith};
use crate::rules::Rule;

const fn rule<T: 'static>(all: &'static [crate::rules::Matcher], result: T) -> Rule<T> {
    Rule { all, result }
}

// ---------------------------------------------------------------------------
// Fuel type
// ---------------------------------------------------------------------------

/// Globus: "Natural 95", "Natural 95 Plus", "Diesel", "Diesel Plus", "AdBlue",
/// "Kapalina do ostřikovačů".
const GLOBUS_TYPES: &[Rule<FuelType>] = &[
    rule(&[Contains("natural")], FuelType::Petrol),
    rule(&[Contains("diesel")], FuelType::Diesel),
    rule(&[Contains("lpg")], FuelType::Lpg),
    rule(&[Contains("cng")], FuelType::Cng),
    rule(&[Contains("adblue")], FuelType::AdBlue),
    rule(&[Contains("kapalina do ostřikovačů")], FuelType::WindscreenCleaner),
];

/// Orlen brands its grades: Efecta (standard) and Verva (premium). Diesel
/// comes first because "Verva Diesel" also names a petrol brand.
const ORLEN_TYPES: &[Rule<FuelType>] = &[
    rule(&[Contains("diesel")], FuelType::Diesel),
    rule(&[Contains("hvo")], FuelType::Hvo),
    rule(&[Contains("efecta")], FuelType::Petrol),
    rule(&[Contains("verva")], FuelType::Petrol),
    rule(&[Contains("lpg")], FuelType::Lpg),
    rule(&[Contains("cng")], FuelType::Cng),
    rule(&[Contains("adblue")], FuelType::AdBlue),
];

const SHELL_TYPES: &[Rule<FuelType>] = &[
    rule(&[Contains("diesel")], FuelType::Diesel),
    rule(&[Contains("natural")], FuelType::Petrol),
    rule(&[Contains("v-power")], FuelType::Petrol),
    rule(&[Contains("autoplyn")], FuelType::Lpg),
    rule(&[Contains("lpg")], FuelType::Lpg),
    rule(&[Contains("cng")], FuelType::Cng),
    rule(&[Contains("adblue")], FuelType::AdBlue),
];

/// EuroOil sells HVO as "HVO nafta", so HVO is checked before diesel.
const EUROOIL_TYPES: &[Rule<FuelType>] = &[
    rule(&[Contains("hvo")], FuelType::Hvo),
    rule(&[Contains("natural")], FuelType::Petrol),
    rule(&[Contains("benzin")], FuelType::Petrol),
    rule(&[Contains("nafta")], FuelType::Diesel),
    rule(&[Contains("diesel")], FuelType::Diesel),
    rule(&[Contains("lpg")], FuelType::Lpg),
    rule(&[Contains("adblue")], FuelType::AdBlue),
];

/// ONO renders fuels as icons; the scraper reports the image code
/// (`n95c`, `n98c`, `nmc`, `nmpc`, `lpgc`, ...).
const ONO_TYPES: &[Rule<FuelType>] = &[
    rule(&[StartsWith("n95")], FuelType::Petrol),
    rule(&[StartsWith("n98")], FuelType::Petrol),
    rule(&[StartsWith("n100")], FuelType::Petrol),
    rule(&[StartsWith("nm")], FuelType::Diesel),
    rule(&[StartsWith("lpg")], FuelType::Lpg),
    rule(&[StartsWith("cng")], FuelType::Cng),
    rule(&[StartsWith("adb")], FuelType::AdBlue),
];

const MOL_TYPES: &[Rule<FuelType>] = &[
    rule(&[Contains("diesel")], FuelType::Diesel),
    rule(&[Contains("evo 95")], FuelType::Petrol),
    rule(&[Contains("evo 100")], FuelType::Petrol),
    rule(&[Contains("lpg")], FuelType::Lpg),
    rule(&[Contains("cng")], FuelType::Cng),
    rule(&[Contains("adblue")], FuelType::AdBlue),
];

const OMV_TYPES: &[Rule<FuelType>] = &[
    rule(&[Contains("diesel")], FuelType::Diesel),
    rule(&[Contains("maxxmotion")], FuelType::Petrol),
    rule(&[Contains("natural")], FuelType::Petrol),
    rule(&[Contains("super")], FuelType::Petrol),
    rule(&[Contains("cng")], FuelType::Cng),
    rule(&[Contains("lpg")], FuelType::Lpg),
    rule(&[Contains("adblue")], FuelType::AdBlue),
];

const PRIM_TYPES: &[Rule<FuelType>] = &[
    rule(&[Contains("natural")], FuelType::Petrol),
    rule(&[Contains("nafta")], FuelType::Diesel),
    rule(&[Contains("diesel")], FuelType::Diesel),
    rule(&[Contains("lpg")], FuelType::Lpg),
    rule(&[Contains("adblue")], FuelType::AdBlue),
];

const MAKRO_TYPES: &[Rule<FuelType>] = &[
    rule(&[Contains("natural")], FuelType::Petrol),
    rule(&[Contains("diesel")], FuelType::Diesel),
    rule(&[Contains("lpg")], FuelType::Lpg),
    rule(&[Contains("cng")], FuelType::Cng),
    rule(&[Contains("adblue")], FuelType::AdBlue),
    rule(&[Contains("ostřikovací kapalina")], FuelType::WindscreenCleaner),
];

// ---------------------------------------------------------------------------
// Fuel quality
// ---------------------------------------------------------------------------

const GLOBUS_QUALITIES: &[Rule<FuelQuality>] = &[
    rule(&[Contains("natural"), NoPremiumMarker], FuelQuality::Standard),
    rule(&[Contains("natural"), PremiumMarker], FuelQuality::Premium),
    rule(&[Contains("diesel"), NoPremiumMarker], FuelQuality::Standard),
    rule(&[Contains("diesel"), PremiumMarker], FuelQuality::Premium),
];

const ORLEN_QUALITIES: &[Rule<FuelQuality>] = &[
    rule(&[Contains("verva")], FuelQuality::Premium),
    rule(&[Contains("efecta")], FuelQuality::Standard),
];

/// "V-Power Racing" must be checked before the plain V-Power premium rule.
const SHELL_QUALITIES: &[Rule<FuelQuality>] = &[
    rule(&[Contains("racing")], FuelQuality::Racing),
    rule(&[Contains("v-power")], FuelQuality::Premium),
    rule(&[Contains("fuelsave")], FuelQuality::Standard),
];

const ONO_QUALITIES: &[Rule<FuelQuality>] = &[
    rule(&[StartsWith("n95")], FuelQuality::Standard),
    rule(&[StartsWith("n98")], FuelQuality::Premium),
    rule(&[StartsWith("n100")], FuelQuality::Racing),
    rule(&[StartsWith("nmp")], FuelQuality::Premium),
    rule(&[StartsWith("nm")], FuelQuality::Standard),
];

const MOL_QUALITIES: &[Rule<FuelQuality>] = &[
    rule(&[Contains("diesel"), PremiumMarker], FuelQuality::Premium),
    rule(&[Contains("diesel"), NoPremiumMarker], FuelQuality::Standard),
    rule(&[Contains("evo 100")], FuelQuality::Premium),
    rule(&[Contains("evo 95")], FuelQuality::Standard),
];

const OMV_QUALITIES: &[Rule<FuelQuality>] = &[
    rule(&[Contains("maxxmotion")], FuelQuality::Premium),
    rule(&[Contains("98"), Lacks("diesel")], FuelQuality::Midgrade),
    rule(&[Contains("natural 95")], FuelQuality::Standard),
    rule(&[Contains("diesel")], FuelQuality::Standard),
];

// EuroOil, Prim and Makro publish a single grade per fuel with no naming
// signal, so quality stays unspecified for them.
const NO_QUALITIES: &[Rule<FuelQuality>] = &[];

/// Ordered fuel type rules for `station`.
#[must_use]
pub fn type_rules(station: Station) -> &'static [Rule<FuelType>] {
    match station {
        Station::Globus => GLOBUS_TYPES,
        Station::Orlen => ORLEN_TYPES,
        Station::Shell => SHELL_TYPES,
        Station::EuroOil => EUROOIL_TYPES,
        Station::Ono => ONO_TYPES,
        Station::Mol => MOL_TYPES,
        Station::Omv => OMV_TYPES,
        Station::Prim => PRIM_TYPES,
        Station::Makro => MAKRO_TYPES,
    }
}

/// Ordered fuel quality rules for `station`.
#[must_use]
pub fn quality_rules(station: Station) -> &'static [Rule<FuelQuality>] {
    match station {
        Station::Globus => GLOBUS_QUALITIES,
        Station::Orlen => ORLEN_QUALITIES,
        Station::Shell => SHELL_QUALITIES,
        Station::Ono => ONO_QUALITIES,
        Station::Mol => MOL_QUALITIES,
        Station::Omv => OMV_QUALITIES,
        Station::EuroOil | Station::Prim | Station::Makro => NO_QUALITIES,
    }
}
