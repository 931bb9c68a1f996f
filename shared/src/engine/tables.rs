//! Agronomic reference tables
//!
//! Static lookup data for the fertilization engine: crop nutrient
//! requirements, zone correction factors, soil fixation factors, zone
//! precipitation, pH targets, and buffering capacity. Every lookup has an
//! explicit fallback so an unrecognized zone, soil, or crop degrades to a
//! documented default instead of failing.

use rust_decimal::Decimal;

use crate::models::{ClimateZone, Crop, SoilType};

/// Crop applied when a parcel has no configured crop and the fallback row
/// for unrecognized crops (highest nutrient demand of the configured set)
pub const DEFAULT_CROP: Crop = Crop::EarlyPotato;

/// Nutrient requirement of a crop, kg/ha
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NutrientRequirement {
    /// Nitrogen as N
    pub nitrogen: Decimal,
    /// Phosphorus as P2O5
    pub phosphate: Decimal,
    /// Potassium as K2O
    pub potash: Decimal,
}

/// Requirement table per crop; unknown crops take the early-potato row
pub fn crop_requirement(crop: &Crop) -> NutrientRequirement {
    match crop {
        Crop::EarlyPotato | Crop::Other(_) => NutrientRequirement {
            nitrogen: Decimal::from(200),
            phosphate: Decimal::from(135),
            potash: Decimal::from(225),
        },
        Crop::ForageOats => NutrientRequirement {
            nitrogen: Decimal::from(135),
            phosphate: Decimal::from(90),
            potash: Decimal::from(110),
        },
        Crop::PerennialRyegrass => NutrientRequirement {
            nitrogen: Decimal::from(225),
            phosphate: Decimal::from(70),
            potash: Decimal::from(200),
        },
    }
}

/// Zone correction factor, dimensionless; harsher zones correct upward
pub fn zone_factor(zone: &ClimateZone) -> Decimal {
    match zone {
        ClimateZone::PuertoMontt => Decimal::new(12, 1),
        ClimateZone::Osorno => Decimal::new(11, 1),
        ClimateZone::RioBueno | ClimateZone::Other(_) => Decimal::ONE,
    }
}

/// Mean annual precipitation per zone, mm
pub fn zone_precipitation_mm(zone: &ClimateZone) -> Decimal {
    match zone {
        ClimateZone::PuertoMontt => Decimal::from(2200),
        ClimateZone::Osorno => Decimal::from(1800),
        ClimateZone::RioBueno | ClimateZone::Other(_) => Decimal::from(1600),
    }
}

/// Leaching correction tier derived from zone precipitation
pub fn precipitation_factor(zone: &ClimateZone) -> Decimal {
    let precipitation = zone_precipitation_mm(zone);
    if precipitation > Decimal::from(2000) {
        Decimal::new(13, 1)
    } else if precipitation > Decimal::from(1500) {
        Decimal::new(11, 1)
    } else {
        Decimal::ONE
    }
}

/// Phosphorus fixation factor per soil type; volcanic soils fix the most P
pub fn soil_fixation_factor(soil: &SoilType) -> Decimal {
    match soil {
        SoilType::Andisol => Decimal::new(25, 1),
        SoilType::Ultisol | SoilType::Other(_) => Decimal::new(20, 1),
        SoilType::Alfisol => Decimal::new(15, 1),
    }
}

/// Nitrogen use efficiency per soil type, always < 1
pub fn nitrogen_efficiency(soil: &SoilType) -> Decimal {
    match soil {
        // Volcanic soils retain less N
        SoilType::Andisol => Decimal::new(7, 1),
        _ => Decimal::new(85, 2),
    }
}

/// Target pH per zone
pub fn target_ph(zone: &ClimateZone) -> Decimal {
    match zone {
        ClimateZone::PuertoMontt | ClimateZone::Other(_) => Decimal::new(60, 1),
        ClimateZone::Osorno => Decimal::new(62, 1),
        ClimateZone::RioBueno => Decimal::new(58, 1),
    }
}

/// Soil buffering capacity used by the lime calculation
pub fn buffering_capacity(soil: &SoilType) -> Decimal {
    match soil {
        SoilType::Andisol => Decimal::new(45, 1),
        SoilType::Ultisol | SoilType::Other(_) => Decimal::new(30, 1),
        SoilType::Alfisol => Decimal::new(20, 1),
    }
}
