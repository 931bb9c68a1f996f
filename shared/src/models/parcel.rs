//! Land parcel models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A managed land parcel with fixed area, climate zone, and soil type
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Parcel {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    /// Area in hectares, always positive
    pub area_hectares: Decimal,
    pub zone: ClimateZone,
    pub soil_type: SoilType,
    pub current_crop: Option<Crop>,
    pub created_at: DateTime<Utc>,
}

/// Climate zones of the Los Lagos / Los Ríos growing region
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(from = "String", into = "String")]
pub enum ClimateZone {
    PuertoMontt,
    Osorno,
    RioBueno,
    /// Zone outside the reference tables; lookups fall back to defaults
    Other(String),
}

impl ClimateZone {
    pub fn from_name(name: &str) -> Self {
        match name {
            "Puerto Montt" => ClimateZone::PuertoMontt,
            "Osorno" => ClimateZone::Osorno,
            "Río Bueno" => ClimateZone::RioBueno,
            other => ClimateZone::Other(other.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            ClimateZone::PuertoMontt => "Puerto Montt",
            ClimateZone::Osorno => "Osorno",
            ClimateZone::RioBueno => "Río Bueno",
            ClimateZone::Other(name) => name,
        }
    }
}

impl From<String> for ClimateZone {
    fn from(name: String) -> Self {
        ClimateZone::from_name(&name)
    }
}

impl From<ClimateZone> for String {
    fn from(zone: ClimateZone) -> String {
        zone.name().to_string()
    }
}

impl std::fmt::Display for ClimateZone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Soil taxonomy orders found in the region
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(from = "String", into = "String")]
pub enum SoilType {
    /// Volcanic ash soil, strong phosphorus fixation
    Andisol,
    Ultisol,
    Alfisol,
    /// Soil type outside the reference tables; lookups fall back to defaults
    Other(String),
}

impl SoilType {
    pub fn from_name(name: &str) -> Self {
        match name {
            "Andisol" => SoilType::Andisol,
            "Ultisol" => SoilType::Ultisol,
            "Alfisol" => SoilType::Alfisol,
            other => SoilType::Other(other.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            SoilType::Andisol => "Andisol",
            SoilType::Ultisol => "Ultisol",
            SoilType::Alfisol => "Alfisol",
            SoilType::Other(name) => name,
        }
    }
}

impl From<String> for SoilType {
    fn from(name: String) -> Self {
        SoilType::from_name(&name)
    }
}

impl From<SoilType> for String {
    fn from(soil: SoilType) -> String {
        soil.name().to_string()
    }
}

impl std::fmt::Display for SoilType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Crops with configured nutrient requirements
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(from = "String", into = "String")]
pub enum Crop {
    /// "Papa temprana", early potato, the highest-demand reference crop
    EarlyPotato,
    /// "Avena forrajera", forage oats
    ForageOats,
    /// "Ballica perenne", perennial ryegrass
    PerennialRyegrass,
    /// Crop outside the reference tables; lookups fall back to defaults
    Other(String),
}

impl Crop {
    pub fn from_name(name: &str) -> Self {
        match name {
            "Papa temprana" => Crop::EarlyPotato,
            "Avena forrajera" => Crop::ForageOats,
            "Ballica perenne" => Crop::PerennialRyegrass,
            other => Crop::Other(other.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Crop::EarlyPotato => "Papa temprana",
            Crop::ForageOats => "Avena forrajera",
            Crop::PerennialRyegrass => "Ballica perenne",
            Crop::Other(name) => name,
        }
    }
}

impl From<String> for Crop {
    fn from(name: String) -> Self {
        Crop::from_name(&name)
    }
}

impl From<Crop> for String {
    fn from(crop: Crop) -> String {
        crop.name().to_string()
    }
}

impl std::fmt::Display for Crop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
