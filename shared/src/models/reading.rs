//! Soil reading models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One timestamped soil measurement for a parcel.
///
/// Readings are immutable once recorded; nutrient fields are optional because
/// the field sensor reports only pH, temperature, and humidity, while N/P/K
/// usually arrive from manual lab entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reading {
    pub id: Uuid,
    pub parcel_id: Uuid,
    pub recorded_at: DateTime<Utc>,
    /// Soil pH, 0–14
    pub ph: Option<Decimal>,
    /// Soil temperature in °C
    pub temperature: Option<Decimal>,
    /// Soil humidity in %
    pub humidity: Option<Decimal>,
    /// Nitrate nitrogen in ppm
    pub nitrogen: Option<Decimal>,
    /// Olsen phosphorus in ppm
    pub phosphorus: Option<Decimal>,
    /// Exchangeable potassium in cmol/kg
    pub potassium: Option<Decimal>,
    pub origin: ReadingOrigin,
}

/// Where a reading came from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReadingOrigin {
    /// Reported by a field sensor
    Sensor,
    /// Entered by hand
    #[default]
    Manual,
}

impl ReadingOrigin {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReadingOrigin::Sensor => "sensor",
            ReadingOrigin::Manual => "manual",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "sensor" => ReadingOrigin::Sensor,
            _ => ReadingOrigin::Manual,
        }
    }
}

impl std::fmt::Display for ReadingOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
