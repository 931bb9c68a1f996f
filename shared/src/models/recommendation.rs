//! Fertilizer recommendation models

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A stored fertilizer recommendation.
///
/// Keyed either to a single reading (`reading_id` set) or to a parcel week
/// (`week_start` set with `reading_id` null). Per-reading rows also carry the
/// reading's week for display, so `week_start` alone does not identify the
/// weekly row; the persistence layer keeps the weekly key unique among rows
/// without a reading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub id: Uuid,
    pub reading_id: Option<Uuid>,
    pub parcel_id: Uuid,
    pub week_start: Option<NaiveDate>,
    pub computed_at: DateTime<Utc>,

    // Averaged inputs the dosages were derived from
    pub ph_avg: Option<Decimal>,
    pub temperature_avg: Option<Decimal>,
    pub humidity_avg: Option<Decimal>,
    pub nitrogen_avg: Option<Decimal>,
    pub phosphorus_avg: Option<Decimal>,
    pub potassium_avg: Option<Decimal>,

    // Per-hectare dosages, kg of commercial product per hectare
    pub urea_kg_ha: Decimal,
    pub triple_superphosphate_kg_ha: Decimal,
    pub potash_kg_ha: Decimal,
    pub lime_kg_ha: Decimal,

    // Totals scaled by parcel area, kg
    pub urea_total_kg: Decimal,
    pub triple_superphosphate_total_kg: Decimal,
    pub potash_total_kg: Decimal,
    pub lime_total_kg: Decimal,

    // Correction factors applied, kept for audit
    pub zone_factor: Decimal,
    pub soil_factor: Decimal,
    pub precipitation_factor: Decimal,
}
