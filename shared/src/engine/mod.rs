//! Fertilization engine
//!
//! Converts soil measurements into commercial fertilizer dosages for a
//! parcel. The four dosage calculations are independent pure functions over
//! a [`SoilSample`] and a [`Parcel`]; [`compute_recommendation`] runs all
//! four, scales by parcel area, and packages the applied correction factors.
//!
//! Each nutrient calculation follows the same shape: convert the sensor/lab
//! unit to kg of nutrient per hectare, subtract from the crop requirement,
//! correct the deficit by zone and soil or precipitation, and convert the
//! result to product mass by the product's guaranteed nutrient content.
//! A surplus clamps to zero; the engine never recommends a negative dosage.

pub mod tables;
pub mod weekly;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{Crop, Parcel, Reading};
use self::tables::{
    buffering_capacity, crop_requirement, nitrogen_efficiency, precipitation_factor,
    soil_fixation_factor, target_ph, zone_factor, DEFAULT_CROP,
};

/// Nitrate ppm to kg N/ha
fn nitrate_to_kg_n_ha(ppm: Decimal) -> Decimal {
    ppm * Decimal::new(224, 2)
}

/// Olsen phosphorus ppm to kg P2O5/ha
fn olsen_to_kg_p2o5_ha(ppm: Decimal) -> Decimal {
    ppm * Decimal::new(229, 2)
}

/// Exchangeable potassium cmol/kg to kg K2O/ha
fn exchangeable_k_to_kg_k2o_ha(cmol_kg: Decimal) -> Decimal {
    cmol_kg * Decimal::new(942, 1) * Decimal::new(1205, 3)
}

/// Guaranteed N content of urea
fn urea_nitrogen_content() -> Decimal {
    Decimal::new(46, 2)
}

/// Guaranteed P2O5 content of triple superphosphate
fn tsp_phosphate_content() -> Decimal {
    Decimal::new(46, 2)
}

/// Guaranteed K2O content of muriate of potash
fn potash_k2o_content() -> Decimal {
    Decimal::new(60, 2)
}

/// Lime model slope, kg CaCO3 per pH unit per buffering-capacity unit
fn lime_slope() -> Decimal {
    Decimal::from(1780)
}

/// Measured or averaged soil values fed into the engine.
///
/// Both the per-reading and the per-week path construct this same structure,
/// so the calculators never distinguish a raw reading from a weekly mean.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SoilSample {
    pub ph: Option<Decimal>,
    pub temperature: Option<Decimal>,
    pub humidity: Option<Decimal>,
    pub nitrogen: Option<Decimal>,
    pub phosphorus: Option<Decimal>,
    pub potassium: Option<Decimal>,
}

impl SoilSample {
    pub fn from_reading(reading: &Reading) -> Self {
        Self {
            ph: reading.ph,
            temperature: reading.temperature,
            humidity: reading.humidity,
            nitrogen: reading.nitrogen,
            phosphorus: reading.phosphorus,
            potassium: reading.potassium,
        }
    }

    /// True when all three nutrient inputs are present
    pub fn has_npk(&self) -> bool {
        self.nitrogen.is_some() && self.phosphorus.is_some() && self.potassium.is_some()
    }
}

/// Engine failure modes
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EngineError {
    /// pH is the only input the composer requires; missing nutrients are
    /// treated as zero available instead
    #[error("pH value is required for the lime calculation")]
    MissingPh,
}

/// Complete dosage plan for one (sample, parcel) pair
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DosagePlan {
    pub urea_kg_ha: Decimal,
    pub triple_superphosphate_kg_ha: Decimal,
    pub potash_kg_ha: Decimal,
    pub lime_kg_ha: Decimal,

    pub urea_total_kg: Decimal,
    pub triple_superphosphate_total_kg: Decimal,
    pub potash_total_kg: Decimal,
    pub lime_total_kg: Decimal,

    pub zone_factor: Decimal,
    pub soil_factor: Decimal,
    pub precipitation_factor: Decimal,
}

/// Half-up rounding at two decimal places; stored values never keep full
/// floating precision so recomputations diff cleanly
pub fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

fn effective_crop(parcel: &Parcel) -> &Crop {
    parcel.current_crop.as_ref().unwrap_or(&DEFAULT_CROP)
}

/// Urea dosage in kg/ha.
///
/// Missing nitrogen counts as zero available, which maximizes the deficit.
pub fn urea_dosage(sample: &SoilSample, parcel: &Parcel) -> Decimal {
    let available = nitrate_to_kg_n_ha(sample.nitrogen.unwrap_or(Decimal::ZERO));
    let required = crop_requirement(effective_crop(parcel)).nitrogen;
    let deficit = required - available;

    let net = deficit * zone_factor(&parcel.zone) * precipitation_factor(&parcel.zone)
        / nitrogen_efficiency(&parcel.soil_type);

    (net / urea_nitrogen_content()).max(Decimal::ZERO)
}

/// Triple superphosphate dosage in kg/ha
pub fn triple_superphosphate_dosage(sample: &SoilSample, parcel: &Parcel) -> Decimal {
    let available = olsen_to_kg_p2o5_ha(sample.phosphorus.unwrap_or(Decimal::ZERO));
    let required = crop_requirement(effective_crop(parcel)).phosphate;
    let deficit = required - available;

    let net = deficit * soil_fixation_factor(&parcel.soil_type);

    (net / tsp_phosphate_content()).max(Decimal::ZERO)
}

/// Muriate of potash dosage in kg/ha
pub fn potash_dosage(sample: &SoilSample, parcel: &Parcel) -> Decimal {
    let available = exchangeable_k_to_kg_k2o_ha(sample.potassium.unwrap_or(Decimal::ZERO));
    let required = crop_requirement(effective_crop(parcel)).potash;
    let deficit = required - available;

    let net = deficit * precipitation_factor(&parcel.zone);

    (net / potash_k2o_content()).max(Decimal::ZERO)
}

/// Agricultural lime dosage in kg/ha; zero when the soil already meets the
/// zone's target pH
pub fn lime_dosage(ph: Decimal, parcel: &Parcel) -> Decimal {
    let difference = target_ph(&parcel.zone) - ph;
    if difference <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    difference * buffering_capacity(&parcel.soil_type) * lime_slope()
}

/// Run all four calculators on the same (sample, parcel) pair and bundle
/// per-hectare dosages, area-scaled totals, and the applied factors.
///
/// Deterministic: identical inputs always produce identical rounded output.
pub fn compute_recommendation(
    sample: &SoilSample,
    parcel: &Parcel,
) -> Result<DosagePlan, EngineError> {
    let ph = sample.ph.ok_or(EngineError::MissingPh)?;

    let urea_kg_ha = urea_dosage(sample, parcel);
    let tsp_kg_ha = triple_superphosphate_dosage(sample, parcel);
    let potash_kg_ha = potash_dosage(sample, parcel);
    let lime_kg_ha = lime_dosage(ph, parcel);

    let area = parcel.area_hectares;

    Ok(DosagePlan {
        urea_kg_ha: round2(urea_kg_ha),
        triple_superphosphate_kg_ha: round2(tsp_kg_ha),
        potash_kg_ha: round2(potash_kg_ha),
        lime_kg_ha: round2(lime_kg_ha),

        urea_total_kg: round2(urea_kg_ha * area),
        triple_superphosphate_total_kg: round2(tsp_kg_ha * area),
        potash_total_kg: round2(potash_kg_ha * area),
        lime_total_kg: round2(lime_kg_ha * area),

        zone_factor: zone_factor(&parcel.zone),
        soil_factor: soil_fixation_factor(&parcel.soil_type),
        precipitation_factor: precipitation_factor(&parcel.zone),
    })
}
