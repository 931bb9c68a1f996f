//! Fertilization engine tests
//!
//! Covers the four dosage calculators, the recommendation composer, and the
//! reference-table fallbacks for unrecognized zones, soils, and crops.

use chrono::Utc;
use proptest::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;
use uuid::Uuid;

use shared::engine::tables::{
    crop_requirement, nitrogen_efficiency, precipitation_factor, soil_fixation_factor, target_ph,
    zone_factor, DEFAULT_CROP,
};
use shared::engine::{
    compute_recommendation, lime_dosage, potash_dosage, triple_superphosphate_dosage, urea_dosage,
    EngineError, SoilSample,
};
use shared::models::{ClimateZone, Crop, Parcel, SoilType};

// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn parcel(zone: &str, soil: &str, crop: Option<&str>, area: &str) -> Parcel {
    Parcel {
        id: Uuid::new_v4(),
        user_id: Uuid::new_v4(),
        name: "Los Coihues".to_string(),
        area_hectares: dec(area),
        zone: ClimateZone::from_name(zone),
        soil_type: SoilType::from_name(soil),
        current_crop: crop.map(Crop::from_name),
        created_at: Utc::now(),
    }
}

fn sample(ph: &str, n: &str, p: &str, k: &str) -> SoilSample {
    SoilSample {
        ph: Some(dec(ph)),
        temperature: Some(dec("18.5")),
        humidity: Some(dec("65.2")),
        nitrogen: Some(dec(n)),
        phosphorus: Some(dec(p)),
        potassium: Some(dec(k)),
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// Worked example: Osorno / Ultisol / forage oats, 2 ha,
    /// N=10 ppm, P=5 ppm, K=0.1 cmol/kg, pH=5.0
    #[test]
    fn test_reference_parcel_dosages() {
        let parcel = parcel("Osorno", "Ultisol", Some("Avena forrajera"), "2.0");
        let sample = sample("5.0", "10", "5", "0.1");

        let plan = compute_recommendation(&sample, &parcel).unwrap();

        // N: 10 * 2.24 = 22.4 available; deficit 112.6;
        // 112.6 * 1.1 * 1.1 / 0.85 / 0.46 = 348.4552...
        assert_eq!(plan.urea_kg_ha, dec("348.46"));

        // P: 5 * 2.29 = 11.45 available; deficit 78.55; * 2.0 / 0.46
        assert_eq!(plan.triple_superphosphate_kg_ha, dec("341.52"));

        // K: 0.1 * 94.2 * 1.205 = 11.3511 available; deficit 98.6489;
        // * 1.1 / 0.60
        assert_eq!(plan.potash_kg_ha, dec("180.86"));

        // Lime: (6.2 - 5.0) * 3.0 * 1780
        assert_eq!(plan.lime_kg_ha, dec("6408"));

        // Factors actually applied
        assert_eq!(plan.zone_factor, dec("1.1"));
        assert_eq!(plan.soil_factor, dec("2.0"));
        assert_eq!(plan.precipitation_factor, dec("1.1"));
    }

    /// Totals are the per-hectare dosages scaled by the parcel area
    #[test]
    fn test_totals_scale_with_area() {
        let parcel = parcel("Osorno", "Ultisol", Some("Avena forrajera"), "2.0");
        let sample = sample("5.0", "10", "5", "0.1");

        let plan = compute_recommendation(&sample, &parcel).unwrap();

        assert_eq!(plan.urea_total_kg, dec("696.91"));
        assert_eq!(plan.triple_superphosphate_total_kg, dec("683.04"));
        assert_eq!(plan.potash_total_kg, dec("361.71"));
        assert_eq!(plan.lime_total_kg, dec("12816"));
    }

    /// A nutrient surplus yields zero product, never a negative dosage
    #[test]
    fn test_surplus_clamps_to_zero() {
        let parcel = parcel("Osorno", "Ultisol", Some("Avena forrajera"), "1.0");
        // 500 ppm nitrate is far beyond any crop requirement
        let rich = sample("6.5", "500", "300", "50");

        assert_eq!(urea_dosage(&rich, &parcel), Decimal::ZERO);
        assert_eq!(triple_superphosphate_dosage(&rich, &parcel), Decimal::ZERO);
        assert_eq!(potash_dosage(&rich, &parcel), Decimal::ZERO);
    }

    /// Lime is zero when measured pH is at or above the zone target
    #[test]
    fn test_lime_zero_at_target_ph() {
        let parcel = parcel("Osorno", "Ultisol", None, "1.0");

        assert_eq!(lime_dosage(dec("6.2"), &parcel), Decimal::ZERO);
        assert_eq!(lime_dosage(dec("7.0"), &parcel), Decimal::ZERO);
    }

    /// Lime example: pH 5.0 against the Osorno target of 6.2
    #[test]
    fn test_lime_below_target() {
        let parcel = parcel("Osorno", "Ultisol", None, "1.0");

        // (6.2 - 5.0) * 3.0 * 1780 = 6408
        assert_eq!(lime_dosage(dec("5.0"), &parcel), dec("6408.000"));
    }

    /// Missing nutrients count as zero available, maximizing the deficit
    #[test]
    fn test_missing_nutrient_counts_as_zero() {
        let parcel = parcel("Osorno", "Ultisol", Some("Avena forrajera"), "1.0");

        let empty = SoilSample {
            ph: Some(dec("5.0")),
            ..SoilSample::default()
        };
        let zeroed = sample("5.0", "0", "0", "0");

        assert!(!empty.has_npk());
        assert!(zeroed.has_npk());

        assert_eq!(urea_dosage(&empty, &parcel), urea_dosage(&zeroed, &parcel));
        assert_eq!(
            potash_dosage(&empty, &parcel),
            potash_dosage(&zeroed, &parcel)
        );
    }

    /// Missing pH is the composer's only failure mode
    #[test]
    fn test_missing_ph_is_rejected() {
        let parcel = parcel("Osorno", "Ultisol", None, "1.0");
        let mut sample = sample("5.0", "10", "5", "0.1");
        sample.ph = None;

        assert_eq!(
            compute_recommendation(&sample, &parcel),
            Err(EngineError::MissingPh)
        );
    }

    /// Identical input always yields identical rounded output
    #[test]
    fn test_composer_is_deterministic() {
        let parcel = parcel("Puerto Montt", "Andisol", Some("Papa temprana"), "3.5");
        let sample = sample("5.4", "18.2", "11.7", "0.35");

        let first = compute_recommendation(&sample, &parcel).unwrap();
        let second = compute_recommendation(&sample, &parcel).unwrap();

        assert_eq!(first, second);
    }

    /// A parcel without a crop uses the highest-demand reference crop
    #[test]
    fn test_default_crop_when_none_configured() {
        let with_default = parcel("Osorno", "Ultisol", None, "1.0");
        let with_potato = parcel("Osorno", "Ultisol", Some("Papa temprana"), "1.0");
        let sample = sample("5.0", "10", "5", "0.1");

        assert_eq!(
            urea_dosage(&sample, &with_default),
            urea_dosage(&sample, &with_potato)
        );
        assert_eq!(DEFAULT_CROP, Crop::EarlyPotato);
    }

    /// Unrecognized reference keys degrade to documented defaults instead of
    /// failing
    #[test]
    fn test_unknown_keys_fall_back() {
        let zone = ClimateZone::from_name("Valdivia");
        let soil = SoilType::from_name("Histosol");
        let crop = Crop::from_name("Trigo");

        assert_eq!(zone_factor(&zone), dec("1.0"));
        // Default precipitation of 1600 mm lands in the middle tier
        assert_eq!(precipitation_factor(&zone), dec("1.1"));
        assert_eq!(target_ph(&zone), dec("6.0"));
        assert_eq!(soil_fixation_factor(&soil), dec("2.0"));
        assert_eq!(nitrogen_efficiency(&soil), dec("0.85"));
        assert_eq!(crop_requirement(&crop), crop_requirement(&Crop::EarlyPotato));
    }

    /// The Andisol rows differ from the rest: more P fixation, less N
    /// efficiency, more buffering
    #[test]
    fn test_andisol_table_rows() {
        assert_eq!(soil_fixation_factor(&SoilType::Andisol), dec("2.5"));
        assert_eq!(nitrogen_efficiency(&SoilType::Andisol), dec("0.7"));
        assert_eq!(
            shared::engine::tables::buffering_capacity(&SoilType::Andisol),
            dec("4.5")
        );
    }

    /// Zone precipitation tiers: 2200 -> 1.3, 1800 -> 1.1, 1600 -> 1.1
    #[test]
    fn test_precipitation_tiers() {
        assert_eq!(precipitation_factor(&ClimateZone::PuertoMontt), dec("1.3"));
        assert_eq!(precipitation_factor(&ClimateZone::Osorno), dec("1.1"));
        assert_eq!(precipitation_factor(&ClimateZone::RioBueno), dec("1.1"));
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    fn zone_strategy() -> impl Strategy<Value = ClimateZone> {
        prop_oneof![
            Just(ClimateZone::PuertoMontt),
            Just(ClimateZone::Osorno),
            Just(ClimateZone::RioBueno),
            Just(ClimateZone::Other("Chiloé".to_string())),
        ]
    }

    fn soil_strategy() -> impl Strategy<Value = SoilType> {
        prop_oneof![
            Just(SoilType::Andisol),
            Just(SoilType::Ultisol),
            Just(SoilType::Alfisol),
            Just(SoilType::Other("Histosol".to_string())),
        ]
    }

    fn crop_strategy() -> impl Strategy<Value = Option<Crop>> {
        prop_oneof![
            Just(None),
            Just(Some(Crop::EarlyPotato)),
            Just(Some(Crop::ForageOats)),
            Just(Some(Crop::PerennialRyegrass)),
        ]
    }

    /// Nutrient levels from zero to far past any requirement
    fn nutrient_strategy() -> impl Strategy<Value = Decimal> {
        (0i64..=1_000_000i64).prop_map(|n| Decimal::new(n, 2)) // 0.00 to 10000.00
    }

    fn ph_strategy() -> impl Strategy<Value = Decimal> {
        (0i64..=140i64).prop_map(|n| Decimal::new(n, 1)) // 0.0 to 14.0
    }

    fn area_strategy() -> impl Strategy<Value = Decimal> {
        (1i64..=10_000i64).prop_map(|n| Decimal::new(n, 2)) // 0.01 to 100.00 ha
    }

    fn parcel_strategy() -> impl Strategy<Value = Parcel> {
        (zone_strategy(), soil_strategy(), crop_strategy(), area_strategy()).prop_map(
            |(zone, soil_type, current_crop, area_hectares)| Parcel {
                id: Uuid::new_v4(),
                user_id: Uuid::new_v4(),
                name: "test".to_string(),
                area_hectares,
                zone,
                soil_type,
                current_crop,
                created_at: Utc::now(),
            },
        )
    }

    fn sample_strategy() -> impl Strategy<Value = SoilSample> {
        (
            ph_strategy(),
            nutrient_strategy(),
            nutrient_strategy(),
            nutrient_strategy(),
        )
            .prop_map(|(ph, nitrogen, phosphorus, potassium)| SoilSample {
                ph: Some(ph),
                temperature: None,
                humidity: None,
                nitrogen: Some(nitrogen),
                phosphorus: Some(phosphorus),
                potassium: Some(potassium),
            })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Every dosage output is >= 0 regardless of nutrient surplus
        #[test]
        fn prop_dosages_never_negative(
            parcel in parcel_strategy(),
            sample in sample_strategy()
        ) {
            let plan = compute_recommendation(&sample, &parcel).unwrap();

            prop_assert!(plan.urea_kg_ha >= Decimal::ZERO);
            prop_assert!(plan.triple_superphosphate_kg_ha >= Decimal::ZERO);
            prop_assert!(plan.potash_kg_ha >= Decimal::ZERO);
            prop_assert!(plan.lime_kg_ha >= Decimal::ZERO);

            prop_assert!(plan.urea_total_kg >= Decimal::ZERO);
            prop_assert!(plan.triple_superphosphate_total_kg >= Decimal::ZERO);
            prop_assert!(plan.potash_total_kg >= Decimal::ZERO);
            prop_assert!(plan.lime_total_kg >= Decimal::ZERO);
        }

        /// The composer is a pure function of its inputs
        #[test]
        fn prop_composer_idempotent(
            parcel in parcel_strategy(),
            sample in sample_strategy()
        ) {
            let first = compute_recommendation(&sample, &parcel).unwrap();
            let second = compute_recommendation(&sample, &parcel).unwrap();

            prop_assert_eq!(first, second);
        }

        /// Dosages are rounded to at most two decimal places
        #[test]
        fn prop_dosages_rounded_to_two_places(
            parcel in parcel_strategy(),
            sample in sample_strategy()
        ) {
            let plan = compute_recommendation(&sample, &parcel).unwrap();

            prop_assert!(plan.urea_kg_ha.scale() <= 2);
            prop_assert!(plan.triple_superphosphate_kg_ha.scale() <= 2);
            prop_assert!(plan.potash_kg_ha.scale() <= 2);
            prop_assert!(plan.lime_kg_ha.scale() <= 2);
        }

        /// Lime is zero exactly when measured pH meets the zone target
        #[test]
        fn prop_lime_zero_iff_ph_at_target(
            parcel in parcel_strategy(),
            ph in ph_strategy()
        ) {
            let lime = lime_dosage(ph, &parcel);

            if ph >= target_ph(&parcel.zone) {
                prop_assert_eq!(lime, Decimal::ZERO);
            } else {
                prop_assert!(lime > Decimal::ZERO);
            }
        }

        /// Raising available nitrogen never raises the urea dosage
        #[test]
        fn prop_urea_monotonic_in_nitrogen(
            parcel in parcel_strategy(),
            n1 in nutrient_strategy(),
            n2 in nutrient_strategy()
        ) {
            let (low, high) = if n1 <= n2 { (n1, n2) } else { (n2, n1) };

            let mut sample_low = SoilSample::default();
            sample_low.nitrogen = Some(low);
            let mut sample_high = SoilSample::default();
            sample_high.nitrogen = Some(high);

            prop_assert!(
                urea_dosage(&sample_high, &parcel) <= urea_dosage(&sample_low, &parcel)
            );
        }
    }
}
