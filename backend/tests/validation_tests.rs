//! Validation and advisory alert tests

use proptest::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;

use shared::engine::SoilSample;
use shared::models::{ClimateZone, Crop, SoilType};
use shared::validation::{soil_alerts, validate_percentage, validate_ph, AlertLevel};

// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn sample_with_ph(ph: &str) -> SoilSample {
    SoilSample {
        ph: Some(dec(ph)),
        ..SoilSample::default()
    }
}

fn alert_level_for(sample: &SoilSample, parameter: &str) -> Option<AlertLevel> {
    soil_alerts(sample)
        .into_iter()
        .find(|a| a.parameter == parameter)
        .map(|a| a.level)
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_ph_alert_levels() {
        assert_eq!(
            alert_level_for(&sample_with_ph("4.2"), "pH"),
            Some(AlertLevel::Critical)
        );
        assert_eq!(
            alert_level_for(&sample_with_ph("5.2"), "pH"),
            Some(AlertLevel::Warning)
        );
        assert_eq!(
            alert_level_for(&sample_with_ph("6.3"), "pH"),
            Some(AlertLevel::Optimal)
        );
        assert_eq!(
            alert_level_for(&sample_with_ph("7.2"), "pH"),
            Some(AlertLevel::Warning)
        );
        assert_eq!(
            alert_level_for(&sample_with_ph("8.0"), "pH"),
            Some(AlertLevel::Critical)
        );
    }

    #[test]
    fn test_nitrogen_alert_levels() {
        let mut sample = SoilSample::default();

        sample.nitrogen = Some(dec("5"));
        assert_eq!(
            alert_level_for(&sample, "nitrogen"),
            Some(AlertLevel::Critical)
        );

        sample.nitrogen = Some(dec("25"));
        assert_eq!(
            alert_level_for(&sample, "nitrogen"),
            Some(AlertLevel::Optimal)
        );

        sample.nitrogen = Some(dec("60"));
        assert_eq!(
            alert_level_for(&sample, "nitrogen"),
            Some(AlertLevel::Warning)
        );

        // Between the critical floor and the optimal band
        sample.nitrogen = Some(dec("12"));
        assert_eq!(alert_level_for(&sample, "nitrogen"), Some(AlertLevel::Info));
    }

    #[test]
    fn test_potassium_alert_levels() {
        let mut sample = SoilSample::default();

        sample.potassium = Some(dec("0.1"));
        assert_eq!(
            alert_level_for(&sample, "potassium"),
            Some(AlertLevel::Critical)
        );

        sample.potassium = Some(dec("0.5"));
        assert_eq!(
            alert_level_for(&sample, "potassium"),
            Some(AlertLevel::Optimal)
        );

        sample.potassium = Some(dec("1.2"));
        assert_eq!(
            alert_level_for(&sample, "potassium"),
            Some(AlertLevel::Warning)
        );
    }

    /// Absent fields produce no parameter alert, only the general note
    #[test]
    fn test_empty_sample_only_general_note() {
        let alerts = soil_alerts(&SoilSample::default());

        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].parameter, "general");
        assert_eq!(alerts[0].level, AlertLevel::Info);
    }

    /// Every alert carries both languages
    #[test]
    fn test_alerts_are_bilingual() {
        let mut sample = sample_with_ph("5.0");
        sample.temperature = Some(dec("18.0"));
        sample.humidity = Some(dec("55.0"));

        for alert in soil_alerts(&sample) {
            assert!(!alert.message_en.is_empty());
            assert!(!alert.message_es.is_empty());
        }
    }

    #[test]
    fn test_validate_ph_bounds() {
        assert!(validate_ph(dec("0")).is_ok());
        assert!(validate_ph(dec("7.0")).is_ok());
        assert!(validate_ph(dec("14")).is_ok());
        assert!(validate_ph(dec("-0.1")).is_err());
        assert!(validate_ph(dec("14.1")).is_err());
    }

    #[test]
    fn test_validate_percentage_bounds() {
        assert!(validate_percentage(dec("0")).is_ok());
        assert!(validate_percentage(dec("100")).is_ok());
        assert!(validate_percentage(dec("-1")).is_err());
        assert!(validate_percentage(dec("100.5")).is_err());
    }

    /// Enum display names round-trip through parsing
    #[test]
    fn test_enum_names_round_trip() {
        for name in ["Puerto Montt", "Osorno", "Río Bueno", "Chiloé"] {
            assert_eq!(ClimateZone::from_name(name).name(), name);
        }
        for name in ["Andisol", "Ultisol", "Alfisol", "Histosol"] {
            assert_eq!(SoilType::from_name(name).name(), name);
        }
        for name in ["Papa temprana", "Avena forrajera", "Ballica perenne", "Trigo"] {
            assert_eq!(Crop::from_name(name).name(), name);
        }
    }

    /// Known names parse to their dedicated variants, everything else to Other
    #[test]
    fn test_enum_parse_fallback() {
        assert_eq!(ClimateZone::from_name("Osorno"), ClimateZone::Osorno);
        assert_eq!(
            ClimateZone::from_name("Valdivia"),
            ClimateZone::Other("Valdivia".to_string())
        );
        assert_eq!(SoilType::from_name("Andisol"), SoilType::Andisol);
        assert_eq!(Crop::from_name("Avena forrajera"), Crop::ForageOats);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    fn ph_strategy() -> impl Strategy<Value = Decimal> {
        (0i64..=140i64).prop_map(|n| Decimal::new(n, 1))
    }

    fn nutrient_strategy() -> impl Strategy<Value = Decimal> {
        (0i64..=2_000i64).prop_map(|n| Decimal::new(n, 1))
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// A present pH always yields exactly one pH alert
        #[test]
        fn prop_ph_always_classified(ph in ph_strategy()) {
            let sample = SoilSample { ph: Some(ph), ..SoilSample::default() };
            let ph_alerts: Vec<_> = soil_alerts(&sample)
                .into_iter()
                .filter(|a| a.parameter == "pH")
                .collect();

            prop_assert_eq!(ph_alerts.len(), 1);
        }

        /// The general note always closes the list
        #[test]
        fn prop_general_note_always_last(
            ph in ph_strategy(),
            nitrogen in nutrient_strategy()
        ) {
            let sample = SoilSample {
                ph: Some(ph),
                nitrogen: Some(nitrogen),
                ..SoilSample::default()
            };
            let alerts = soil_alerts(&sample);

            prop_assert!(!alerts.is_empty());
            prop_assert_eq!(alerts[alerts.len() - 1].parameter.as_str(), "general");
        }

        /// Critical and optimal classifications never overlap for pH
        #[test]
        fn prop_ph_levels_exclusive(ph in ph_strategy()) {
            let sample = SoilSample { ph: Some(ph), ..SoilSample::default() };
            let level = alert_level_for(&sample, "pH").unwrap();

            if ph >= dec("5.5") && ph <= dec("7.0") {
                prop_assert_eq!(level, AlertLevel::Optimal);
            } else if ph < dec("5.0") || ph > dec("7.5") {
                prop_assert_eq!(level, AlertLevel::Critical);
            } else {
                prop_assert_eq!(level, AlertLevel::Warning);
            }
        }
    }
}
