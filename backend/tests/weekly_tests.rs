//! Weekly aggregation tests
//!
//! Covers Monday-anchored bucketing, per-field means over present values,
//! and the ordering of weekly summaries.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc, Weekday};
use proptest::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;
use uuid::Uuid;

use shared::engine::weekly::{aggregate_weekly, sample_means, week_start};
use shared::models::{Reading, ReadingOrigin};

// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn ts(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
}

fn reading(recorded_at: DateTime<Utc>) -> Reading {
    Reading {
        id: Uuid::new_v4(),
        parcel_id: Uuid::new_v4(),
        recorded_at,
        ph: None,
        temperature: None,
        humidity: None,
        nitrogen: None,
        phosphorus: None,
        potassium: None,
        origin: ReadingOrigin::Manual,
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// A reading timestamped on a Monday belongs to the bucket keyed by its
    /// own date
    #[test]
    fn test_monday_reading_keys_its_own_date() {
        // 2024-11-11 is a Monday
        let monday = ts("2024-11-11T08:30:00Z");
        assert_eq!(
            week_start(monday),
            NaiveDate::from_ymd_opt(2024, 11, 11).unwrap()
        );
    }

    /// The following Sunday falls in the same bucket as that Monday
    #[test]
    fn test_sunday_shares_the_monday_bucket() {
        let monday = ts("2024-11-11T00:00:00Z");
        let sunday = ts("2024-11-17T23:59:59Z");

        assert_eq!(week_start(monday), week_start(sunday));
    }

    /// The next Monday opens a new bucket
    #[test]
    fn test_next_monday_opens_new_bucket() {
        let sunday = ts("2024-11-17T23:59:59Z");
        let next_monday = ts("2024-11-18T00:00:00Z");

        assert_ne!(week_start(sunday), week_start(next_monday));
        assert_eq!(
            week_start(next_monday),
            NaiveDate::from_ymd_opt(2024, 11, 18).unwrap()
        );
    }

    /// No readings, no buckets
    #[test]
    fn test_empty_input_yields_empty_output() {
        assert!(aggregate_weekly(&[]).is_empty());
    }

    /// A single reading yields one bucket whose mean equals the reading's
    /// value for every populated field
    #[test]
    fn test_single_reading_bucket() {
        let mut r = reading(ts("2024-11-13T10:00:00Z"));
        r.ph = Some(dec("5.8"));
        r.temperature = Some(dec("16.4"));
        r.nitrogen = Some(dec("21.0"));

        let summaries = aggregate_weekly(&[r.clone()]);

        assert_eq!(summaries.len(), 1);
        let week = &summaries[0];
        assert_eq!(week.week_start, NaiveDate::from_ymd_opt(2024, 11, 11).unwrap());
        assert_eq!(week.reading_count, 1);
        assert_eq!(week.first_reading_at, r.recorded_at);
        assert_eq!(week.last_reading_at, r.recorded_at);
        assert_eq!(week.ph_avg, Some(dec("5.8")));
        assert_eq!(week.temperature_avg, Some(dec("16.4")));
        assert_eq!(week.nitrogen_avg, Some(dec("21.00")));
        assert_eq!(week.humidity_avg, None);
        assert_eq!(week.phosphorus_avg, None);
        assert_eq!(week.potassium_avg, None);
    }

    /// Each field averages only the readings that carry it
    #[test]
    fn test_means_skip_missing_values() {
        let mut a = reading(ts("2024-11-11T08:00:00Z"));
        a.ph = Some(dec("5.0"));
        a.nitrogen = Some(dec("10.0"));

        let mut b = reading(ts("2024-11-12T08:00:00Z"));
        b.ph = Some(dec("6.0"));
        // b has no nitrogen

        let mut c = reading(ts("2024-11-13T08:00:00Z"));
        c.ph = Some(dec("7.0"));
        c.nitrogen = Some(dec("20.0"));

        let summaries = aggregate_weekly(&[a, b, c]);

        assert_eq!(summaries.len(), 1);
        let week = &summaries[0];
        assert_eq!(week.reading_count, 3);
        // pH averages all three, nitrogen only two
        assert_eq!(week.ph_avg, Some(dec("6.00")));
        assert_eq!(week.nitrogen_avg, Some(dec("15.00")));
        // nobody supplied phosphorus
        assert_eq!(week.phosphorus_avg, None);
    }

    /// Summaries come back most recent week first
    #[test]
    fn test_summaries_sorted_descending() {
        let old = reading(ts("2024-10-01T08:00:00Z"));
        let recent = reading(ts("2024-11-12T08:00:00Z"));
        let middle = reading(ts("2024-10-22T08:00:00Z"));

        let summaries = aggregate_weekly(&[old, recent, middle]);

        assert_eq!(summaries.len(), 3);
        assert!(summaries[0].week_start > summaries[1].week_start);
        assert!(summaries[1].week_start > summaries[2].week_start);
    }

    /// First and last timestamps bound the bucket's readings
    #[test]
    fn test_first_and_last_timestamps() {
        let early = reading(ts("2024-11-11T06:00:00Z"));
        let late = reading(ts("2024-11-15T21:00:00Z"));
        let mid = reading(ts("2024-11-13T12:00:00Z"));

        let summaries = aggregate_weekly(&[mid, late.clone(), early.clone()]);

        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].first_reading_at, early.recorded_at);
        assert_eq!(summaries[0].last_reading_at, late.recorded_at);
    }

    /// sample_means builds the synthetic engine input from a set of readings
    #[test]
    fn test_sample_means_over_window() {
        let mut a = reading(ts("2024-11-11T08:00:00Z"));
        a.ph = Some(dec("5.5"));
        a.potassium = Some(dec("0.2"));

        let mut b = reading(ts("2024-11-14T08:00:00Z"));
        b.ph = Some(dec("6.5"));
        b.potassium = Some(dec("0.4"));

        let readings = vec![a, b];
        let means = sample_means(readings.iter());

        assert_eq!(means.ph, Some(dec("6.00")));
        assert_eq!(means.potassium, Some(dec("0.30")));
        assert_eq!(means.nitrogen, None);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    /// Timestamps across a few years around the epoch of interest
    fn timestamp_strategy() -> impl Strategy<Value = DateTime<Utc>> {
        // 2023-01-01T00:00:00Z .. 2026-12-31T23:59:59Z
        (1_672_531_200i64..1_798_761_599i64).prop_map(|secs| {
            DateTime::<Utc>::from_timestamp(secs, 0).unwrap()
        })
    }

    fn value_strategy() -> impl Strategy<Value = Option<Decimal>> {
        proptest::option::of((0i64..=10_000i64).prop_map(|n| Decimal::new(n, 1)))
    }

    fn reading_strategy() -> impl Strategy<Value = Reading> {
        (timestamp_strategy(), value_strategy(), value_strategy()).prop_map(
            |(recorded_at, ph, nitrogen)| {
                let mut r = reading(recorded_at);
                r.ph = ph;
                r.nitrogen = nitrogen;
                r
            },
        )
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// The bucket key is always a Monday on or before the reading date
        #[test]
        fn prop_week_start_is_monday(timestamp in timestamp_strategy()) {
            let start = week_start(timestamp);

            prop_assert_eq!(start.weekday(), Weekday::Mon);
            prop_assert!(start <= timestamp.date_naive());
            prop_assert!(timestamp.date_naive() - start < Duration::days(7));
        }

        /// Two readings share a bucket exactly when their Mondays agree
        #[test]
        fn prop_same_bucket_iff_same_monday(
            a in timestamp_strategy(),
            b in timestamp_strategy()
        ) {
            let same_bucket = week_start(a) == week_start(b);
            let days_apart = (a.date_naive() - week_start(a)).num_days();

            // A reading is never more than 6 days past its bucket key
            prop_assert!((0..7).contains(&days_apart));

            if same_bucket {
                prop_assert!((a.date_naive() - b.date_naive()).num_days().abs() < 7);
            }
        }

        /// Every reading lands in exactly one bucket
        #[test]
        fn prop_counts_preserved(
            readings in proptest::collection::vec(reading_strategy(), 0..40)
        ) {
            let summaries = aggregate_weekly(&readings);

            let total: usize = summaries.iter().map(|s| s.reading_count).sum();
            prop_assert_eq!(total, readings.len());

            // Bucket keys are unique and strictly descending
            for pair in summaries.windows(2) {
                prop_assert!(pair[0].week_start > pair[1].week_start);
            }
        }

        /// A bucket mean is present exactly when some reading carries the
        /// field, and it stays within the observed bounds
        #[test]
        fn prop_mean_within_bounds(
            readings in proptest::collection::vec(reading_strategy(), 1..20)
        ) {
            let summaries = aggregate_weekly(&readings);

            for summary in summaries {
                let in_bucket: Vec<&Reading> = readings
                    .iter()
                    .filter(|r| week_start(r.recorded_at) == summary.week_start)
                    .collect();

                let ph_values: Vec<Decimal> =
                    in_bucket.iter().filter_map(|r| r.ph).collect();

                match summary.ph_avg {
                    None => prop_assert!(ph_values.is_empty()),
                    Some(avg) => {
                        let min = ph_values.iter().min().copied().unwrap();
                        let max = ph_values.iter().max().copied().unwrap();
                        // Rounded mean stays within a half-unit of the bounds
                        prop_assert!(avg >= min - Decimal::new(5, 3));
                        prop_assert!(avg <= max + Decimal::new(5, 3));
                    }
                }
            }
        }
    }
}
