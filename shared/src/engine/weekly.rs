//! Weekly aggregation of parcel readings
//!
//! Readings are grouped into Monday-anchored ISO week buckets; each bucket
//! reports per-field arithmetic means over the readings that actually carry
//! the field, never a fabricated zero.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{round2, SoilSample};
use crate::models::Reading;

/// Monday of the ISO week containing the timestamp
pub fn week_start(timestamp: DateTime<Utc>) -> NaiveDate {
    let date = timestamp.date_naive();
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

/// Summary of one week bucket of readings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeeklySummary {
    pub week_start: NaiveDate,
    pub reading_count: usize,
    pub first_reading_at: DateTime<Utc>,
    pub last_reading_at: DateTime<Utc>,
    pub ph_avg: Option<Decimal>,
    pub temperature_avg: Option<Decimal>,
    pub humidity_avg: Option<Decimal>,
    pub nitrogen_avg: Option<Decimal>,
    pub phosphorus_avg: Option<Decimal>,
    pub potassium_avg: Option<Decimal>,
}

/// Group readings by week bucket and average each numeric field over its
/// present values. Buckets come back most recent week first; weeks with no
/// readings never appear.
pub fn aggregate_weekly(readings: &[Reading]) -> Vec<WeeklySummary> {
    let mut buckets: BTreeMap<NaiveDate, Vec<&Reading>> = BTreeMap::new();
    for reading in readings {
        buckets
            .entry(week_start(reading.recorded_at))
            .or_default()
            .push(reading);
    }

    buckets
        .into_iter()
        .rev()
        .map(|(start, group)| summarize_week(start, &group))
        .collect()
}

/// Per-field means over a set of readings, as a sample the engine accepts.
///
/// Each field averages only the readings that carry it; a field nobody
/// supplied stays `None`. This is the synthetic input the per-week
/// recommendation path feeds into the same calculators as a raw reading.
pub fn sample_means<'a, I>(readings: I) -> SoilSample
where
    I: IntoIterator<Item = &'a Reading> + Clone,
{
    SoilSample {
        ph: mean(readings.clone().into_iter().filter_map(|r| r.ph)),
        temperature: mean(readings.clone().into_iter().filter_map(|r| r.temperature)),
        humidity: mean(readings.clone().into_iter().filter_map(|r| r.humidity)),
        nitrogen: mean(readings.clone().into_iter().filter_map(|r| r.nitrogen)),
        phosphorus: mean(readings.clone().into_iter().filter_map(|r| r.phosphorus)),
        potassium: mean(readings.clone().into_iter().filter_map(|r| r.potassium)),
    }
}

fn summarize_week(start: NaiveDate, group: &[&Reading]) -> WeeklySummary {
    let mut first = group[0].recorded_at;
    let mut last = group[0].recorded_at;
    for reading in group {
        if reading.recorded_at < first {
            first = reading.recorded_at;
        }
        if reading.recorded_at > last {
            last = reading.recorded_at;
        }
    }

    let means = sample_means(group.iter().copied());

    WeeklySummary {
        week_start: start,
        reading_count: group.len(),
        first_reading_at: first,
        last_reading_at: last,
        ph_avg: means.ph,
        temperature_avg: means.temperature,
        humidity_avg: means.humidity,
        nitrogen_avg: means.nitrogen,
        phosphorus_avg: means.phosphorus,
        potassium_avg: means.potassium,
    }
}

/// Arithmetic mean rounded to two decimals; `None` for an empty set
fn mean(values: impl Iterator<Item = Decimal>) -> Option<Decimal> {
    let values: Vec<Decimal> = values.collect();
    if values.is_empty() {
        return None;
    }
    let sum: Decimal = values.iter().sum();
    Some(round2(sum / Decimal::from(values.len() as u64)))
}
