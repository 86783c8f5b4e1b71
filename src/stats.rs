//! Time-in-range statistics for glucose readings
//!
//! All values are in mg/dL. Percentages are rounded to whole numbers per
//! bucket and are not rebalanced, so in-range, below and above may sum to
//! 99 or 101.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use log::{debug, warn};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::LabGaugeError;
use crate::range::ReferenceRange;

/// Epoch values at or above this are taken as milliseconds
const EPOCH_MILLIS_THRESHOLD: i64 = 100_000_000_000;

/// A single glucose measurement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlucoseReading {
    pub value: f64,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_fasting: Option<bool>,
}

impl GlucoseReading {
    pub fn new(value: f64, timestamp: DateTime<Utc>) -> Self {
        Self {
            value,
            timestamp,
            is_fasting: None,
        }
    }

    pub fn fasting(mut self, is_fasting: bool) -> Self {
        self.is_fasting = Some(is_fasting);
        self
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTimestamp {
    Epoch(i64),
    Text(String),
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    match RawTimestamp::deserialize(deserializer)? {
        RawTimestamp::Epoch(epoch) => from_epoch(epoch).map_err(serde::de::Error::custom),
        RawTimestamp::Text(text) => parse_timestamp(&text).map_err(serde::de::Error::custom),
    }
}

/// Convert an epoch in seconds (or milliseconds, for large values) to UTC
pub fn from_epoch(epoch: i64) -> Result<DateTime<Utc>, LabGaugeError> {
    let parsed = if epoch.abs() >= EPOCH_MILLIS_THRESHOLD {
        Utc.timestamp_millis_opt(epoch).single()
    } else {
        Utc.timestamp_opt(epoch, 0).single()
    };
    parsed.ok_or_else(|| LabGaugeError::InvalidTimestamp(epoch.to_string()))
}

/// Parse an ISO-8601 timestamp; naive date-times are taken as UTC
pub fn parse_timestamp(text: &str) -> Result<DateTime<Utc>, LabGaugeError> {
    let text = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Ok(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, fmt) {
            return Ok(Utc.from_utc_datetime(&naive));
        }
    }
    Err(LabGaugeError::InvalidTimestamp(text.to_string()))
}

/// Readings flagged as fasting
pub fn fasting_only(readings: &[GlucoseReading]) -> Vec<GlucoseReading> {
    readings
        .iter()
        .filter(|r| r.is_fasting == Some(true))
        .cloned()
        .collect()
}

/// Time-in-range summary for a reading series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeInRangeStats {
    pub count: usize,
    pub percent_in_range: f64,
    pub percent_below: f64,
    pub percent_above: f64,
    pub mean: f64,
    pub coefficient_of_variation_percent: f64,
    /// Set when no finite readings remain or the mean is zero; the zeros
    /// above then mean "no data", not "no variability"
    pub insufficient_data: bool,
}

impl TimeInRangeStats {
    fn empty() -> Self {
        Self {
            count: 0,
            percent_in_range: 0.0,
            percent_below: 0.0,
            percent_above: 0.0,
            mean: 0.0,
            coefficient_of_variation_percent: 0.0,
            insufficient_data: true,
        }
    }

    /// Glucose Management Indicator (estimated HbA1c %) from the mean
    pub fn gmi(&self) -> Option<f64> {
        if self.insufficient_data {
            return None;
        }
        glucose_management_indicator(self.mean)
    }
}

/// Compute time-in-range statistics against a target band
///
/// NaN and infinite readings are dropped before counting, so `count` is the
/// number of finite readings.
pub fn time_in_range(readings: &[GlucoseReading], target: ReferenceRange) -> TimeInRangeStats {
    let values: Vec<f64> = readings
        .iter()
        .filter_map(|r| {
            if r.value.is_finite() {
                Some(r.value)
            } else {
                warn!("Dropping non-finite glucose reading {} at {}", r.value, r.timestamp);
                None
            }
        })
        .collect();
    if values.is_empty() {
        return TimeInRangeStats::empty();
    }
    let target = target.normalized();

    let n = values.len() as f64;
    let mut below = 0usize;
    let mut above = 0usize;
    let mut in_range = 0usize;
    for &v in &values {
        if v < target.low {
            below += 1;
        } else if v > target.high {
            above += 1;
        } else {
            in_range += 1;
        }
    }

    // divide before summing so large finite values cannot overflow
    let mean = values.iter().map(|v| v / n).sum::<f64>();
    let variance = population_variance(values.iter().copied(), mean, n);
    let cv = (100.0 * variance.sqrt() / mean).round();

    let (cv, insufficient_data) = if mean == 0.0 || !cv.is_finite() {
        warn!("Mean glucose is {}, coefficient of variation undefined", mean);
        (0.0, true)
    } else {
        (cv, false)
    };

    let stats = TimeInRangeStats {
        count: values.len(),
        percent_in_range: (100.0 * in_range as f64 / n).round(),
        percent_below: (100.0 * below as f64 / n).round(),
        percent_above: (100.0 * above as f64 / n).round(),
        mean,
        coefficient_of_variation_percent: cv,
        insufficient_data,
    };
    debug!(
        "TIR over {} readings: {}% in, {}% below, {}% above, CV {}%",
        stats.count, stats.percent_in_range, stats.percent_below, stats.percent_above, cv
    );
    stats
}

fn population_variance(values: impl Iterator<Item = f64>, mean: f64, n: f64) -> f64 {
    values.map(|v| (v - mean).powi(2)).sum::<f64>() / n
}

/// Glucose Management Indicator: `3.31 + 0.02392 × mean mg/dL`
pub fn glucose_management_indicator(mean_mgdl: f64) -> Option<f64> {
    if !mean_mgdl.is_finite() || mean_mgdl <= 0.0 {
        return None;
    }
    Some(3.31 + 0.02392 * mean_mgdl)
}

/// Estimated average glucose (mg/dL) for an HbA1c percentage
pub fn estimated_average_glucose(hba1c_percent: f64) -> Option<f64> {
    if !hba1c_percent.is_finite() || hba1c_percent <= 0.0 {
        return None;
    }
    Some(28.7 * hba1c_percent - 46.7)
}

/// Distribution summary of a series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesSummary {
    pub count: usize,
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub median: f64,
    pub q1: f64, // 25th percentile
    pub q3: f64, // 75th percentile
}

impl SeriesSummary {
    pub fn from_readings(readings: &[GlucoseReading]) -> Option<Self> {
        let values: Vec<f64> = readings.iter().map(|r| r.value).collect();
        Self::from_values(&values)
    }

    /// Non-finite values are skipped
    pub fn from_values(values: &[f64]) -> Option<Self> {
        let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        if sorted.is_empty() {
            return None;
        }
        sorted.sort_by(|a, b| a.total_cmp(b));

        let count = sorted.len();
        let n = count as f64;
        let mean = sorted.iter().sum::<f64>() / n;
        let std_dev = population_variance(sorted.iter().copied(), mean, n).sqrt();

        Some(Self {
            count,
            mean,
            std_dev,
            min: sorted[0],
            max: sorted[count - 1],
            median: percentile(&sorted, 50.0),
            q1: percentile(&sorted, 25.0),
            q3: percentile(&sorted, 75.0),
        })
    }

    pub fn interquartile_range(&self) -> f64 {
        self.q3 - self.q1
    }
}

/// Nearest-rank percentile of sorted values
fn percentile(sorted_values: &[f64], pct: f64) -> f64 {
    if sorted_values.is_empty() {
        return 0.0;
    }
    let idx = ((sorted_values.len() as f64 - 1.0) * pct / 100.0).round() as usize;
    sorted_values[idx.min(sorted_values.len() - 1)]
}

/// Consensus glucose band of a single reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GlucoseBand {
    VeryLow,  // < 54 mg/dL - clinically significant hypoglycemia
    Low,      // 54 to target low
    InRange,  // target low to target high
    High,     // target high to 250
    VeryHigh, // > 250 mg/dL
}

impl GlucoseBand {
    pub const VERY_LOW_MGDL: f64 = 54.0;
    pub const VERY_HIGH_MGDL: f64 = 250.0;

    pub fn classify(value: f64, target: ReferenceRange) -> Self {
        if value < Self::VERY_LOW_MGDL {
            GlucoseBand::VeryLow
        } else if value < target.low {
            GlucoseBand::Low
        } else if value <= target.high {
            GlucoseBand::InRange
        } else if value <= Self::VERY_HIGH_MGDL {
            GlucoseBand::High
        } else {
            GlucoseBand::VeryHigh
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            GlucoseBand::VeryLow => "Very Low",
            GlucoseBand::Low => "Low",
            GlucoseBand::InRange => "In Range",
            GlucoseBand::High => "High",
            GlucoseBand::VeryHigh => "Very High",
        }
    }
}

/// Reading counts per consensus band
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlucoseBands {
    pub total: usize,
    pub very_low: usize,
    pub low: usize,
    pub in_range: usize,
    pub high: usize,
    pub very_high: usize,
}

impl GlucoseBands {
    pub fn from_readings(readings: &[GlucoseReading], target: ReferenceRange) -> Self {
        let target = target.normalized();
        let mut bands = Self::default();
        for r in readings.iter().filter(|r| r.value.is_finite()) {
            bands.total += 1;
            match GlucoseBand::classify(r.value, target) {
                GlucoseBand::VeryLow => bands.very_low += 1,
                GlucoseBand::Low => bands.low += 1,
                GlucoseBand::InRange => bands.in_range += 1,
                GlucoseBand::High => bands.high += 1,
                GlucoseBand::VeryHigh => bands.very_high += 1,
            }
        }
        bands
    }

    pub fn count(&self, band: GlucoseBand) -> usize {
        match band {
            GlucoseBand::VeryLow => self.very_low,
            GlucoseBand::Low => self.low,
            GlucoseBand::InRange => self.in_range,
            GlucoseBand::High => self.high,
            GlucoseBand::VeryHigh => self.very_high,
        }
    }

    /// Unrounded percentage of readings in `band`
    pub fn percentage(&self, band: GlucoseBand) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        (self.count(band) as f64 / self.total as f64) * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use proptest::prelude::*;

    fn series(values: &[f64]) -> Vec<GlucoseReading> {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap();
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| GlucoseReading::new(v, start + Duration::hours(i as i64)))
            .collect()
    }

    fn target() -> ReferenceRange {
        ReferenceRange::new(70.0, 180.0)
    }

    #[test]
    fn test_time_in_range_scenario() {
        let stats = time_in_range(&series(&[60.0, 90.0, 120.0, 200.0, 250.0]), target());
        assert_eq!(stats.count, 5);
        assert_eq!(stats.percent_in_range, 40.0);
        assert_eq!(stats.percent_below, 20.0);
        assert_eq!(stats.percent_above, 40.0);
        assert!((stats.mean - 144.0).abs() < 1e-9);
        assert!(!stats.insufficient_data);
    }

    #[test]
    fn test_coefficient_of_variation() {
        // mean 100, population std dev 20
        let stats = time_in_range(&series(&[80.0, 120.0, 80.0, 120.0]), target());
        assert_eq!(stats.coefficient_of_variation_percent, 20.0);
    }

    #[test]
    fn test_bounds_count_as_in_range() {
        let stats = time_in_range(&series(&[70.0, 180.0]), target());
        assert_eq!(stats.percent_in_range, 100.0);
    }

    #[test]
    fn test_empty_series_is_all_zero() {
        let stats = time_in_range(&[], target());
        assert_eq!(stats.count, 0);
        assert_eq!(stats.percent_in_range, 0.0);
        assert_eq!(stats.mean, 0.0);
        assert_eq!(stats.coefficient_of_variation_percent, 0.0);
        assert!(stats.insufficient_data);
        assert_eq!(stats.gmi(), None);
    }

    #[test]
    fn test_zero_mean_flags_insufficient_data() {
        let stats = time_in_range(&series(&[0.0, 0.0]), target());
        assert_eq!(stats.coefficient_of_variation_percent, 0.0);
        assert!(stats.insufficient_data);
    }

    #[test]
    fn test_non_finite_readings_are_dropped() {
        let stats = time_in_range(&series(&[100.0, f64::NAN, 120.0]), target());
        assert_eq!(stats.count, 2);
        assert_eq!(stats.percent_in_range, 100.0);
        assert!((stats.mean - 110.0).abs() < 1e-9);
        assert!(!stats.insufficient_data);

        let readings = series(&[100.0, f64::INFINITY]);
        let stats = time_in_range(&readings, target());
        assert_eq!(stats.count, 1);
        assert_eq!(stats.mean, 100.0);
        assert_eq!(stats.count, GlucoseBands::from_readings(&readings, target()).total);

        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["mean"], 100.0);
    }

    #[test]
    fn test_only_non_finite_readings_is_empty() {
        let stats = time_in_range(&series(&[f64::NAN, f64::NEG_INFINITY]), target());
        assert_eq!(stats.count, 0);
        assert_eq!(stats.mean, 0.0);
        assert!(stats.insufficient_data);
    }

    #[test]
    fn test_huge_finite_values_keep_mean_finite() {
        let stats = time_in_range(&series(&[f64::MAX, f64::MAX]), target());
        assert!(stats.mean.is_finite());
        assert_eq!(stats.percent_above, 100.0);
    }

    #[test]
    fn test_thirds_round_to_99() {
        let stats = time_in_range(&series(&[50.0, 100.0, 200.0]), target());
        assert_eq!(stats.percent_below, 33.0);
        assert_eq!(stats.percent_in_range, 33.0);
        assert_eq!(stats.percent_above, 33.0);
    }

    #[test]
    fn test_gmi_and_eag() {
        let gmi = glucose_management_indicator(154.0).unwrap();
        assert!((gmi - 6.99368).abs() < 1e-9);
        let eag = estimated_average_glucose(7.0).unwrap();
        assert!((eag - 154.2).abs() < 1e-9);
        assert_eq!(glucose_management_indicator(0.0), None);
        assert_eq!(estimated_average_glucose(f64::NAN), None);
    }

    #[test]
    fn test_series_summary() {
        let summary = SeriesSummary::from_values(&[100.0, 160.0, 120.0, 180.0, 140.0]).unwrap();
        assert_eq!(summary.count, 5);
        assert_eq!(summary.min, 100.0);
        assert_eq!(summary.max, 180.0);
        assert_eq!(summary.median, 140.0);
        assert_eq!(summary.q1, 120.0);
        assert_eq!(summary.q3, 160.0);
        assert_eq!(summary.interquartile_range(), 40.0);
        assert!(SeriesSummary::from_values(&[]).is_none());
        assert!(SeriesSummary::from_values(&[f64::NAN]).is_none());
    }

    #[test]
    fn test_glucose_bands() {
        let bands = GlucoseBands::from_readings(&series(&[50.0, 65.0, 100.0, 150.0, 200.0, 300.0]), target());
        assert_eq!(bands.very_low, 1);
        assert_eq!(bands.low, 1);
        assert_eq!(bands.in_range, 2);
        assert_eq!(bands.high, 1);
        assert_eq!(bands.very_high, 1);
        assert!((bands.percentage(GlucoseBand::InRange) - 100.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_fasting_only() {
        let mut readings = series(&[95.0, 160.0, 102.0]);
        readings[0] = readings[0].clone().fasting(true);
        readings[1] = readings[1].clone().fasting(false);
        let fasting = fasting_only(&readings);
        assert_eq!(fasting.len(), 1);
        assert_eq!(fasting[0].value, 95.0);
    }

    #[test]
    fn test_deserialize_timestamps() {
        let json = r#"[
            {"value": 98, "timestamp": "2024-03-01T07:30:00Z", "isFasting": true},
            {"value": 140, "timestamp": "2024-03-01 12:15:00"},
            {"value": 120, "timestamp": 1709294400},
            {"value": 110, "timestamp": 1709294400000}
        ]"#;
        let readings: Vec<GlucoseReading> = serde_json::from_str(json).unwrap();
        assert_eq!(readings.len(), 4);
        assert_eq!(readings[0].is_fasting, Some(true));
        assert_eq!(readings[1].is_fasting, None);
        assert_eq!(readings[1].timestamp, Utc.with_ymd_and_hms(2024, 3, 1, 12, 15, 0).unwrap());
        assert_eq!(readings[2].timestamp, readings[3].timestamp);
    }

    #[test]
    fn test_invalid_timestamp() {
        assert!(matches!(
            parse_timestamp("yesterday"),
            Err(LabGaugeError::InvalidTimestamp(_))
        ));
        let bad: Result<GlucoseReading, _> = serde_json::from_str(r#"{"value": 1, "timestamp": "soon"}"#);
        assert!(bad.is_err());
    }

    proptest! {
        /// Property: rounded bucket percentages stay within 1 of 100.
        #[test]
        fn partition_within_rounding(values in proptest::collection::vec(20.0f64..400.0, 1..200)) {
            let stats = time_in_range(&series(&values), target());
            let sum = stats.percent_in_range + stats.percent_below + stats.percent_above;
            prop_assert!((sum - 100.0).abs() <= 1.0);
        }

        /// Property: non-finite readings never reach the partition or the mean.
        #[test]
        fn partition_ignores_non_finite(
            values in proptest::collection::vec(20.0f64..400.0, 1..100),
            junk in proptest::collection::vec(prop_oneof![Just(f64::NAN), Just(f64::INFINITY), Just(f64::NEG_INFINITY)], 0..10),
        ) {
            let mut all = values.clone();
            all.extend(junk);
            let stats = time_in_range(&series(&all), target());
            let sum = stats.percent_in_range + stats.percent_below + stats.percent_above;
            prop_assert_eq!(stats.count, values.len());
            prop_assert!((sum - 100.0).abs() <= 1.0);
            prop_assert!(stats.mean.is_finite());
        }
    }
}
