//! Interpretation of a single lab value for scalar widgets
//!
//! Combines classification, trend, gauge placement and display formatting
//! into one record the rendering layer consumes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::format::{format_with_unit, DEFAULT_BASE_PRECISION};
use crate::gauge::{GaugeGeometry, GaugeLayout};
use crate::range::ReferenceRange;
use crate::status::{classify_with, Status, DEFAULT_BORDERLINE_FRACTION};
use crate::trend::{percent_change, TrendAnalyzer, TrendDirection, DEFAULT_STABLE_THRESHOLD};

/// A lab result as delivered by the records source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabValue {
    pub value: f64,
    pub unit: String,
    pub reference_range: ReferenceRange,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

/// Knobs for interpreting a value
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InterpretOptions {
    pub borderline_fraction: f64,
    pub stable_threshold: f64,
    pub lower_is_better: bool,
    pub base_precision: usize,
    pub layout: GaugeLayout,
}

impl Default for InterpretOptions {
    fn default() -> Self {
        Self {
            borderline_fraction: DEFAULT_BORDERLINE_FRACTION,
            stable_threshold: DEFAULT_STABLE_THRESHOLD,
            lower_is_better: false,
            base_precision: DEFAULT_BASE_PRECISION,
            layout: GaugeLayout::default(),
        }
    }
}

/// Everything a scalar widget needs to draw one value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabInterpretation {
    pub status: Status,
    pub trend: TrendDirection,
    pub trend_arrow: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percent_change: Option<f64>,
    pub gauge: GaugeGeometry,
    pub display: String,
}

impl LabValue {
    pub fn new(value: f64, unit: impl Into<String>, reference_range: ReferenceRange) -> Self {
        Self {
            value,
            unit: unit.into(),
            reference_range,
            previous_value: None,
            timestamp: None,
        }
    }

    pub fn with_previous(mut self, previous: f64) -> Self {
        self.previous_value = Some(previous);
        self
    }

    pub fn status(&self, borderline_fraction: f64) -> Status {
        classify_with(self.value, self.reference_range, borderline_fraction)
    }

    pub fn interpret(&self, opts: &InterpretOptions) -> LabInterpretation {
        let trend = TrendAnalyzer::new(opts.lower_is_better)
            .with_stable_threshold(opts.stable_threshold)
            .analyze(self.value, self.previous_value);

        LabInterpretation {
            status: self.status(opts.borderline_fraction),
            trend,
            trend_arrow: trend.arrow().to_string(),
            percent_change: self
                .previous_value
                .and_then(|prev| percent_change(self.value, prev)),
            gauge: GaugeGeometry::for_value(self.value, self.reference_range, opts.layout),
            display: format_with_unit(self.value, &self.unit, opts.base_precision),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interpret_hemoglobin() {
        let hgb = LabValue::new(14.2, "g/dL", ReferenceRange::new(12.0, 16.0)).with_previous(13.0);
        let result = hgb.interpret(&InterpretOptions::default());

        assert_eq!(result.status, Status::Normal);
        assert_eq!(result.trend, TrendDirection::Improving);
        assert_eq!(result.trend_arrow, "↑");
        assert_eq!(result.display, "14.20 g/dL");
        assert!(result.gauge.fractional_position > 0.0 && result.gauge.fractional_position < 1.0);
    }

    #[test]
    fn test_lower_is_better_metric() {
        let ldl = LabValue::new(120.0, "mg/dL", ReferenceRange::new(0.0, 100.0)).with_previous(100.0);
        let opts = InterpretOptions {
            lower_is_better: true,
            ..InterpretOptions::default()
        };
        let result = ldl.interpret(&opts);
        assert_eq!(result.status, Status::Abnormal);
        assert_eq!(result.trend, TrendDirection::Worsening);
        // window widens to -30..130
        assert!((result.gauge.fractional_position - 0.9375).abs() < 1e-9);
        assert_eq!(result.percent_change, Some(20.0));
    }

    #[test]
    fn test_no_previous_value() {
        let tsh = LabValue::new(2.1, "mIU/L", ReferenceRange::new(0.4, 4.0));
        let result = tsh.interpret(&InterpretOptions::default());
        assert_eq!(result.trend, TrendDirection::New);
        assert_eq!(result.percent_change, None);
    }

    #[test]
    fn test_deserialize_record() {
        let json = r#"{
            "value": 9.8,
            "unit": "g/dL",
            "referenceRange": {"low": 12, "high": 16},
            "previousValue": 11.5
        }"#;
        let record: LabValue = serde_json::from_str(json).unwrap();
        assert_eq!(record.previous_value, Some(11.5));
        assert_eq!(record.timestamp, None);
        assert_eq!(record.status(DEFAULT_BORDERLINE_FRACTION), Status::Abnormal);
    }
}
