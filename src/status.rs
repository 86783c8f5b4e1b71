//! Status classification of a value against its reference range

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::range::ReferenceRange;

/// Default share of the span treated as borderline at each edge
pub const DEFAULT_BORDERLINE_FRACTION: f64 = 0.1;

/// Values below `low * CRITICAL_LOW_FACTOR` are critical
pub const CRITICAL_LOW_FACTOR: f64 = 0.7;

/// Values above `high * CRITICAL_HIGH_FACTOR` are critical
pub const CRITICAL_HIGH_FACTOR: f64 = 1.3;

/// Severity tier of a lab result, ordered from least to most severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Normal,
    Borderline,
    Abnormal,
    Critical,
}

impl Status {
    /// Get a display label for the status
    pub fn label(self) -> &'static str {
        match self {
            Status::Normal => "Normal",
            Status::Borderline => "Borderline",
            Status::Abnormal => "Abnormal",
            Status::Critical => "Critical",
        }
    }

    /// Get a short status text
    pub fn tag(self) -> &'static str {
        match self {
            Status::Normal => "OK",
            Status::Borderline => "WATCH",
            Status::Abnormal => "OUT OF RANGE",
            Status::Critical => "CRITICAL",
        }
    }

    pub fn is_out_of_range(self) -> bool {
        self >= Status::Abnormal
    }
}

/// Classify a value using the default borderline fraction
pub fn classify(value: f64, range: ReferenceRange) -> Status {
    classify_with(value, range, DEFAULT_BORDERLINE_FRACTION)
}

/// Classify a value against a reference range
///
/// Critical bounds are multiplicative, so a range anchored at zero can
/// only go critical on the high side.
pub fn classify_with(value: f64, range: ReferenceRange, borderline_fraction: f64) -> Status {
    if !value.is_finite() {
        warn!("Non-finite value {} classified as normal", value);
        return Status::Normal;
    }
    if !range.is_finite() {
        warn!("Non-finite reference range {:?}, classifying as normal", range);
        return Status::Normal;
    }
    let fraction = if borderline_fraction.is_finite() {
        borderline_fraction
    } else {
        DEFAULT_BORDERLINE_FRACTION
    };

    let range = range.normalized();
    let span = range.span();
    let borderline_low = range.low + span * fraction;
    let borderline_high = range.high - span * fraction;

    let status = if value < range.low * CRITICAL_LOW_FACTOR || value > range.high * CRITICAL_HIGH_FACTOR {
        Status::Critical
    } else if value < range.low || value > range.high {
        Status::Abnormal
    } else if value < borderline_low || value > borderline_high {
        Status::Borderline
    } else {
        Status::Normal
    };

    debug!("classify {} against {}-{}: {:?}", value, range.low, range.high, status);
    status
}
