//! Reference ranges for lab tests

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::LabGaugeError;

/// Fraction of the range span added on each side for gauge windows
pub const GAUGE_EXTENSION_FRACTION: f64 = 0.3;

/// Low/high bounds considered normal for a lab test
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReferenceRange {
    pub low: f64,
    pub high: f64,
}

impl ReferenceRange {
    /// Build a range, swapping the bounds if they arrive inverted
    pub fn new(low: f64, high: f64) -> Self {
        Self { low, high }.normalized()
    }

    /// Build a range, rejecting inverted or non-finite bounds
    pub fn try_new(low: f64, high: f64) -> Result<Self, LabGaugeError> {
        if !low.is_finite() || !high.is_finite() {
            return Err(LabGaugeError::NonFiniteRange);
        }
        if low > high {
            return Err(LabGaugeError::InvalidRange { low, high });
        }
        Ok(Self { low, high })
    }

    /// Copy of this range with `low <= high`
    ///
    /// Deserialized ranges bypass the constructors, so every consumer in
    /// the engine normalizes before computing.
    pub fn normalized(self) -> Self {
        if self.low > self.high {
            warn!(
                "Reference range inverted (low {} > high {}), swapping bounds",
                self.low, self.high
            );
            Self { low: self.high, high: self.low }
        } else {
            self
        }
    }

    pub fn span(&self) -> f64 {
        self.high - self.low
    }

    pub fn midpoint(&self) -> f64 {
        (self.low + self.high) / 2.0
    }

    pub fn is_finite(&self) -> bool {
        self.low.is_finite() && self.high.is_finite()
    }

    /// Inclusive containment check
    pub fn contains(&self, value: f64) -> bool {
        value >= self.low && value <= self.high
    }

    /// Widen by `fraction` of the span on each side
    pub fn extended(&self, fraction: f64) -> Self {
        let range = self.normalized();
        let pad = range.span() * fraction;
        Self {
            low: range.low - pad,
            high: range.high + pad,
        }
    }

    /// Window used to place values on a dial
    pub fn gauge_window(&self) -> Self {
        self.extended(GAUGE_EXTENSION_FRACTION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_swaps_inverted_bounds() {
        let range = ReferenceRange::new(16.0, 12.0);
        assert_eq!(range.low, 12.0);
        assert_eq!(range.high, 16.0);
    }

    #[test]
    fn test_try_new_rejects_inverted_bounds() {
        assert!(matches!(
            ReferenceRange::try_new(5.0, 1.0),
            Err(LabGaugeError::InvalidRange { .. })
        ));
        assert!(matches!(
            ReferenceRange::try_new(f64::NAN, 1.0),
            Err(LabGaugeError::NonFiniteRange)
        ));
        assert!(ReferenceRange::try_new(3.0, 3.0).is_ok());
    }

    #[test]
    fn test_gauge_window() {
        let window = ReferenceRange::new(70.0, 180.0).gauge_window();
        assert!((window.low - 37.0).abs() < 1e-9);
        assert!((window.high - 213.0).abs() < 1e-9);
    }

    #[test]
    fn test_contains_is_inclusive() {
        let range = ReferenceRange::new(12.0, 16.0);
        assert!(range.contains(12.0));
        assert!(range.contains(16.0));
        assert!(!range.contains(16.01));
        assert!(!range.contains(f64::NAN));
    }

    #[test]
    fn test_deserialize() {
        let range: ReferenceRange = serde_json::from_str(r#"{"low": 0.4, "high": 4.0}"#).unwrap();
        assert_eq!(range, ReferenceRange::new(0.4, 4.0));
    }
}
