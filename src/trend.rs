//! Trend of a lab value relative to its previous result

use log::warn;
use serde::{Deserialize, Serialize};

/// Relative change below which a value counts as stable
pub const DEFAULT_STABLE_THRESHOLD: f64 = 0.05;

/// Qualitative direction of change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Improving,
    Worsening,
    Stable,
    /// No previous value to compare against
    New,
}

impl TrendDirection {
    pub fn label(self) -> &'static str {
        match self {
            TrendDirection::Improving => "Improving",
            TrendDirection::Worsening => "Worsening",
            TrendDirection::Stable => "Stable",
            TrendDirection::New => "New",
        }
    }

    /// Arrow glyph shown next to the value
    pub fn arrow(self) -> &'static str {
        match self {
            TrendDirection::Improving => "↑",
            TrendDirection::Worsening => "↓",
            TrendDirection::Stable => "→",
            TrendDirection::New => "•",
        }
    }
}

/// Compares a current value with a previous one
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendAnalyzer {
    /// Whether a falling value is good news (e.g. LDL, HbA1c)
    pub lower_is_better: bool,
    pub stable_threshold: f64,
}

impl Default for TrendAnalyzer {
    fn default() -> Self {
        Self {
            lower_is_better: false,
            stable_threshold: DEFAULT_STABLE_THRESHOLD,
        }
    }
}

impl TrendAnalyzer {
    pub fn new(lower_is_better: bool) -> Self {
        Self {
            lower_is_better,
            ..Self::default()
        }
    }

    pub fn with_stable_threshold(mut self, threshold: f64) -> Self {
        self.stable_threshold = threshold;
        self
    }

    pub fn analyze(&self, current: f64, previous: Option<f64>) -> TrendDirection {
        let Some(previous) = previous else {
            return TrendDirection::New;
        };
        if !current.is_finite() || !previous.is_finite() {
            warn!("Non-finite trend input ({} vs {}), reporting stable", current, previous);
            return TrendDirection::Stable;
        }
        if previous == 0.0 {
            // No baseline to measure relative change against
            warn!("Previous value is zero, trend has no baseline");
            return if current == 0.0 {
                TrendDirection::Stable
            } else {
                TrendDirection::New
            };
        }

        let delta = current - previous;
        let change = delta.abs() / previous.abs();
        if change < self.stable_threshold {
            return TrendDirection::Stable;
        }

        let improving = if self.lower_is_better { delta < 0.0 } else { delta > 0.0 };
        if improving {
            TrendDirection::Improving
        } else {
            TrendDirection::Worsening
        }
    }
}

/// Trend of `current` against an optional `previous` value
pub fn trend(current: f64, previous: Option<f64>, lower_is_better: bool) -> TrendDirection {
    TrendAnalyzer::new(lower_is_better).analyze(current, previous)
}

/// Relative change from `previous` to `current`, `None` without a usable baseline
pub fn percent_change(current: f64, previous: f64) -> Option<f64> {
    if !current.is_finite() || !previous.is_finite() || previous == 0.0 {
        return None;
    }
    Some((current - previous) * 100.0 / previous.abs())
}
