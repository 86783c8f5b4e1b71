//! Time windows for glucose series
//!
//! Windowing is a plain timestamp cutoff applied before statistics are
//! computed. The anchor time is passed in so filtering stays pure.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::LabGaugeError;
use crate::stats::GlucoseReading;

/// Caller-selected lookback window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TimeWindow {
    #[serde(rename = "1d")]
    OneDay,
    #[serde(rename = "7d")]
    SevenDays,
    #[default]
    #[serde(rename = "14d")]
    FourteenDays,
    #[serde(rename = "30d")]
    ThirtyDays,
    #[serde(rename = "90d")]
    NinetyDays,
}

impl TimeWindow {
    pub const ALL: [TimeWindow; 5] = [
        TimeWindow::OneDay,
        TimeWindow::SevenDays,
        TimeWindow::FourteenDays,
        TimeWindow::ThirtyDays,
        TimeWindow::NinetyDays,
    ];

    pub fn days(self) -> i64 {
        match self {
            TimeWindow::OneDay => 1,
            TimeWindow::SevenDays => 7,
            TimeWindow::FourteenDays => 14,
            TimeWindow::ThirtyDays => 30,
            TimeWindow::NinetyDays => 90,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TimeWindow::OneDay => "1d",
            TimeWindow::SevenDays => "7d",
            TimeWindow::FourteenDays => "14d",
            TimeWindow::ThirtyDays => "30d",
            TimeWindow::NinetyDays => "90d",
        }
    }

    /// Earliest timestamp kept when the window ends at `now`
    pub fn cutoff(self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - Duration::days(self.days())
    }

    /// Readings at or after the cutoff, in their original order
    pub fn filter(self, readings: &[GlucoseReading], now: DateTime<Utc>) -> Vec<GlucoseReading> {
        let cutoff = self.cutoff(now);
        readings
            .iter()
            .filter(|r| r.timestamp >= cutoff)
            .cloned()
            .collect()
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeWindow {
    type Err = LabGaugeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        TimeWindow::ALL
            .into_iter()
            .find(|w| w.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| LabGaugeError::UnknownWindow(s.to_string()))
    }
}
