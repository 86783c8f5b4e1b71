//! Pie segmentation of a differential (e.g. white-cell percentages)

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::gauge::{ArcSpec, GaugeLayout};

/// One named share of a differential
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DifferentialPart {
    pub name: String,
    pub percent: f64,
}

impl DifferentialPart {
    pub fn new(name: impl Into<String>, percent: f64) -> Self {
        Self {
            name: name.into(),
            percent,
        }
    }
}

/// One pie slice, produced fresh per call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PieSegment {
    pub name: String,
    pub start_angle_deg: f64,
    pub end_angle_deg: f64,
    pub path_data: String,
}

impl PieSegment {
    pub fn sweep_deg(&self) -> f64 {
        self.end_angle_deg - self.start_angle_deg
    }

    /// Share of the whole pie as a percentage
    pub fn share_percent(&self) -> f64 {
        self.sweep_deg() / 360.0 * 100.0
    }
}

/// Negative and non-finite shares contribute nothing
fn usable_percent(percent: f64) -> f64 {
    if percent.is_finite() && percent > 0.0 {
        percent
    } else {
        0.0
    }
}

/// Segment a differential using the default layout
pub fn segment(parts: &[DifferentialPart]) -> Vec<PieSegment> {
    segment_with(parts, GaugeLayout::default())
}

/// Split a differential into consecutive slices, one per part, in the given order
///
/// Shares are normalized by their total, so the parts need not sum to 100.
/// Zero-width slices are kept so callers can key legend entries by name.
pub fn segment_with(parts: &[DifferentialPart], layout: GaugeLayout) -> Vec<PieSegment> {
    // scale by the largest share first so the sum stays finite near f64::MAX
    let largest = parts
        .iter()
        .map(|p| usable_percent(p.percent))
        .fold(0.0, f64::max);
    let total: f64 = if largest > 0.0 {
        parts.iter().map(|p| usable_percent(p.percent) / largest).sum()
    } else {
        0.0
    };
    if total <= 0.0 && !parts.is_empty() {
        warn!("Differential has no positive share, emitting empty slices");
    }

    let mut current_angle = 0.0;
    let segments: Vec<PieSegment> = parts
        .iter()
        .map(|part| {
            let share = if total > 0.0 {
                usable_percent(part.percent) / largest / total
            } else {
                0.0
            };
            let start = current_angle;
            let end = start + share * 360.0;
            current_angle = end;

            let arc = ArcSpec::new(layout.cx, layout.cy, layout.radius, start, end);
            PieSegment {
                name: part.name.clone(),
                start_angle_deg: start,
                end_angle_deg: end,
                path_data: arc.to_wedge(),
            }
        })
        .collect();

    debug!("segmented {} parts (largest share {:.2})", segments.len(), largest);
    segments
}
