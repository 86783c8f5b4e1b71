//! Circular gauge geometry
//!
//! Angles are in degrees with 0° at 12 o'clock, increasing clockwise on
//! screen. Every arc the engine draws runs from its end angle back to its
//! start angle with the SVG sweep flag cleared, so all arcs share one
//! direction.

use std::f64::consts::PI;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::range::ReferenceRange;

/// Largest sweep drawn as a single arc; a full 360° arc has coincident
/// endpoints and renders as nothing.
pub const MAX_ARC_SWEEP_DEG: f64 = 359.99;

/// A point in SVG user space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Convert polar coordinates to Cartesian, with 0° at the top of the circle
pub fn polar_to_cartesian(cx: f64, cy: f64, radius: f64, angle_deg: f64) -> Point {
    let rad = (angle_deg - 90.0) * PI / 180.0;
    Point {
        x: cx + radius * rad.cos(),
        y: cy + radius * rad.sin(),
    }
}

/// SVG large-arc flag for a sweep of `sweep_deg`
pub fn large_arc_flag(sweep_deg: f64) -> u8 {
    if sweep_deg > 180.0 {
        1
    } else {
        0
    }
}

/// Format a coordinate for path data
pub(crate) fn fmt_coord(v: f64) -> String {
    let s = format!("{:.2}", v);
    if s == "-0.00" {
        "0.00".to_string()
    } else {
        s
    }
}

/// Resolved endpoints and flags of a circular arc
#[derive(Debug, Clone, Copy)]
pub(crate) struct ArcSpec {
    pub cx: f64,
    pub cy: f64,
    pub radius: f64,
    /// Point at the end angle, where drawing begins
    pub from: Point,
    /// Point at the start angle, where drawing ends
    pub to: Point,
    pub large_arc: u8,
}

impl ArcSpec {
    pub fn new(cx: f64, cy: f64, radius: f64, start_angle_deg: f64, end_angle_deg: f64) -> Self {
        let sweep = (end_angle_deg - start_angle_deg).clamp(0.0, MAX_ARC_SWEEP_DEG);
        let end = start_angle_deg + sweep;
        Self {
            cx,
            cy,
            radius,
            from: polar_to_cartesian(cx, cy, radius, end),
            to: polar_to_cartesian(cx, cy, radius, start_angle_deg),
            large_arc: large_arc_flag(sweep),
        }
    }

    fn arc_command(&self) -> String {
        format!(
            "A {r} {r} 0 {large} 0 {x} {y}",
            r = fmt_coord(self.radius),
            large = self.large_arc,
            x = fmt_coord(self.to.x),
            y = fmt_coord(self.to.y),
        )
    }

    /// Open arc path, for progress rings
    pub fn to_path(&self) -> String {
        format!(
            "M {} {} {}",
            fmt_coord(self.from.x),
            fmt_coord(self.from.y),
            self.arc_command()
        )
    }

    /// Closed center-to-arc wedge, for pie slices
    pub fn to_wedge(&self) -> String {
        format!(
            "M {} {} L {} {} {} Z",
            fmt_coord(self.cx),
            fmt_coord(self.cy),
            fmt_coord(self.from.x),
            fmt_coord(self.from.y),
            self.arc_command()
        )
    }
}

/// SVG path data for an arc between two angles
pub fn arc_path(cx: f64, cy: f64, radius: f64, start_angle_deg: f64, end_angle_deg: f64) -> String {
    ArcSpec::new(cx, cy, radius, start_angle_deg, end_angle_deg).to_path()
}

/// Fractional position of `value` within `[min, max]`, clamped to `[0, 1]`
pub fn position(value: f64, min: f64, max: f64) -> f64 {
    if value.is_nan() || min.is_nan() || max.is_nan() {
        return 0.0;
    }
    let span = max - min;
    if !span.is_finite() || span <= 0.0 {
        return if value < min {
            0.0
        } else if value > max {
            1.0
        } else {
            0.5
        };
    }
    ((value - min) / span).clamp(0.0, 1.0)
}

/// Center and radius of a circular gauge
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GaugeLayout {
    pub cx: f64,
    pub cy: f64,
    pub radius: f64,
}

impl Default for GaugeLayout {
    fn default() -> Self {
        Self {
            cx: 50.0,
            cy: 50.0,
            radius: 45.0,
        }
    }
}

impl GaugeLayout {
    pub fn with_radius(radius: f64) -> Self {
        Self {
            cx: radius + 5.0,
            cy: radius + 5.0,
            radius,
        }
    }

    pub fn circumference(&self) -> f64 {
        2.0 * PI * self.radius
    }
}

/// Geometry of a progress ring for one value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GaugeGeometry {
    pub fractional_position: f64,
    pub stroke_dash_offset: f64,
    pub arc_path_data: String,
}

impl GaugeGeometry {
    /// Place `value` on a dial covering `[min, max]`
    pub fn from_window(value: f64, min: f64, max: f64, layout: GaugeLayout) -> Self {
        let fraction = position(value, min, max);
        let circumference = layout.circumference();
        let geometry = Self {
            fractional_position: fraction,
            stroke_dash_offset: circumference - fraction * circumference,
            arc_path_data: arc_path(layout.cx, layout.cy, layout.radius, 0.0, fraction * 360.0),
        };
        debug!("gauge {} in [{}, {}] -> fraction {:.3}", value, min, max, fraction);
        geometry
    }

    /// Place `value` on a dial spanning its reference range widened by 30% each side
    pub fn for_value(value: f64, range: ReferenceRange, layout: GaugeLayout) -> Self {
        let window = range.gauge_window();
        Self::from_window(value, window.low, window.high, layout)
    }
}
