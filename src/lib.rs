//! Lab value interpretation and widget geometry
//!
//! Classifies results against reference ranges, tracks trends against a
//! previous result, and produces the numbers a rendering layer needs for
//! dials, differential pies and glucose time-in-range cards. Everything is
//! pure and synchronous; faulty inputs degrade to documented fallbacks
//! rather than errors.

pub mod config;
pub mod error;
pub mod format;
pub mod gauge;
pub mod lab;
pub mod pie;
pub mod range;
pub mod stats;
pub mod status;
pub mod tooltip;
pub mod trend;
pub mod window;

pub use error::LabGaugeError;
pub use format::format_value;
pub use gauge::{arc_path, polar_to_cartesian, position, GaugeGeometry, GaugeLayout};
pub use lab::{InterpretOptions, LabInterpretation, LabValue};
pub use pie::{segment, DifferentialPart, PieSegment};
pub use range::ReferenceRange;
pub use stats::{time_in_range, GlucoseReading, TimeInRangeStats};
pub use status::{classify, classify_with, Status};
pub use trend::{trend, TrendAnalyzer, TrendDirection};
pub use window::TimeWindow;
