//! Configuration file parsing

use std::fs::{self, File};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use log::warn;

use crate::error::LabGaugeError;
use crate::format::DEFAULT_BASE_PRECISION;
use crate::gauge::GaugeLayout;
use crate::lab::InterpretOptions;
use crate::range::ReferenceRange;
use crate::status::DEFAULT_BORDERLINE_FRACTION;
use crate::trend::DEFAULT_STABLE_THRESHOLD;
use crate::window::TimeWindow;

const DEFAULT_CONFIG: &str = "\
# labgauge configuration
# Format: key value  (anything after # is ignored)

# Share of the reference span flagged as borderline at each edge
borderline_fraction 0.1

# Decimals for values between 100 and 1000
base_precision 1

# Relative change below which a trend is stable
trend_threshold 0.05

# Glucose target band in mg/dL
target_low 70
target_high 180

# Default time-in-range window: 1d, 7d, 14d, 30d or 90d
window 14d

# Dial radius in SVG user units
gauge_radius 45
";

/// Configuration loaded from config.txt
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub borderline_fraction: f64,
    pub base_precision: usize,
    pub trend_threshold: f64,
    pub target: ReferenceRange,
    pub window: TimeWindow,
    pub gauge_radius: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            borderline_fraction: DEFAULT_BORDERLINE_FRACTION,
            base_precision: DEFAULT_BASE_PRECISION,
            trend_threshold: DEFAULT_STABLE_THRESHOLD,
            target: ReferenceRange::new(70.0, 180.0),
            window: TimeWindow::default(),
            gauge_radius: GaugeLayout::default().radius,
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, LabGaugeError> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self, LabGaugeError> {
        let mut config = Config::default();
        let mut target_low = config.target.low;
        let mut target_high = config.target.high;

        for line in reader.lines() {
            let line = line?;

            // Skip empty lines and comments
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            // Parse "key value" or "key value # comment"
            let Some((key, rest)) = Self::parse_line(line) else {
                warn!("Ignoring malformed config line: {}", line);
                continue;
            };
            let value = rest.split('#').next().unwrap_or("").trim();

            match key {
                "borderline_fraction" => config.borderline_fraction = parse_value(key, value)?,
                "base_precision" => config.base_precision = parse_value(key, value)?,
                "trend_threshold" => config.trend_threshold = parse_value(key, value)?,
                "target_low" => target_low = parse_value(key, value)?,
                "target_high" => target_high = parse_value(key, value)?,
                "window" => config.window = value.parse()?,
                "gauge_radius" => config.gauge_radius = parse_value(key, value)?,
                _ => warn!("Unknown config key: {}", key),
            }
        }

        config.target = ReferenceRange::try_new(target_low, target_high)?;
        Ok(config)
    }

    /// Parse a single config line, returning (key, value)
    fn parse_line(line: &str) -> Option<(&str, &str)> {
        // Find first whitespace to separate key from value
        let mut parts = line.splitn(2, |c: char| c.is_whitespace());
        let key = parts.next()?.trim();
        let value = parts.next()?.trim();

        if key.is_empty() || value.is_empty() {
            return None;
        }

        Some((key, value))
    }

    /// Write the commented default configuration
    pub fn create_default<P: AsRef<Path>>(path: P) -> Result<(), LabGaugeError> {
        let mut file = File::create(path)?;
        file.write_all(DEFAULT_CONFIG.as_bytes())?;
        Ok(())
    }

    pub fn gauge_layout(&self) -> GaugeLayout {
        GaugeLayout::with_radius(self.gauge_radius)
    }

    pub fn interpret_options(&self, lower_is_better: bool) -> InterpretOptions {
        InterpretOptions {
            borderline_fraction: self.borderline_fraction,
            stable_threshold: self.trend_threshold,
            lower_is_better,
            base_precision: self.base_precision,
            layout: self.gauge_layout(),
        }
    }
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T, LabGaugeError> {
    value
        .parse()
        .map_err(|_| LabGaugeError::Config(format!("invalid value for {}: {}", key, value)))
}

/// Directory holding labgauge's files
pub fn get_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("labgauge")
}

pub fn config_file_path() -> PathBuf {
    get_data_dir().join("config.txt")
}

pub fn ensure_data_dir() -> Result<(), LabGaugeError> {
    fs::create_dir_all(get_data_dir())?;
    Ok(())
}
