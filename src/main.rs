//! labgauge command line
//!
//! Usage:
//!   labgauge classify <value> <low> <high> [previous] [--lower-is-better]
//!   labgauge pie <differential.json>
//!   labgauge tir <readings.json> [window]
//!   labgauge path
//!   LABGAUGE_DBG=1 labgauge ... - Enable debug output

use std::env;
use std::fs;

use chrono::Utc;
use log::{info, warn};
use serde::Serialize;

use labgauge::config::{config_file_path, ensure_data_dir, get_data_dir, Config};
use labgauge::error::LabGaugeError;
use labgauge::pie::{segment_with, DifferentialPart};
use labgauge::stats::{time_in_range, GlucoseBands, GlucoseReading, SeriesSummary, TimeInRangeStats};
use labgauge::{LabValue, ReferenceRange, TimeWindow};

/// Everything printed by `labgauge tir`
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TirReport {
    window: TimeWindow,
    target: ReferenceRange,
    stats: TimeInRangeStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<SeriesSummary>,
    bands: GlucoseBands,
    #[serde(skip_serializing_if = "Option::is_none")]
    gmi: Option<f64>,
}

fn main() -> Result<(), LabGaugeError> {
    let args: Vec<String> = env::args().collect();

    // Check for debug mode
    let debug_mode = env::var("LABGAUGE_DBG").is_ok();

    // Initialize logger
    if debug_mode {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
            .format_timestamp(None)
            .init();
    }

    if let Err(e) = ensure_data_dir() {
        warn!("Could not create data directory: {}", e);
    }

    let cfg_path = config_file_path();
    if !cfg_path.exists() {
        if let Err(e) = Config::create_default(&cfg_path) {
            warn!("Could not create default config: {}", e);
        }
    }

    // Try loading config from data directory first, then current directory
    let config = Config::load(&cfg_path)
        .or_else(|_| Config::load("config.txt"))
        .unwrap_or_else(|e| {
            warn!("Could not load config: {}. Using defaults.", e);
            Config::default()
        });

    match args.get(1).map(|s| s.as_str()) {
        Some("classify") => cmd_classify(&config, &args[2..])?,
        Some("pie") => cmd_pie(&config, &args[2..])?,
        Some("tir") => cmd_tir(&config, &args[2..])?,
        Some("path") | Some("paths") => cmd_show_paths(),
        Some("--version") | Some("-V") => {
            println!("labgauge {}", env!("CARGO_PKG_VERSION"));
        }
        Some("--help") | Some("-h") | Some("help") | None => print_help(),
        Some(other) => {
            print_help();
            return Err(LabGaugeError::Usage(format!("unknown command: {}", other)));
        }
    }

    Ok(())
}

fn parse_number(label: &str, text: &str) -> Result<f64, LabGaugeError> {
    text.parse()
        .map_err(|_| LabGaugeError::Usage(format!("{} is not a number: {}", label, text)))
}

fn print_json<T: Serialize>(value: &T) -> Result<(), LabGaugeError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Classify a single value
fn cmd_classify(config: &Config, args: &[String]) -> Result<(), LabGaugeError> {
    let lower_is_better = args.iter().any(|a| a == "--lower-is-better");
    let positional: Vec<&String> = args.iter().filter(|a| !a.starts_with("--")).collect();
    if positional.len() < 3 {
        return Err(LabGaugeError::Usage(
            "classify needs <value> <low> <high> [previous]".to_string(),
        ));
    }

    let value = parse_number("value", positional[0])?;
    let range = ReferenceRange::try_new(
        parse_number("low", positional[1])?,
        parse_number("high", positional[2])?,
    )?;
    let mut lab = LabValue::new(value, "", range);
    if let Some(prev) = positional.get(3) {
        lab = lab.with_previous(parse_number("previous", prev)?);
    }

    let result = lab.interpret(&config.interpret_options(lower_is_better));
    info!("{} -> {:?} / {:?}", value, result.status, result.trend);
    print_json(&result)
}

/// Segment a differential read from a JSON file
fn cmd_pie(config: &Config, args: &[String]) -> Result<(), LabGaugeError> {
    let path = args
        .first()
        .ok_or_else(|| LabGaugeError::Usage("pie needs <differential.json>".to_string()))?;
    let parts: Vec<DifferentialPart> = serde_json::from_str(&fs::read_to_string(path)?)?;

    let segments = segment_with(&parts, config.gauge_layout());
    info!("Segmented {} parts from {}", segments.len(), path);
    print_json(&segments)
}

/// Time-in-range report for a reading series read from a JSON file
fn cmd_tir(config: &Config, args: &[String]) -> Result<(), LabGaugeError> {
    let path = args
        .first()
        .ok_or_else(|| LabGaugeError::Usage("tir needs <readings.json> [window]".to_string()))?;
    let window = match args.get(1) {
        Some(w) => w.parse()?,
        None => config.window,
    };

    let readings: Vec<GlucoseReading> = serde_json::from_str(&fs::read_to_string(path)?)?;
    let windowed = window.filter(&readings, Utc::now());
    info!(
        "Loaded {} readings, {} within {}",
        readings.len(),
        windowed.len(),
        window
    );

    let stats = time_in_range(&windowed, config.target);
    let report = TirReport {
        window,
        target: config.target,
        gmi: stats.gmi(),
        summary: SeriesSummary::from_readings(&windowed),
        bands: GlucoseBands::from_readings(&windowed, config.target),
        stats,
    };
    if report.stats.insufficient_data {
        eprintln!("Not enough data in the last {} for variability metrics", window);
    }
    print_json(&report)
}

/// Show data paths
fn cmd_show_paths() {
    println!("labgauge paths:");
    println!("  Data directory:  {}", get_data_dir().display());
    println!("  Config file:     {}", config_file_path().display());
}

fn print_help() {
    eprintln!("labgauge v{}", env!("CARGO_PKG_VERSION"));
    eprintln!();
    eprintln!("USAGE:");
    eprintln!("  labgauge classify <value> <low> <high> [previous] [--lower-is-better]");
    eprintln!("  labgauge pie <differential.json>     Pie slices for [{{name, percent}}]");
    eprintln!("  labgauge tir <readings.json> [win]   Time in range (win: 1d|7d|14d|30d|90d)");
    eprintln!("  labgauge path                        Show data file locations");
    eprintln!("  labgauge help                        Show this help");
    eprintln!();
    eprintln!("ENVIRONMENT:");
    eprintln!("  LABGAUGE_DBG=1                       Enable debug output");
    eprintln!();
    eprintln!("CONFIG:");
    eprintln!("  {}", config_file_path().display());
}
