//! Value formatting with magnitude-scaled precision
//!
//! Large values get fewer decimals and small values get more, so a value
//! shown on a dial or card keeps a roughly constant width.

/// Rendered in place of NaN or infinite values
pub const NOT_AVAILABLE: &str = "N/A";

/// Default number of decimals for values in the 100..1000 band
pub const DEFAULT_BASE_PRECISION: usize = 1;

/// Number of decimals used for `value` given a base precision
pub fn precision_for(value: f64, base_precision: usize) -> usize {
    let magnitude = value.abs();
    if magnitude >= 1000.0 {
        base_precision.saturating_sub(1)
    } else if magnitude >= 100.0 {
        base_precision
    } else if magnitude >= 10.0 {
        base_precision + 1
    } else {
        base_precision + 2
    }
}

/// Format a value, choosing decimals from its magnitude
pub fn format_value(value: f64, base_precision: usize) -> String {
    if !value.is_finite() {
        return NOT_AVAILABLE.to_string();
    }
    let precision = precision_for(value, base_precision);
    format!("{:.*}", precision, value)
}

/// Format a value followed by its unit, e.g. `14.20 g/dL`
pub fn format_with_unit(value: f64, unit: &str, base_precision: usize) -> String {
    let formatted = format_value(value, base_precision);
    if unit.is_empty() || formatted == NOT_AVAILABLE {
        formatted
    } else {
        format!("{} {}", formatted, unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precision_bands() {
        assert_eq!(format_value(1234.56, 1), "1235");
        assert_eq!(format_value(123.456, 1), "123.5");
        assert_eq!(format_value(12.346, 1), "12.35");
        assert_eq!(format_value(1.2346, 1), "1.235");
    }

    #[test]
    fn test_zero_and_negative() {
        assert_eq!(format_value(0.0, 1), "0.000");
        assert_eq!(format_value(-5.5, 1), "-5.500");
        assert_eq!(format_value(-250.0, 1), "-250.0");
    }

    #[test]
    fn test_base_precision_zero_does_not_underflow() {
        assert_eq!(format_value(4500.0, 0), "4500");
        assert_eq!(format_value(150.0, 0), "150");
    }

    #[test]
    fn test_non_finite_renders_sentinel() {
        assert_eq!(format_value(f64::NAN, 1), NOT_AVAILABLE);
        assert_eq!(format_value(f64::INFINITY, 1), NOT_AVAILABLE);
        assert_eq!(format_value(f64::NEG_INFINITY, 2), NOT_AVAILABLE);
    }

    #[test]
    fn test_format_with_unit() {
        assert_eq!(format_with_unit(14.2, "g/dL", 1), "14.20 g/dL");
        assert_eq!(format_with_unit(f64::NAN, "g/dL", 1), "N/A");
        assert_eq!(format_with_unit(5.0, "", 1), "5.000");
    }
}
