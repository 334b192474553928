//! Number <-> text conversions shared by the evaluator and the mapping layer.

/// Largest magnitude that still renders as a plain integer.
const INTEGER_DISPLAY_LIMIT: f64 = 1e15;

/// Fixed number of decimals used before trailing zeros are trimmed.
const DISPLAY_DECIMALS: usize = 10;

/// Render a number the way it is substituted into documents.
///
/// Integral values print without a decimal point; everything else prints with a fixed number of
/// decimals and then drops trailing zeros, so `1100.0` renders as `1100` and `0.1 + 0.2` renders
/// as `0.3`.
pub fn format_number(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value.is_sign_negative() { "-inf" } else { "inf" }.to_string();
    }
    if value.fract() == 0.0 && value.abs() < INTEGER_DISPLAY_LIMIT {
        let out = format!("{value:.0}");
        return normalize_negative_zero(out);
    }

    let mut out = format!("{:.*}", DISPLAY_DECIMALS, value);
    if out.contains('.') {
        let trimmed_len = out.trim_end_matches('0').trim_end_matches('.').len();
        out.truncate(trimmed_len);
    }
    normalize_negative_zero(out)
}

fn normalize_negative_zero(out: String) -> String {
    if out == "-0" {
        "0".to_string()
    } else {
        out
    }
}

/// Parse cell text as a number.
///
/// Surrounding whitespace is ignored and `,` is accepted as a thousands separator. Empty text is
/// *not* numeric here; callers that want "empty means zero" handle that case themselves.
pub fn parse_number_text(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    let parsed = if trimmed.contains(',') {
        trimmed.replace(',', "").parse::<f64>().ok()
    } else {
        trimmed.parse::<f64>().ok()
    };

    // `f64::from_str` accepts `inf` / `NaN` spellings, which are words in a spreadsheet cell.
    parsed.filter(|n| n.is_finite())
}

/// How far below one half a scaled fraction may sit and still count as a half.
///
/// Decimal halves such as `1.005` are stored slightly below the half in binary; without the
/// tolerance `round(1.005, 2)` would give `1.0`.
const HALF_TOLERANCE: f64 = 1e-9;

/// Round `n` to `digits` decimal places, halves away from zero.
///
/// Negative `digits` round to the left of the decimal point (`round(1250, -2) == 1300`). When
/// scaling by `10^digits` leaves the finite range, `n` already has no digits to drop and is
/// returned unchanged.
pub fn round_half_away(n: f64, digits: i32) -> f64 {
    if !n.is_finite() {
        return n;
    }
    let factor = 10f64.powi(digits.saturating_abs());
    let scaled = if digits >= 0 { n * factor } else { n / factor };
    if !factor.is_finite() || factor == 0.0 || !scaled.is_finite() {
        return n;
    }

    let magnitude = scaled.abs();
    let whole = magnitude.trunc();
    let rounded_magnitude = if magnitude - whole >= 0.5 - HALF_TOLERANCE {
        whole + 1.0
    } else {
        whole
    };
    let rounded = rounded_magnitude.copysign(scaled);

    if digits >= 0 {
        rounded / factor
    } else {
        rounded * factor
    }
}

/// Render `value` with exactly `decimals` fractional digits, optionally grouping the integer part
/// in thousands with `,`.
pub fn format_fixed(value: f64, decimals: usize, group_thousands: bool) -> String {
    let rounded = round_half_away(value, decimals as i32);
    let rendered = format!("{:.*}", decimals, rounded.abs());
    let (int_part, frac_part) = match rendered.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (rendered.as_str(), None),
    };

    let mut out = String::with_capacity(rendered.len() + rendered.len() / 3 + 1);
    let is_zero = rounded == 0.0;
    if rounded.is_sign_negative() && !is_zero {
        out.push('-');
    }
    if group_thousands {
        push_grouped(&mut out, int_part);
    } else {
        out.push_str(int_part);
    }
    if let Some(frac_part) = frac_part {
        out.push('.');
        out.push_str(frac_part);
    }
    out
}

fn push_grouped(out: &mut String, digits: &str) {
    let len = digits.len();
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (len - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn integral_values_have_no_decimal_point() {
        assert_eq!(format_number(1100.0), "1100");
        assert_eq!(format_number(-3.0), "-3");
        assert_eq!(format_number(-0.0), "0");
    }

    #[test]
    fn fractional_values_trim_trailing_zeros() {
        assert_eq!(format_number(1.5), "1.5");
        assert_eq!(format_number(0.1 + 0.2), "0.3");
        assert_eq!(format_number(-0.00000000001), "0");
    }

    #[test]
    fn parses_grouped_and_padded_numbers() {
        assert_eq!(parse_number_text(" 1,234.5 "), Some(1234.5));
        assert_eq!(parse_number_text("1e3"), Some(1000.0));
        assert_eq!(parse_number_text(""), None);
        assert_eq!(parse_number_text("abc"), None);
        assert_eq!(parse_number_text("inf"), None);
    }

    #[test]
    fn rounds_halves_away_from_zero() {
        assert_eq!(round_half_away(2.5, 0), 3.0);
        assert_eq!(round_half_away(-2.5, 0), -3.0);
        assert_eq!(round_half_away(1.234, 2), 1.23);
        assert_eq!(round_half_away(1250.0, -2), 1300.0);
    }

    #[test]
    fn rounding_survives_scale_overflow_and_binary_halves() {
        assert_eq!(round_half_away(1e10, 300), 1e10);
        assert_eq!(round_half_away(-1e10, 400), -1e10);
        assert_eq!(round_half_away(1e300, -400), 1e300);
        assert_eq!(round_half_away(1.005, 2), 1.01);
        assert_eq!(round_half_away(-1.005, 2), -1.01);
        assert_eq!(round_half_away(2.675, 2), 2.68);
        assert_eq!(round_half_away(0.1 + 0.2, 1), 0.3);
    }

    #[test]
    fn fixed_format_groups_thousands() {
        assert_eq!(format_fixed(1234567.891, 2, true), "1,234,567.89");
        assert_eq!(format_fixed(-1234.5, 0, true), "-1,235");
        assert_eq!(format_fixed(999.0, 2, false), "999.00");
        assert_eq!(format_fixed(-0.001, 2, true), "0.00");
    }
}
