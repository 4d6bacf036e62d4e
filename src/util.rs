// Utility helpers for parsing, key normalisation and number formatting.
//
// Loader and report code lean on these so the core modules can assume
// clean, typed values and normalised category keys.
use crate::error::{RevenueError, RevenueResult};
use chrono::NaiveDate;
use num_format::{Locale, ToFormattedString};

/// Parse a string-like value into `f64` while being forgiving about
/// formatting issues that are common in spreadsheet exports.
///
/// - Trims whitespace.
/// - Rejects values that contain alphabetic characters.
/// - Strips thousands separators like `","` before parsing.
/// - Returns `None` for anything that cannot be safely parsed.
pub fn parse_f64_safe(s: Option<&str>) -> Option<f64> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    if s.chars().any(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    let s = s.replace(',', "");
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Subscription lengths sometimes arrive as `3.0` from spreadsheet tools.
pub fn parse_u32_safe(s: Option<&str>) -> Option<u32> {
    let v = parse_f64_safe(s)?;
    if v < 0.0 || v.fract() != 0.0 || v > u32::MAX as f64 {
        return None;
    }
    Some(v as u32)
}

pub fn parse_date_safe(s: Option<&str>) -> Option<NaiveDate> {
    // Dates are `YYYY-MM-DD`, optionally followed by a time part which we drop.
    let s = s?.trim();
    if s.len() < 10 {
        return None;
    }
    NaiveDate::parse_from_str(s.get(..10)?, "%Y-%m-%d").ok()
}

/// Canonical form of a categorical key: trimmed, inner whitespace collapsed
/// to single spaces, upper-cased.
pub fn normalize_key(s: &str) -> String {
    s.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
}

pub fn average(v: &[f64]) -> f64 {
    // Arithmetic mean; returns 0 for an empty slice to avoid NaNs.
    if v.is_empty() {
        return 0.0;
    }
    let sum: f64 = v.iter().copied().sum();
    sum / v.len() as f64
}

/// `(current - previous) / previous * 100`.
pub fn percentage_change(current: f64, previous: f64) -> RevenueResult<f64> {
    if previous == 0.0 {
        return Err(RevenueError::Division(format!(
            "percentage change of {} against a zero baseline",
            current
        )));
    }
    Ok((current - previous) / previous * 100.0)
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Fixed decimals with `en` thousands separators, e.g. `1,234,567.89`.
    let neg = n.is_sign_negative() && n != 0.0;
    let s = format!("{:.*}", decimals, n.abs());
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    let int_val: i64 = int_part.parse().unwrap_or(0);
    let mut res = int_val.to_formatted_string(&Locale::en);
    if let Some(frac) = frac_part {
        if decimals > 0 {
            res.push('.');
            res.push_str(frac);
        }
    }
    if neg {
        format!("-{}", res)
    } else {
        res
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(&Locale::en)
}

/// `Rp 1,234.56`
pub fn format_rupiah(n: f64) -> String {
    format!("Rp {}", format_number(n, 2))
}

/// `Rp 9,881.05M`
pub fn format_rupiah_million(n: f64) -> String {
    format!("Rp {}M", format_number(n / 1_000_000.0, 2))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_thousands_separators() {
        assert_eq!(parse_f64_safe(Some(" 140,000 ")), Some(140000.0));
        assert_eq!(parse_f64_safe(Some("Rp 5")), None);
        assert_eq!(parse_f64_safe(Some("")), None);
        assert_eq!(parse_f64_safe(None), None);
    }

    #[test]
    fn parses_whole_subscription_lengths_only() {
        assert_eq!(parse_u32_safe(Some("3")), Some(3));
        assert_eq!(parse_u32_safe(Some("3.0")), Some(3));
        assert_eq!(parse_u32_safe(Some("2.5")), None);
        assert_eq!(parse_u32_safe(Some("-1")), None);
    }

    #[test]
    fn date_time_suffix_is_ignored() {
        let d = NaiveDate::from_ymd_opt(2023, 4, 17).unwrap();
        assert_eq!(parse_date_safe(Some("2023-04-17")), Some(d));
        assert_eq!(parse_date_safe(Some("2023-04-17 00:00:00")), Some(d));
        assert_eq!(parse_date_safe(Some("17/04/2023")), None);
    }

    #[test]
    fn keys_are_trimmed_collapsed_and_upper_cased() {
        assert_eq!(normalize_key("  iconnet   10 Mbps "), "ICONNET 10 MBPS");
        assert_eq!(normalize_key("Bali"), normalize_key("BALI"));
    }

    #[test]
    fn percentage_change_guards_zero_baseline() {
        assert_eq!(percentage_change(150.0, 100.0).unwrap(), 50.0);
        assert!(matches!(
            percentage_change(1.0, 0.0),
            Err(RevenueError::Division(_))
        ));
    }

    #[test]
    fn formats_currency() {
        assert_eq!(format_number(1234567.891, 2), "1,234,567.89");
        assert_eq!(format_number(-42.5, 1), "-42.5");
        assert_eq!(format_rupiah(913700.0), "Rp 913,700.00");
        assert_eq!(format_rupiah_million(9_881_050_833.0), "Rp 9,881.05M");
    }
}
