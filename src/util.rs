// Utility helpers for parsing and number formatting.
//
// This module centralizes all the "dirty" cell handling so the rest of the
// code can assume clean, typed values. Every helper here is forgiving: bad
// input becomes `None`, never a panic or an error.
use num_format::{Locale, ToFormattedString};
use std::io::BufRead;

/// Parse a string-like cell into `f64`.
///
/// - Accepts `Option<&str>` so callers can pass through optional fields.
/// - Trims whitespace.
/// - Returns `None` for empty, unparseable or non-finite values (`NaN`, `inf`).
///
/// Thousands separators are *not* stripped: `"1,000"` is not a number here,
/// matching how the spreadsheet exports are coerced upstream.
pub fn parse_f64_safe(s: Option<&str>) -> Option<f64> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse an integer that may have been written as a float (`"2024.0"`).
///
/// The fractional part is truncated toward zero, like a float-to-int cast.
pub fn parse_whole_number(s: Option<&str>) -> Option<i64> {
    let v = parse_f64_safe(s)?.trunc();
    if v < i64::MIN as f64 || v > i64::MAX as f64 {
        return None;
    }
    Some(v as i64)
}

/// Treat empty or whitespace-only text as a missing value.
pub fn non_blank(s: Option<String>) -> Option<String> {
    s.filter(|v| !v.trim().is_empty())
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Format a floating-point value with:
    // - a fixed number of decimal places, and
    // - locale-aware thousands separators (e.g., `1,234,567.89`).
    let neg = n.is_sign_negative();
    let abs_n = n.abs();
    let s = format!("{:.*}", decimals, abs_n);
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

/// `1,500 THB` style amount: thousands separated, no decimals.
pub fn format_currency(n: f64, label: &str) -> String {
    format!("{} {}", format_number(n, 0), label)
}

/// Whole-number part of `|n|` with thousands separators (`-1234.9` -> `1,234`).
pub fn format_truncated_abs(n: f64) -> String {
    format_int(n.abs().trunc() as i64)
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(&Locale::en)
}

/// Read one line and trim it. `None` once the input is closed or unreadable.
pub fn read_trimmed_line<R: BufRead>(reader: &mut R) -> Option<String> {
    let mut buf = String::new();
    match reader.read_line(&mut buf) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(buf.trim().to_string()),
    }
}
