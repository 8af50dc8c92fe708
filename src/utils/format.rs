//! User-facing price formatting.
//!
//! Tooltips and axis labels always show the *actual* price, so anything that
//! was multiplied by the series scale factor for plotting is divided back out
//! here before formatting.

use itertools::Itertools;

/// Tiered price formatter.
///
/// Values with at least four leading zero decimals collapse into the compact
/// `0.0(N)digits` notation; everything else gets fixed precision scaled
/// inversely to magnitude, with thousands separators from 10000 up.
pub fn format_price(actual: f64) -> String {
    if !actual.is_finite() || actual == 0.0 {
        return "0".to_string();
    }

    let sign = if actual < 0.0 { "-" } else { "" };
    let av = actual.abs();

    if av < 0.0001 {
        return format!("{sign}{}", format_subzero(av));
    }

    let precision = if av < 0.01 {
        8
    } else if av < 1.0 {
        6
    } else if av < 100.0 {
        4
    } else if av < 1000.0 {
        3
    } else if av < 10_000.0 {
        2
    } else if av < 100_000.0 {
        1
    } else {
        0
    };

    let formatted = format!("{av:.precision$}");
    if av < 10_000.0 {
        return format!("{sign}{formatted}");
    }

    // Thousands separators only above the 10k mark
    match formatted.split_once('.') {
        Some((int_part, frac)) => format!("{sign}{}.{frac}", group_thousands(int_part)),
        None => format!("{sign}{}", group_thousands(&formatted)),
    }
}

/// Divide the plotted value back to the true price, then format it.
pub fn format_plotted_price(plotted: f64, scale_factor: f64) -> String {
    if scale_factor > 0.0 {
        format_price(plotted / scale_factor)
    } else {
        format_price(plotted)
    }
}

/// Compact notation for deeply sub-unit prices: `0.0(N)` followed by up to
/// four significant digits, e.g. 0.00000123 -> "0.0(5)123".
fn format_subzero(av: f64) -> String {
    // {:e} renders the shortest round-trip decimal, so 0.00007 keeps the
    // mantissa "7" instead of the raw binary expansion 6.999...e-5.
    let sci = format!("{av:e}");
    let (mantissa, exp) = match sci.split_once('e') {
        Some((m, e)) => match e.parse::<i32>() {
            Ok(e) if e < 0 => (m, e),
            _ => return "0".to_string(),
        },
        None => return "0".to_string(),
    };

    let zeros = (-exp - 1) as usize;
    let digits: String = mantissa
        .chars()
        .filter(|c| c.is_ascii_digit())
        .take(4)
        .collect::<String>()
        .trim_end_matches('0')
        .to_string();

    if digits.is_empty() {
        return "0".to_string();
    }
    format!("0.0({zeros}){digits}")
}

/// Insert comma separators into a bare digit string.
fn group_thousands(int_part: &str) -> String {
    let reversed: String = int_part
        .chars()
        .rev()
        .chunks(3)
        .into_iter()
        .map(|chunk| chunk.collect::<String>())
        .join(",");
    reversed.chars().rev().collect()
}
