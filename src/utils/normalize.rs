//! Canonicalization of API-supplied numbers.
//!
//! The graph API serves price fields as JSON numbers or as strings, often in
//! scientific notation for micro-cap tokens. Everything entering the engine
//! passes through [`normalize`] first, and a per-series scale factor keeps
//! the rendering surface's tick generator away from sub-unit magnitudes.

use serde::Deserialize;

use crate::config::CHART;

/// A wire-level numeric field: JSON number or numeric string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawNumber {
    Num(f64),
    Str(String),
}

impl RawNumber {
    /// Parse and normalize in one step.
    pub fn normalized(&self) -> f64 {
        match self {
            RawNumber::Num(v) => normalize(*v),
            RawNumber::Str(s) => normalize_str(s),
        }
    }
}

/// Canonicalize a plain numeric value: 0 for anything non-finite or within
/// the sub-1e-10 clamp window, unchanged otherwise. Idempotent.
pub fn normalize(value: f64) -> f64 {
    if !value.is_finite() || value.abs() < CHART.zero_clamp {
        0.0
    } else {
        value
    }
}

/// Canonicalize a string-typed numeric field.
///
/// Scientific literals with an exponent below -10 are re-rendered at a
/// bounded precision (`min(|exp| + 2, 20)` decimals) and re-parsed, which
/// sheds the round-off the float carries at those magnitudes. The clamp is
/// applied last, so a re-rendered value that is still below 1e-10 comes out
/// as 0.
pub fn normalize_str(raw: &str) -> f64 {
    let trimmed = raw.trim();
    let parsed: f64 = match trimmed.parse() {
        Ok(v) => v,
        Err(_) => return 0.0,
    };

    let value = match scientific_exponent(trimmed) {
        Some(exp) if exp < -10 => {
            let precision = (exp.unsigned_abs() as usize + 2).min(20);
            format!("{parsed:.precision$}").parse().unwrap_or(0.0)
        }
        _ => parsed,
    };

    normalize(value)
}

/// Exponent of a scientific literal (`"1.2e-12"` -> -12), or None for plain
/// decimal notation.
fn scientific_exponent(literal: &str) -> Option<i32> {
    let lower = literal.to_ascii_lowercase();
    let (_, exp) = lower.split_once('e')?;
    exp.parse().ok()
}

/// Smallest power-of-ten multiplier that lifts `max_magnitude` into a range
/// the rendering surface's automatic tick placement copes with. One tier per
/// decade, from 1e12 for sub-nano prices down to 1 for anything >= 1 unit.
/// Recomputed only on full series replacement, never on incremental updates.
pub fn compute_scale_factor(max_magnitude: f64) -> f64 {
    if !max_magnitude.is_finite() || max_magnitude <= 0.0 {
        return 1.0;
    }

    const TIERS: &[(f64, f64)] = &[
        (1e-9, 1e12),
        (1e-8, 1e11),
        (1e-7, 1e10),
        (1e-6, 1e9),
        (1e-5, 1e8),
        (1e-4, 1e7),
        (1e-3, 1e6),
        (1e-2, 1e5),
        (1e-1, 1e4),
        (1.0, 1e3),
    ];

    for &(threshold, factor) in TIERS {
        if max_magnitude < threshold {
            return factor;
        }
    }
    1.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_clamps_tiny_and_non_finite() {
        assert_eq!(normalize(5e-11), 0.0);
        assert_eq!(normalize(-5e-11), 0.0);
        assert_eq!(normalize(f64::NAN), 0.0);
        assert_eq!(normalize(f64::INFINITY), 0.0);
        assert_eq!(normalize(1.5), 1.5);
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for &x in &[0.0, 1.0, -3.25, 5e-11, 1e-10, 0.00007, 42_000.5] {
            assert_eq!(normalize(normalize(x)), normalize(x));
        }
    }

    #[test]
    fn test_normalize_str_scientific_below_clamp() {
        // Literal fixture: deep scientific notation lands in the clamp window
        assert_eq!(normalize_str("1.2e-12"), 0.0);
    }

    #[test]
    fn test_normalize_str_scientific_above_clamp() {
        // Exponent < -10 in the literal, but magnitude above the clamp:
        // value survives the re-render at bounded precision
        let v = normalize_str("123.4e-12");
        assert!((v - 1.234e-10).abs() < 1e-16);
    }

    #[test]
    fn test_normalize_str_plain_and_garbage() {
        assert_eq!(normalize_str("1.55"), 1.55);
        assert_eq!(normalize_str(" 2.0 "), 2.0);
        assert_eq!(normalize_str("not-a-number"), 0.0);
    }

    #[test]
    fn test_raw_number_both_variants() {
        assert_eq!(RawNumber::Num(2.5).normalized(), 2.5);
        assert_eq!(RawNumber::Str("2.5".to_string()).normalized(), 2.5);
    }

    #[test]
    fn test_scale_factor_tiers() {
        // Literal fixture from the platform contract
        assert_eq!(compute_scale_factor(0.00007), 10_000_000.0);

        assert_eq!(compute_scale_factor(5e-10), 1e12);
        assert_eq!(compute_scale_factor(5e-6), 1e8);
        assert_eq!(compute_scale_factor(0.5), 1e3);
    }

    #[test]
    fn test_scale_factor_is_one_at_or_above_unit() {
        for &m in &[1.0, 1.5, 100.0, 68_000.0] {
            assert_eq!(compute_scale_factor(m), 1.0);
        }
    }

    #[test]
    fn test_scale_factor_degenerate_inputs() {
        assert_eq!(compute_scale_factor(0.0), 1.0);
        assert_eq!(compute_scale_factor(-1.0), 1.0);
        assert_eq!(compute_scale_factor(f64::NAN), 1.0);
    }
}
