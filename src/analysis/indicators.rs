//! Pure indicator computation over ordered candle columns.
//!
//! Every function here is total: inputs shorter than the lookback yield an
//! empty vector, never a panic. Callers pass the time column plus whichever
//! value column applies (`close` for candles, the point value for line data).
//!
//! RSI note: the platform historically shipped two RSI variants that
//! disagreed on zero-valued deltas (tooltip counted them as gains, overlay
//! discarded them). This module is the single canonical implementation and
//! follows Wilder's original rule: a zero delta contributes to neither the
//! gain nor the loss bucket.

use argminmax::ArgMinMax;
use statrs::statistics::Statistics;

/// Ratios for the retracement grid, min-low to max-high.
pub const FIB_RATIOS: [f64; 7] = [0.0, 0.236, 0.382, 0.5, 0.618, 0.786, 1.0];

/// One point of a single-valued indicator series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorPoint {
    pub time: i64,
    pub value: f64,
}

/// One point of a banded indicator series (Bollinger).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandPoint {
    pub time: i64,
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
}

/// A flat retracement line: two endpoints at the series' first and last
/// timestamps. Drawn as a straight reference line, not stepped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FibLevel {
    pub ratio: f64,
    pub value: f64,
    pub points: [IndicatorPoint; 2],
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AthSummary {
    pub ath: f64,
    /// Signed distance of the last close from the ATH, rounded to 2 dp.
    pub percent_from_ath: f64,
}

/// Simple moving average. Output aligns to `times[period - 1..]`, so the
/// length is `len - period + 1`.
pub fn sma(times: &[i64], values: &[f64], period: usize) -> Vec<IndicatorPoint> {
    if period == 0 || values.len() < period || times.len() != values.len() {
        return Vec::new();
    }

    let inv_period = 1.0 / period as f64;
    values
        .windows(period)
        .enumerate()
        .map(|(i, window)| IndicatorPoint {
            time: times[i + period - 1],
            value: window.iter().sum::<f64>() * inv_period,
        })
        .collect()
}

/// Exponential moving average, seeded with the SMA of the first `period`
/// values; multiplier `k = 2 / (period + 1)`. Same alignment as [`sma`].
pub fn ema(times: &[i64], values: &[f64], period: usize) -> Vec<IndicatorPoint> {
    if period == 0 || values.len() < period || times.len() != values.len() {
        return Vec::new();
    }

    let k = 2.0 / (period as f64 + 1.0);
    let seed = values[..period].iter().sum::<f64>() / period as f64;

    let mut out = Vec::with_capacity(values.len() - period + 1);
    out.push(IndicatorPoint {
        time: times[period - 1],
        value: seed,
    });

    let mut prev = seed;
    for i in period..values.len() {
        prev = (values[i] - prev) * k + prev;
        out.push(IndicatorPoint {
            time: times[i],
            value: prev,
        });
    }
    out
}

/// Bollinger bands: middle = SMA(period), upper/lower = middle +/- k sigma
/// with sigma the *population* standard deviation of each window.
pub fn bollinger(times: &[i64], values: &[f64], period: usize, stddev: f64) -> Vec<BandPoint> {
    if period == 0 || values.len() < period || times.len() != values.len() {
        return Vec::new();
    }

    let inv_period = 1.0 / period as f64;
    values
        .windows(period)
        .enumerate()
        .map(|(i, window)| {
            let middle = window.iter().sum::<f64>() * inv_period;
            let sigma = window.iter().population_variance().sqrt();
            BandPoint {
                time: times[i + period - 1],
                upper: middle + stddev * sigma,
                middle,
                lower: middle - stddev * sigma,
            }
        })
        .collect()
}

/// Relative Strength Index with Wilder's smoothing. Output aligns to
/// `times[period..]`; an all-gain region (avg loss 0) is defined as 100.
pub fn rsi(times: &[i64], values: &[f64], period: usize) -> Vec<IndicatorPoint> {
    if period == 0 || values.len() < period + 1 || times.len() != values.len() {
        return Vec::new();
    }

    let deltas: Vec<f64> = values.windows(2).map(|w| w[1] - w[0]).collect();

    // Seed averages over the first `period` deltas. Zero deltas feed neither
    // bucket (Wilder's rule).
    let mut avg_gain = deltas[..period]
        .iter()
        .map(|&d| if d > 0.0 { d } else { 0.0 })
        .sum::<f64>()
        / period as f64;
    let mut avg_loss = deltas[..period]
        .iter()
        .map(|&d| if d < 0.0 { -d } else { 0.0 })
        .sum::<f64>()
        / period as f64;

    let mut out = Vec::with_capacity(values.len() - period);
    out.push(IndicatorPoint {
        time: times[period],
        value: rsi_value(avg_gain, avg_loss),
    });

    for (i, &delta) in deltas.iter().enumerate().skip(period) {
        let gain = if delta > 0.0 { delta } else { 0.0 };
        let loss = if delta < 0.0 { -delta } else { 0.0 };
        avg_gain = (avg_gain * (period as f64 - 1.0) + gain) / period as f64;
        avg_loss = (avg_loss * (period as f64 - 1.0) + loss) / period as f64;

        out.push(IndicatorPoint {
            time: times[i + 1],
            value: rsi_value(avg_gain, avg_loss),
        });
    }
    out
}

fn rsi_value(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        return 100.0;
    }
    let rs = avg_gain / avg_loss;
    100.0 - 100.0 / (1.0 + rs)
}

/// Flat retracement lines between the series' min low and max high, each
/// spanning exactly the first and last timestamps.
pub fn fibonacci_levels(times: &[i64], highs: &[f64], lows: &[f64]) -> Vec<FibLevel> {
    if times.is_empty() || highs.is_empty() || lows.is_empty() {
        return Vec::new();
    }

    let max_high = highs[highs.argmax()];
    let min_low = lows[lows.argmin()];

    let first_time = times[0];
    let last_time = times[times.len() - 1];

    FIB_RATIOS
        .iter()
        .map(|&ratio| {
            let value = min_low + (max_high - min_low) * ratio;
            FibLevel {
                ratio,
                value,
                points: [
                    IndicatorPoint {
                        time: first_time,
                        value,
                    },
                    IndicatorPoint {
                        time: last_time,
                        value,
                    },
                ],
            }
        })
        .collect()
}

/// All-time high over the loaded series plus the signed percent distance of
/// the last close from it.
pub fn ath_summary(highs: &[f64], last_close: f64) -> Option<AthSummary> {
    if highs.is_empty() {
        return None;
    }

    let ath = highs[highs.argmax()];
    if ath == 0.0 {
        return None;
    }

    let pct = (last_close - ath) / ath * 100.0;
    Some(AthSummary {
        ath,
        percent_from_ath: round2(pct),
    })
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}
