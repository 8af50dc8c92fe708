use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

/// What the price pane plots.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
pub enum ChartType {
    Candles,
    Line,
    Holders,
}

/// History window requested from the API.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString, Serialize, Deserialize,
)]
pub enum ChartRange {
    #[strum(serialize = "1D")]
    Day1,
    #[strum(serialize = "5D")]
    Day5,
    #[strum(serialize = "1M")]
    Month1,
    #[strum(serialize = "3M")]
    Month3,
    #[strum(serialize = "1Y")]
    Year1,
    #[strum(serialize = "5Y")]
    Year5,
    #[strum(serialize = "ALL")]
    All,
}

impl ChartRange {
    /// Value of the `range` query parameter.
    pub fn api_param(&self) -> &'static str {
        match self {
            ChartRange::Day1 => "1D",
            ChartRange::Day5 => "5D",
            ChartRange::Month1 => "1M",
            ChartRange::Month3 => "3M",
            ChartRange::Year1 => "1Y",
            ChartRange::Year5 => "5Y",
            ChartRange::All => "ALL",
        }
    }
}

/// Overlay indicators the viewer can toggle.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "UPPERCASE")]
pub enum IndicatorKind {
    Sma,
    Ema,
    Bollinger,
    Rsi,
    Fibonacci,
}

/// The full user selection driving the orchestrator. Changing `chart_type`
/// or `range` forces a full reload; changing `indicators` only recomputes
/// the affected overlay series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartSelection {
    pub chart_type: ChartType,
    pub range: ChartRange,
    pub indicators: BTreeSet<IndicatorKind>,
}

impl Default for ChartSelection {
    fn default() -> Self {
        ChartSelection {
            chart_type: ChartType::Candles,
            range: ChartRange::Month1,
            indicators: BTreeSet::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_api_params_round_trip_display() {
        for range in [
            ChartRange::Day1,
            ChartRange::Day5,
            ChartRange::Month1,
            ChartRange::Month3,
            ChartRange::Year1,
            ChartRange::Year5,
            ChartRange::All,
        ] {
            assert_eq!(range.to_string(), range.api_param());
        }
    }
}
