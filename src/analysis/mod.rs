pub mod indicators;

pub use indicators::{
    AthSummary, BandPoint, FibLevel, IndicatorPoint, ath_summary, bollinger, ema,
    fibonacci_levels, rsi, sma,
};
