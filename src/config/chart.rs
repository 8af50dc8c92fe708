//! Chart engine tuning constants.

pub struct ChartConfig {
    /// Debounce window for visible-range change events (milliseconds)
    pub viewport_debounce_ms: u64,
    /// Number of bars the right edge may trail the newest bar before the
    /// viewer counts as "scrolled away" from the live edge
    pub live_edge_slack_bars: f64,
    /// Default Bollinger lookback
    pub bollinger_period: usize,
    /// Default Bollinger band width (standard deviations)
    pub bollinger_stddev: f64,
    /// Default RSI lookback
    pub rsi_period: usize,
    /// Default SMA lookback for the overlay series
    pub sma_period: usize,
    /// Default EMA lookback for the overlay series
    pub ema_period: usize,
    /// Values below this magnitude are treated as zero by the normalizer
    pub zero_clamp: f64,
}

pub const CHART: ChartConfig = ChartConfig {
    viewport_debounce_ms: 100,
    live_edge_slack_bars: 2.0,
    bollinger_period: 20,
    bollinger_stddev: 2.0,
    rsi_period: 14,
    sma_period: 20,
    ema_period: 20,
    zero_clamp: 1e-10,
};
