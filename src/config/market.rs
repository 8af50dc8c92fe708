//! Market data API configuration constants and types.

/// Configuration for the REST client itself
pub struct ClientDefaults {
    pub timeout_ms: u64,
    pub retries: u32,
    pub backoff_ms: u64,
}

/// Configuration for endpoint paths and polling cadence
pub struct EndpointConfig {
    /// Base URL for the graph API (no trailing slash)
    pub base_url: &'static str,
    /// OHLC series endpoint, formatted as `{base}/graph-ohlc-v2/{id}`
    pub ohlc_path: &'static str,
    /// Holder distribution endpoint, formatted as `{base}/graphrich/{id}`
    pub holders_path: &'static str,
    /// Quote currency passed as `vs_currency`
    pub vs_currency: &'static str,
}

/// Configuration for the background refresh loop
pub struct PollConfig {
    /// Interval between background price refreshes (milliseconds)
    pub interval_ms: u64,
    /// Hard cap on consecutive failed refresh attempts before the loop
    /// gives up (successful ticks reset the counter)
    pub max_failed_attempts: u32,
}

/// The Master Configuration Struct
pub struct MarketConfig {
    pub endpoints: EndpointConfig,
    pub client: ClientDefaults,
    pub poll: PollConfig,
}

pub const MARKET: MarketConfig = MarketConfig {
    endpoints: EndpointConfig {
        base_url: "https://api.tokengraphs.io",
        ohlc_path: "graph-ohlc-v2",
        holders_path: "graphrich",
        vs_currency: "usd",
    },
    client: ClientDefaults {
        timeout_ms: 5000,
        retries: 3,
        backoff_ms: 2000,
    },
    poll: PollConfig {
        interval_ms: 4000,
        max_failed_attempts: 30,
    },
};
