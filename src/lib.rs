#![allow(clippy::collapsible_if)]
#![allow(clippy::collapsible_else_if)]

// Core modules
pub mod analysis;
pub mod config;
pub mod data;
pub mod domain;
pub mod engine;
pub mod render;
pub mod utils;

// Re-export commonly used types
pub use data::{ChartError, FetchKind, FetchSessionManager, HttpMarketApi, MarketDataSource};
pub use domain::{Candle, CandleSeries, ChartRange, ChartSelection, ChartType, IndicatorKind};
pub use engine::{ChartOrchestrator, Poller, PollerHandle, ViewportTracker};
pub use render::{RecordingSurface, RenderSurface};

// CLI argument parsing
use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Token id to chart
    #[arg(long, default_value = "bitcoin")]
    pub id: String,

    /// Override the graph API base URL
    #[arg(long)]
    pub base_url: Option<String>,

    /// History range: 1D, 5D, 1M, 3M, 1Y, 5Y or ALL
    #[arg(long, default_value = "1M")]
    pub range: String,

    /// Number of background refresh ticks before the demo exits
    #[arg(long, default_value_t = 3)]
    pub refreshes: u32,
}
