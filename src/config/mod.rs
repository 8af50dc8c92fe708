//! Configuration module for the livechart engine.

pub mod chart;
pub mod market;

mod debug; // Private; callers use crate::config::DEBUG_FLAGS, not crate::config::debug::DEBUG_FLAGS
pub use debug::DEBUG_FLAGS;

// Re-export commonly used items
pub use chart::{CHART, ChartConfig};
pub use market::{MARKET, MarketConfig};
