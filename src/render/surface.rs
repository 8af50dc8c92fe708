//! The abstract rendering capability.
//!
//! The engine never assumes a concrete chart library; anything that can
//! create series, assign data, and get/set the visible logical range can
//! host it. Handles are opaque ids so the surface owns its native objects
//! and the orchestrator cannot outlive them.

use thiserror::Error;

/// Thrown by a surface implementation, typically during teardown/recreate
/// races ("series already removed"). Callers swallow these: a transient
/// render failure must never block the next refresh cycle.
#[derive(Debug, Error)]
#[error("render surface: {0}")]
pub struct RenderError(pub String);

/// Opaque handle to one series on the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SeriesId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesKind {
    Candlestick,
    Area,
    Line,
    Histogram,
}

/// Visible logical range in bar coordinates (fractional at the edges).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibleRange {
    pub from: f64,
    pub to: f64,
}

/// One plotted point. Values are already scaled for the surface; true
/// prices only exist on the tooltip side.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SeriesPoint {
    Ohlc {
        time: i64,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
    },
    Value {
        time: i64,
        value: f64,
    },
}

impl SeriesPoint {
    pub fn time(&self) -> i64 {
        match *self {
            SeriesPoint::Ohlc { time, .. } => time,
            SeriesPoint::Value { time, .. } => time,
        }
    }
}

pub trait RenderSurface {
    fn add_series(&mut self, kind: SeriesKind) -> Result<SeriesId, RenderError>;
    fn remove_series(&mut self, id: SeriesId) -> Result<(), RenderError>;

    /// Replace the series' whole dataset. Most surfaces reset pan/zoom on
    /// this call, which is why callers re-apply the saved visible range.
    fn set_data(&mut self, id: SeriesId, points: Vec<SeriesPoint>) -> Result<(), RenderError>;

    /// Incremental update of the last bar (or append of a newer one).
    fn update(&mut self, id: SeriesId, point: SeriesPoint) -> Result<(), RenderError>;

    fn visible_range(&self) -> Option<VisibleRange>;
    fn set_visible_range(&mut self, range: VisibleRange) -> Result<(), RenderError>;
    fn fit_content(&mut self) -> Result<(), RenderError>;

    /// Destroy the surface and all its series.
    fn remove(&mut self);
}
