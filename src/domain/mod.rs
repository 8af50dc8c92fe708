pub mod candle;
pub mod holders;
pub mod selection;

pub use candle::{Candle, CandleSeries};
pub use holders::HolderPoint;
pub use selection::{ChartRange, ChartSelection, ChartType, IndicatorKind};
