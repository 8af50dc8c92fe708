pub mod recording;
pub mod surface;

pub use recording::{RecordingSurface, SurfaceCommand};
pub use surface::{RenderError, RenderSurface, SeriesId, SeriesKind, SeriesPoint, VisibleRange};
