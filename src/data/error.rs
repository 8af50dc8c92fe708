use thiserror::Error;

/// Failure classes of the chart engine. Nothing here is fatal: every variant
/// degrades to "keep the last good state".
#[derive(Debug, Error)]
pub enum ChartError {
    /// Fetch failed or timed out. Previous data stays visible.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// A superseded or torn-down fetch. Never surfaced to the viewer.
    #[error("fetch cancelled")]
    Cancelled,

    /// Valid response, zero points. Rendered as "no data", not a failure.
    #[error("no data available")]
    EmptyData,

    /// The rendering capability threw during a teardown/recreate race.
    /// Caught and discarded at the call site.
    #[error("render surface error: {0}")]
    RenderSurface(String),
}

impl ChartError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ChartError::Cancelled)
    }
}

impl From<futures::future::Aborted> for ChartError {
    fn from(_: futures::future::Aborted) -> Self {
        ChartError::Cancelled
    }
}

impl From<crate::render::RenderError> for ChartError {
    fn from(e: crate::render::RenderError) -> Self {
        ChartError::RenderSurface(e.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::RenderError;

    #[test]
    fn test_render_failure_maps_into_chart_error() {
        let err = ChartError::from(RenderError("series gone".to_string()));
        assert!(matches!(err, ChartError::RenderSurface(_)));
        assert_eq!(err.to_string(), "render surface error: series gone");
    }

    #[test]
    fn test_aborted_maps_to_cancelled() {
        let (handle, registration) = futures::future::AbortHandle::new_pair();
        handle.abort();
        let aborted = futures::executor::block_on(futures::future::Abortable::new(
            async {},
            registration,
        ))
        .unwrap_err();
        assert!(ChartError::from(aborted).is_cancelled());
    }
}
