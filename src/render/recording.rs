//! A rendering surface that records every command it receives.
//!
//! Used by the unit tests to assert on the exact render traffic the
//! orchestrator emits, and by the demo binary as a stand-in surface.

use std::collections::HashMap;

use crate::config::DEBUG_FLAGS;
use crate::render::surface::{
    RenderError, RenderSurface, SeriesId, SeriesKind, SeriesPoint, VisibleRange,
};

#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceCommand {
    AddSeries { id: SeriesId, kind: SeriesKind },
    RemoveSeries { id: SeriesId },
    SetData { id: SeriesId, len: usize },
    Update { id: SeriesId, point: SeriesPoint },
    SetVisibleRange { range: VisibleRange },
    FitContent,
    Remove,
}

#[derive(Debug, Default)]
pub struct RecordingSurface {
    next_id: u64,
    series: HashMap<SeriesId, (SeriesKind, Vec<SeriesPoint>)>,
    visible: Option<VisibleRange>,
    commands: Vec<SurfaceCommand>,
    /// When set, the next mutating call fails once with this message.
    /// Exercises the orchestrator's swallow-and-continue policy.
    fail_next: Option<String>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[SurfaceCommand] {
        &self.commands
    }

    pub fn series_data(&self, id: SeriesId) -> Option<&[SeriesPoint]> {
        self.series.get(&id).map(|(_, points)| points.as_slice())
    }

    pub fn series_count(&self) -> usize {
        self.series.len()
    }

    pub fn fail_next_call(&mut self, message: impl Into<String>) {
        self.fail_next = Some(message.into());
    }

    /// Simulates the viewer panning/zooming: moves the range without going
    /// through the orchestrator, exactly like a real surface would.
    pub fn pan_to(&mut self, range: VisibleRange) {
        self.visible = Some(range);
    }

    fn record(&mut self, command: SurfaceCommand) {
        if DEBUG_FLAGS.print_render_commands {
            log::info!("[surface] {command:?}");
        }
        self.commands.push(command);
    }

    fn take_failure(&mut self) -> Result<(), RenderError> {
        match self.fail_next.take() {
            Some(message) => Err(RenderError(message)),
            None => Ok(()),
        }
    }
}

impl RenderSurface for RecordingSurface {
    fn add_series(&mut self, kind: SeriesKind) -> Result<SeriesId, RenderError> {
        self.take_failure()?;
        self.next_id += 1;
        let id = SeriesId(self.next_id);
        self.series.insert(id, (kind, Vec::new()));
        self.record(SurfaceCommand::AddSeries { id, kind });
        Ok(id)
    }

    fn remove_series(&mut self, id: SeriesId) -> Result<(), RenderError> {
        self.take_failure()?;
        if self.series.remove(&id).is_none() {
            return Err(RenderError(format!("series {id:?} already removed")));
        }
        self.record(SurfaceCommand::RemoveSeries { id });
        Ok(())
    }

    fn set_data(&mut self, id: SeriesId, points: Vec<SeriesPoint>) -> Result<(), RenderError> {
        self.take_failure()?;
        let len = points.len();
        match self.series.get_mut(&id) {
            Some((_, data)) => *data = points,
            None => return Err(RenderError(format!("series {id:?} already removed"))),
        }
        // Data replacement resets pan/zoom, like real surfaces do.
        self.visible = None;
        self.record(SurfaceCommand::SetData { id, len });
        Ok(())
    }

    fn update(&mut self, id: SeriesId, point: SeriesPoint) -> Result<(), RenderError> {
        self.take_failure()?;
        match self.series.get_mut(&id) {
            Some((_, data)) => match data.last_mut() {
                Some(last) if last.time() == point.time() => *last = point,
                Some(last) if last.time() < point.time() => data.push(point),
                Some(_) => {
                    return Err(RenderError("update older than last bar".to_string()));
                }
                None => data.push(point),
            },
            None => return Err(RenderError(format!("series {id:?} already removed"))),
        }
        self.record(SurfaceCommand::Update { id, point });
        Ok(())
    }

    fn visible_range(&self) -> Option<VisibleRange> {
        self.visible
    }

    fn set_visible_range(&mut self, range: VisibleRange) -> Result<(), RenderError> {
        self.take_failure()?;
        self.visible = Some(range);
        self.record(SurfaceCommand::SetVisibleRange { range });
        Ok(())
    }

    fn fit_content(&mut self) -> Result<(), RenderError> {
        self.take_failure()?;
        let max_len = self
            .series
            .values()
            .map(|(_, data)| data.len())
            .max()
            .unwrap_or(0);
        self.visible = Some(VisibleRange {
            from: 0.0,
            to: max_len.saturating_sub(1) as f64,
        });
        self.record(SurfaceCommand::FitContent);
        Ok(())
    }

    fn remove(&mut self) {
        self.series.clear();
        self.visible = None;
        self.record(SurfaceCommand::Remove);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_data_resets_visible_range() {
        let mut surface = RecordingSurface::new();
        let id = surface.add_series(SeriesKind::Line).unwrap();

        surface.pan_to(VisibleRange { from: 1.0, to: 5.0 });
        surface
            .set_data(id, vec![SeriesPoint::Value { time: 0, value: 1.0 }])
            .unwrap();

        assert_eq!(surface.visible_range(), None);
    }

    #[test]
    fn test_update_replaces_or_appends() {
        let mut surface = RecordingSurface::new();
        let id = surface.add_series(SeriesKind::Line).unwrap();
        surface
            .set_data(id, vec![SeriesPoint::Value { time: 0, value: 1.0 }])
            .unwrap();

        surface
            .update(id, SeriesPoint::Value { time: 0, value: 2.0 })
            .unwrap();
        assert_eq!(surface.series_data(id).unwrap().len(), 1);

        surface
            .update(id, SeriesPoint::Value { time: 60, value: 3.0 })
            .unwrap();
        assert_eq!(surface.series_data(id).unwrap().len(), 2);
    }

    #[test]
    fn test_injected_failure_fires_once() {
        let mut surface = RecordingSurface::new();
        surface.fail_next_call("series already removed");

        assert!(surface.add_series(SeriesKind::Line).is_err());
        assert!(surface.add_series(SeriesKind::Line).is_ok());
    }
}
