//! Viewport classification.
//!
//! Visible-range change events arrive in bursts while the viewer drags, so
//! they are debounced (trailing edge, 100 ms) and only the settled range is
//! classified. The single heuristic: the viewer counts as scrolled away when
//! the window's right edge trails more than ~2 bars behind the newest bar.
//! Backward scroll depth and zoom factor are deliberately ignored.
//!
//! `is_user_scrolled_away` gates *visual* auto-advance only. Data refresh
//! continues regardless.

use std::time::{Duration, Instant};

use crate::config::{CHART, DEBUG_FLAGS};
use crate::render::VisibleRange;

#[derive(Debug)]
pub struct ViewportTracker {
    debounce: Duration,
    /// Latest event plus its settle deadline; each new event pushes it out.
    pending: Option<(VisibleRange, Instant)>,
    visible_range: Option<VisibleRange>,
    user_scrolled_away: bool,
    evaluations: u64,
}

impl ViewportTracker {
    pub fn new() -> Self {
        ViewportTracker {
            debounce: Duration::from_millis(CHART.viewport_debounce_ms),
            pending: None,
            visible_range: None,
            user_scrolled_away: false,
            evaluations: 0,
        }
    }

    /// Record a visible-range change event from the surface.
    pub fn on_range_event(&mut self, range: VisibleRange, now: Instant) {
        self.pending = Some((range, now + self.debounce));
    }

    /// Run the debounced classification if the burst has settled. Returns
    /// true when a classification actually ran.
    pub fn poll(&mut self, now: Instant, series_len: usize) -> bool {
        let Some((range, deadline)) = self.pending else {
            return false;
        };
        if now < deadline {
            return false;
        }

        self.pending = None;
        self.visible_range = Some(range);

        let was = self.user_scrolled_away;
        self.user_scrolled_away = range.to < series_len as f64 - CHART.live_edge_slack_bars;
        self.evaluations += 1;

        if DEBUG_FLAGS.print_viewport_events && was != self.user_scrolled_away {
            log::info!(
                "[viewport] scrolled_away {} -> {} (to={:.1}, len={})",
                was,
                self.user_scrolled_away,
                range.to,
                series_len
            );
        }
        true
    }

    pub fn is_user_scrolled_away(&self) -> bool {
        self.user_scrolled_away
    }

    /// Last settled range, re-applied after incremental updates because
    /// surfaces reset pan/zoom on data changes.
    pub fn saved_range(&self) -> Option<VisibleRange> {
        self.visible_range
    }

    /// Range or chart-type changes snap back to the live edge.
    pub fn reset(&mut self) {
        self.pending = None;
        self.visible_range = None;
        self.user_scrolled_away = false;
    }

    pub fn evaluations(&self) -> u64 {
        self.evaluations
    }
}

impl Default for ViewportTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(from: f64, to: f64) -> VisibleRange {
        VisibleRange { from, to }
    }

    #[test]
    fn test_burst_of_events_classifies_once() {
        let mut tracker = ViewportTracker::new();
        let t0 = Instant::now();

        // 10 rapid events inside the 100 ms window
        for i in 0..10 {
            tracker.on_range_event(
                range(0.0, 50.0 + i as f64),
                t0 + Duration::from_millis(i * 9),
            );
        }

        // Still inside the window: nothing evaluated
        assert!(!tracker.poll(t0 + Duration::from_millis(95), 100));
        assert_eq!(tracker.evaluations(), 0);

        // Settled: exactly one evaluation, on the last event's range
        assert!(tracker.poll(t0 + Duration::from_millis(250), 100));
        assert_eq!(tracker.evaluations(), 1);
        assert_eq!(tracker.saved_range(), Some(range(0.0, 59.0)));

        // Nothing pending anymore
        assert!(!tracker.poll(t0 + Duration::from_millis(300), 100));
        assert_eq!(tracker.evaluations(), 1);
    }

    #[test]
    fn test_scrolled_away_threshold() {
        let mut tracker = ViewportTracker::new();
        let t0 = Instant::now();
        let settled = t0 + Duration::from_millis(200);

        // Right edge 2 bars behind the latest: still at the live edge
        tracker.on_range_event(range(0.0, 98.0), t0);
        tracker.poll(settled, 100);
        assert!(!tracker.is_user_scrolled_away());

        // More than 2 bars behind: scrolled away
        tracker.on_range_event(range(0.0, 95.0), settled);
        tracker.poll(settled + Duration::from_millis(200), 100);
        assert!(tracker.is_user_scrolled_away());
    }

    #[test]
    fn test_reset_clears_classification() {
        let mut tracker = ViewportTracker::new();
        let t0 = Instant::now();

        tracker.on_range_event(range(0.0, 10.0), t0);
        tracker.poll(t0 + Duration::from_millis(200), 100);
        assert!(tracker.is_user_scrolled_away());

        tracker.reset();
        assert!(!tracker.is_user_scrolled_away());
        assert_eq!(tracker.saved_range(), None);
    }
}
