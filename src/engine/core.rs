//! The chart orchestrator.
//!
//! Top-level coordinator: owns the chart selection, the viewport tracker,
//! the fetch sessions, and every series handle on the rendering surface. No
//! other component talks to the surface. Decides, per input change, between
//! a full reload (chart type or range changed), an incremental last-bar
//! update (background refresh while the viewer is scrolled away), and an
//! indicator-only recompute (overlay toggled).
//!
//! Render-surface calls are best-effort throughout: a surface that throws
//! mid-teardown gets its operation skipped and the next cycle proceeds.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use futures::future::Abortable;

use crate::analysis::{self, AthSummary};
use crate::config::CHART;
use crate::data::api::MarketDataSource;
use crate::data::error::ChartError;
use crate::data::session::{DataSource, FetchKind, FetchSessionManager};
use crate::domain::{
    Candle, CandleSeries, ChartRange, ChartSelection, ChartType, HolderPoint, IndicatorKind,
};
use crate::engine::viewport::ViewportTracker;
use crate::render::{RenderError, RenderSurface, SeriesId, SeriesKind, SeriesPoint, VisibleRange};
use crate::utils::format::format_plotted_price;
use crate::utils::normalize::compute_scale_factor;

pub struct ChartOrchestrator<S: RenderSurface> {
    surface: S,
    source: Arc<dyn MarketDataSource>,
    token_id: String,

    selection: ChartSelection,
    sessions: FetchSessionManager,
    viewport: ViewportTracker,

    candles: CandleSeries,
    holders: Vec<HolderPoint>,
    scale_factor: f64,

    price_series: Option<SeriesId>,
    volume_series: Option<SeriesId>,
    indicator_series: BTreeMap<IndicatorKind, Vec<SeriesId>>,

    loading: bool,
    no_data: bool,
}

impl<S: RenderSurface> ChartOrchestrator<S> {
    pub fn new(
        surface: S,
        source: Arc<dyn MarketDataSource>,
        token_id: impl Into<String>,
        selection: ChartSelection,
    ) -> Self {
        ChartOrchestrator {
            surface,
            source,
            token_id: token_id.into(),
            selection,
            sessions: FetchSessionManager::new(),
            viewport: ViewportTracker::new(),
            candles: CandleSeries::default(),
            holders: Vec::new(),
            scale_factor: 1.0,
            price_series: None,
            volume_series: None,
            indicator_series: BTreeMap::new(),
            loading: false,
            no_data: false,
        }
    }

    // --- SELECTION CHANGES ---

    pub async fn initial_load(&mut self) -> Result<(), ChartError> {
        self.full_reload(FetchKind::Initial).await
    }

    pub async fn set_chart_type(&mut self, chart_type: ChartType) -> Result<(), ChartError> {
        if self.selection.chart_type == chart_type {
            return Ok(());
        }
        log::info!("Chart type -> {chart_type}");
        self.selection.chart_type = chart_type;
        self.viewport.reset();
        // Series kinds change with the chart type, so handles are rebuilt.
        self.destroy_all_series();
        self.full_reload(FetchKind::Initial).await
    }

    pub async fn set_range(&mut self, range: ChartRange) -> Result<(), ChartError> {
        if self.selection.range == range {
            return Ok(());
        }
        log::info!("Range -> {range}");
        self.selection.range = range;
        self.viewport.reset();
        self.full_reload(FetchKind::Initial).await
    }

    /// Toggling an overlay recomputes only that overlay. The price series
    /// and the viewer's pan/zoom stay untouched.
    pub fn toggle_indicator(&mut self, kind: IndicatorKind) {
        if !self.selection.indicators.remove(&kind) {
            self.selection.indicators.insert(kind);
        }

        // Indicator handles are always replaced wholesale; there is no
        // incremental-update story for an overlay.
        self.remove_indicator_series(kind);
        self.sync_indicator(kind);
        self.restore_saved_range();
    }

    // --- VIEWPORT EVENTS ---

    /// Forwarded from the surface's visible-range-change subscription.
    pub fn notify_visible_range(&mut self, range: VisibleRange, now: Instant) {
        self.viewport.on_range_event(range, now);
    }

    /// Runs the debounced viewport classification. Call from the event loop.
    pub fn pump_viewport(&mut self, now: Instant) {
        self.viewport.poll(now, self.plotted_len());
    }

    // --- BACKGROUND REFRESH ---

    /// One background refresh tick for the price source. Runs on every poll
    /// regardless of viewport state; only the *render* path differs when the
    /// viewer has scrolled away from the live edge.
    pub async fn refresh(&mut self) -> Result<(), ChartError> {
        self.pump_viewport(Instant::now());

        let (ticket, registration) = self.sessions.begin(DataSource::Price, FetchKind::Refresh);
        let source = self.source.clone();
        let token_id = self.token_id.clone();
        let range = self.selection.range;

        let fetched = Abortable::new(
            async move { source.fetch_ohlc(&token_id, range).await },
            registration,
        )
        .await;

        let rows = match fetched {
            Err(_aborted) => return Err(ChartError::Cancelled),
            Ok(Err(e)) => {
                // Refresh failures are silent to the viewer; last good data stays.
                self.sessions.complete(&ticket);
                return Err(e);
            }
            Ok(Ok(rows)) => rows,
        };

        if !self.sessions.complete(&ticket) {
            return Err(ChartError::Cancelled);
        }
        if rows.is_empty() {
            return Ok(()); // no data this tick; keep what we have
        }

        self.apply_refresh(rows);
        Ok(())
    }

    fn apply_refresh(&mut self, rows: Vec<Candle>) {
        if self.viewport.is_user_scrolled_away() {
            // Incremental path: absorb the newest bar only, never replace the
            // dataset, never fit. The saved range is re-applied because the
            // surface may still reset zoom on the update.
            let Some(newest) = rows.into_iter().max_by_key(|c| c.time) else {
                return;
            };
            self.candles.absorb(newest);

            if self.selection.chart_type != ChartType::Holders {
                if let Some(id) = self.price_series {
                    let point = self.price_point(newest);
                    swallow(self.surface.update(id, point), "last-bar update");
                }
                if let Some(id) = self.volume_series {
                    let point = SeriesPoint::Value {
                        time: newest.time,
                        value: newest.volume,
                    };
                    swallow(self.surface.update(id, point), "volume update");
                }
                self.restore_saved_range();
            }
        } else {
            // Live edge: whole-series replacement, scale factor recomputed
            // with the replacement.
            self.candles = CandleSeries::from_rows(rows);
            self.scale_factor = compute_scale_factor(self.candles.max_plot_magnitude());
            if self.selection.chart_type != ChartType::Holders {
                self.render_price_full(FetchKind::Refresh);
            }
        }
    }

    // --- FULL LOADS ---

    async fn full_reload(&mut self, kind: FetchKind) -> Result<(), ChartError> {
        if self.selection.chart_type == ChartType::Holders {
            self.reload_holders(kind).await?;
        }
        self.reload_price(kind).await
    }

    async fn reload_price(&mut self, kind: FetchKind) -> Result<(), ChartError> {
        let (ticket, registration) = self.sessions.begin(DataSource::Price, kind);
        if kind == FetchKind::Initial {
            self.loading = true;
        }

        let source = self.source.clone();
        let token_id = self.token_id.clone();
        let range = self.selection.range;
        let fetched = Abortable::new(
            async move { source.fetch_ohlc(&token_id, range).await },
            registration,
        )
        .await;

        let rows = match fetched {
            // A superseded load mutates nothing; the superseding load owns
            // the loading flag now.
            Err(_aborted) => return Err(ChartError::Cancelled),
            Ok(Err(e)) => {
                if self.sessions.complete(&ticket) && kind == FetchKind::Initial {
                    self.loading = false;
                    // A failed first load leaves nothing to draw, which the
                    // consumer surfaces exactly like an empty payload.
                    self.no_data = self.candles.is_empty();
                }
                return Err(e);
            }
            Ok(Ok(rows)) => rows,
        };

        if !self.sessions.complete(&ticket) {
            return Err(ChartError::Cancelled);
        }
        if kind == FetchKind::Initial {
            self.loading = false;
        }

        if rows.is_empty() {
            self.no_data = true;
            return Ok(());
        }
        self.no_data = false;

        self.candles = CandleSeries::from_rows(rows);
        self.scale_factor = compute_scale_factor(self.candles.max_plot_magnitude());

        if self.selection.chart_type != ChartType::Holders {
            self.render_price_full(kind);
        }
        Ok(())
    }

    async fn reload_holders(&mut self, kind: FetchKind) -> Result<(), ChartError> {
        let (ticket, registration) = self.sessions.begin(DataSource::Holders, kind);

        let source = self.source.clone();
        let token_id = self.token_id.clone();
        let range = self.selection.range;
        let fetched = Abortable::new(
            async move { source.fetch_holders(&token_id, range).await },
            registration,
        )
        .await;

        let points = match fetched {
            Err(_aborted) => return Err(ChartError::Cancelled),
            Ok(Err(e)) => {
                self.sessions.complete(&ticket);
                return Err(e);
            }
            Ok(Ok(points)) => points,
        };

        if !self.sessions.complete(&ticket) {
            return Err(ChartError::Cancelled);
        }

        self.holders = points;
        if self.holders.is_empty() {
            self.no_data = true;
            return Ok(());
        }
        self.no_data = false;
        self.render_holders_full(kind);
        Ok(())
    }

    // --- RENDERING ---

    fn render_price_full(&mut self, kind: FetchKind) {
        self.ensure_price_series();

        if let Some(id) = self.price_series {
            let points = self.price_points();
            swallow(self.surface.set_data(id, points), "price data");
        }
        if let Some(id) = self.volume_series {
            let points = self.volume_points();
            swallow(self.surface.set_data(id, points), "volume data");
        }

        for indicator in self.active_indicators() {
            self.sync_indicator(indicator);
        }

        match kind {
            FetchKind::Initial => {
                swallow(self.surface.fit_content(), "fit content");
            }
            FetchKind::Refresh => self.restore_saved_range(),
        }
    }

    fn render_holders_full(&mut self, kind: FetchKind) {
        if self.price_series.is_none() {
            self.price_series = swallow(self.surface.add_series(SeriesKind::Line), "holder series");
        }
        if let Some(id) = self.price_series {
            let points: Vec<SeriesPoint> = self
                .holders
                .iter()
                .map(|p| SeriesPoint::Value {
                    time: p.time,
                    value: p.length as f64,
                })
                .collect();
            swallow(self.surface.set_data(id, points), "holder data");
        }
        if kind == FetchKind::Initial {
            swallow(self.surface.fit_content(), "fit content");
        }
    }

    fn ensure_price_series(&mut self) {
        if self.price_series.is_none() {
            let kind = match self.selection.chart_type {
                ChartType::Candles => SeriesKind::Candlestick,
                ChartType::Line => SeriesKind::Area,
                ChartType::Holders => SeriesKind::Line,
            };
            self.price_series = swallow(self.surface.add_series(kind), "price series");
        }
        if self.volume_series.is_none() && self.selection.chart_type != ChartType::Holders {
            self.volume_series =
                swallow(self.surface.add_series(SeriesKind::Histogram), "volume series");
        }
    }

    fn price_points(&self) -> Vec<SeriesPoint> {
        self.candles.iter_rows().map(|c| self.price_point(c)).collect()
    }

    fn price_point(&self, c: Candle) -> SeriesPoint {
        let sf = self.scale_factor;
        match self.selection.chart_type {
            ChartType::Candles => SeriesPoint::Ohlc {
                time: c.time,
                open: c.open * sf,
                high: c.high * sf,
                low: c.low * sf,
                close: c.close * sf,
            },
            _ => SeriesPoint::Value {
                time: c.time,
                value: c.close * sf,
            },
        }
    }

    fn volume_points(&self) -> Vec<SeriesPoint> {
        self.candles
            .iter_rows()
            .map(|c| SeriesPoint::Value {
                time: c.time,
                value: c.volume,
            })
            .collect()
    }

    // --- INDICATORS ---

    fn active_indicators(&self) -> Vec<IndicatorKind> {
        self.selection.indicators.iter().copied().collect()
    }

    /// Bring one overlay's series in line with the current selection and
    /// data: creates handles when missing, pushes fresh data, removes
    /// everything when the overlay is off.
    fn sync_indicator(&mut self, kind: IndicatorKind) {
        if !self.selection.indicators.contains(&kind)
            || self.selection.chart_type == ChartType::Holders
        {
            self.remove_indicator_series(kind);
            return;
        }

        let lines = self.indicator_lines(kind);
        let need = lines.len();

        let reusable = self
            .indicator_series
            .get(&kind)
            .filter(|ids| ids.len() == need)
            .cloned();
        let ids = match reusable {
            Some(ids) => ids,
            None => {
                self.remove_indicator_series(kind);
                let mut ids = Vec::with_capacity(need);
                for _ in 0..need {
                    if let Some(id) = swallow(self.surface.add_series(SeriesKind::Line), "overlay")
                    {
                        ids.push(id);
                    }
                }
                self.indicator_series.insert(kind, ids.clone());
                ids
            }
        };

        for (id, points) in ids.into_iter().zip(lines) {
            swallow(self.surface.set_data(id, points), "overlay data");
        }
    }

    /// Overlay geometry: one point vector per rendered line. RSI is an
    /// oscillator on its own 0-100 axis and is never scaled; everything
    /// price-denominated is.
    fn indicator_lines(&self, kind: IndicatorKind) -> Vec<Vec<SeriesPoint>> {
        let sf = self.scale_factor;
        let times = &self.candles.times;
        let values = &self.candles.closes;
        let scaled = |p: &analysis::IndicatorPoint| SeriesPoint::Value {
            time: p.time,
            value: p.value * sf,
        };

        match kind {
            IndicatorKind::Sma => {
                vec![analysis::sma(times, values, CHART.sma_period).iter().map(scaled).collect()]
            }
            IndicatorKind::Ema => {
                vec![analysis::ema(times, values, CHART.ema_period).iter().map(scaled).collect()]
            }
            IndicatorKind::Bollinger => {
                let bands = analysis::bollinger(
                    times,
                    values,
                    CHART.bollinger_period,
                    CHART.bollinger_stddev,
                );
                let line = |f: fn(&analysis::BandPoint) -> f64| {
                    bands
                        .iter()
                        .map(|b| SeriesPoint::Value {
                            time: b.time,
                            value: f(b) * sf,
                        })
                        .collect::<Vec<_>>()
                };
                vec![line(|b| b.upper), line(|b| b.middle), line(|b| b.lower)]
            }
            IndicatorKind::Rsi => vec![
                analysis::rsi(times, values, CHART.rsi_period)
                    .iter()
                    .map(|p| SeriesPoint::Value {
                        time: p.time,
                        value: p.value,
                    })
                    .collect(),
            ],
            IndicatorKind::Fibonacci => {
                analysis::fibonacci_levels(times, &self.candles.highs, &self.candles.lows)
                    .iter()
                    .map(|level| level.points.iter().map(scaled).collect())
                    .collect()
            }
        }
    }

    fn remove_indicator_series(&mut self, kind: IndicatorKind) {
        if let Some(ids) = self.indicator_series.remove(&kind) {
            for id in ids {
                swallow(self.surface.remove_series(id), "overlay teardown");
            }
        }
    }

    fn restore_saved_range(&mut self) {
        if let Some(range) = self.viewport.saved_range() {
            swallow(self.surface.set_visible_range(range), "range restore");
        }
    }

    fn destroy_all_series(&mut self) {
        for kind in self.indicator_series.keys().copied().collect::<Vec<_>>() {
            self.remove_indicator_series(kind);
        }
        if let Some(id) = self.price_series.take() {
            swallow(self.surface.remove_series(id), "price teardown");
        }
        if let Some(id) = self.volume_series.take() {
            swallow(self.surface.remove_series(id), "volume teardown");
        }
    }

    // --- TELEMETRY / ACCESSORS ---

    pub fn selection(&self) -> &ChartSelection {
        &self.selection
    }

    pub fn candles(&self) -> &CandleSeries {
        &self.candles
    }

    pub fn holders(&self) -> &[HolderPoint] {
        &self.holders
    }

    pub fn scale_factor(&self) -> f64 {
        self.scale_factor
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn has_no_data(&self) -> bool {
        self.no_data
    }

    pub fn is_user_scrolled_away(&self) -> bool {
        self.viewport.is_user_scrolled_away()
    }

    /// ATH over the loaded series, in actual (unscaled) prices.
    pub fn ath(&self) -> Option<AthSummary> {
        let last_close = self.candles.last_close()?;
        analysis::ath_summary(&self.candles.highs, last_close)
    }

    /// Tooltip RSI readout: last value of the canonical RSI series.
    pub fn current_rsi(&self) -> Option<f64> {
        analysis::rsi(&self.candles.times, &self.candles.closes, CHART.rsi_period)
            .last()
            .map(|p| p.value)
    }

    /// Tooltip price formatting: surface values divided back by the scale
    /// factor before display.
    pub fn format_plotted(&self, plotted: f64) -> String {
        format_plotted_price(plotted, self.scale_factor)
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Teardown: aborts in-flight fetches and releases every surface handle.
    pub fn shutdown(&mut self) {
        self.sessions.abort_all();
        self.destroy_all_series();
        self.surface.remove();
    }

    fn plotted_len(&self) -> usize {
        match self.selection.chart_type {
            ChartType::Holders => self.holders.len(),
            _ => self.candles.len(),
        }
    }
}

/// Best-effort render call: log and skip on failure, never propagate.
fn swallow<T>(result: Result<T, RenderError>, what: &str) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            let e = ChartError::from(e);
            log::warn!("Surface refused {what}: {e} (skipped)");
            None
        }
    }
}
