use serde::{Deserialize, Serialize};

/// One OHLCV record at a discrete timestamp (seconds since epoch).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    pub fn new(time: i64, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Candle {
            time,
            open,
            high,
            low,
            close,
            volume,
        }
    }
}

// ============================================================================
// CandleSeries: columnar storage for one loaded series
// ============================================================================

/// Column-oriented candle storage. Indicators and min/max scans operate on
/// whole columns, so rows are transposed once at ingestion.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct CandleSeries {
    pub times: Vec<i64>,
    pub opens: Vec<f64>,
    pub highs: Vec<f64>,
    pub lows: Vec<f64>,
    pub closes: Vec<f64>,
    pub volumes: Vec<f64>,
}

impl CandleSeries {
    /// Build a series from rows, sorting ascending by time. The upstream
    /// source is not guaranteed sorted and may re-send the live bar, so a
    /// repeated timestamp keeps the later row. Times end up strictly
    /// increasing.
    pub fn from_rows(mut rows: Vec<Candle>) -> Self {
        // Stable sort keeps payload order within a timestamp, so absorb()
        // overwrites earlier duplicates with the later row.
        rows.sort_by_key(|c| c.time);

        let mut series = CandleSeries::with_capacity(rows.len());
        for row in rows {
            series.absorb(row);
        }
        series
    }

    pub fn with_capacity(n: usize) -> Self {
        CandleSeries {
            times: Vec::with_capacity(n),
            opens: Vec::with_capacity(n),
            highs: Vec::with_capacity(n),
            lows: Vec::with_capacity(n),
            closes: Vec::with_capacity(n),
            volumes: Vec::with_capacity(n),
        }
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn get_candle(&self, idx: usize) -> Candle {
        Candle::new(
            self.times[idx],
            self.opens[idx],
            self.highs[idx],
            self.lows[idx],
            self.closes[idx],
            self.volumes[idx],
        )
    }

    pub fn last_candle(&self) -> Option<Candle> {
        if self.is_empty() {
            None
        } else {
            Some(self.get_candle(self.len() - 1))
        }
    }

    pub fn last_close(&self) -> Option<f64> {
        self.closes.last().copied()
    }

    fn push(&mut self, c: Candle) {
        self.times.push(c.time);
        self.opens.push(c.open);
        self.highs.push(c.high);
        self.lows.push(c.low);
        self.closes.push(c.close);
        self.volumes.push(c.volume);
    }

    /// Absorb one refreshed bar: replaces the last bar when the timestamp
    /// matches, appends when it is newer, and drops stale bars silently.
    pub fn absorb(&mut self, c: Candle) {
        match self.times.last() {
            Some(&last) if c.time == last => {
                let idx = self.len() - 1;
                self.opens[idx] = c.open;
                self.highs[idx] = c.high;
                self.lows[idx] = c.low;
                self.closes[idx] = c.close;
                self.volumes[idx] = c.volume;
            }
            Some(&last) if c.time > last => self.push(c),
            Some(_) => {} // older than the live edge; nothing to do
            None => self.push(c),
        }
    }

    /// Maximum plotted magnitude across open/high/close columns. Feeds the
    /// scale-factor tier selection; `low` is excluded because `high` already
    /// bounds every bar from above.
    pub fn max_plot_magnitude(&self) -> f64 {
        let mut max = 0.0_f64;
        for i in 0..self.len() {
            max = max.max(self.opens[i]).max(self.highs[i]).max(self.closes[i]);
        }
        max
    }

    pub fn iter_rows(&self) -> impl Iterator<Item = Candle> + '_ {
        (0..self.len()).map(|i| self.get_candle(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candle(time: i64, close: f64) -> Candle {
        Candle::new(time, close, close, close, close, 1.0)
    }

    #[test]
    fn test_from_rows_sorts_ascending() {
        let series = CandleSeries::from_rows(vec![candle(60, 2.0), candle(0, 1.0), candle(30, 3.0)]);
        assert_eq!(series.times, vec![0, 30, 60]);
        // Non-decreasing regardless of input order
        assert!(series.times.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_from_rows_keeps_later_of_duplicate_timestamps() {
        // A payload can re-send the live bar with updated values
        let series = CandleSeries::from_rows(vec![
            candle(0, 1.0),
            candle(60, 2.0),
            candle(60, 2.5),
        ]);
        assert_eq!(series.times, vec![0, 60]);
        assert_eq!(series.closes, vec![1.0, 2.5]);
        // Strictly increasing once ingested
        assert!(series.times.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_absorb_replaces_matching_timestamp() {
        let mut series = CandleSeries::from_rows(vec![candle(0, 1.0), candle(60, 2.0)]);
        series.absorb(candle(60, 2.5));
        assert_eq!(series.len(), 2);
        assert_eq!(series.closes[1], 2.5);
    }

    #[test]
    fn test_absorb_appends_newer_and_drops_stale() {
        let mut series = CandleSeries::from_rows(vec![candle(0, 1.0), candle(60, 2.0)]);
        series.absorb(candle(120, 3.0));
        assert_eq!(series.len(), 3);

        series.absorb(candle(30, 9.0));
        assert_eq!(series.len(), 3); // stale bar ignored
        assert_eq!(series.closes, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_max_plot_magnitude_ignores_low() {
        let series = CandleSeries::from_rows(vec![Candle::new(0, 1.0, 2.0, 0.5, 1.5, 100.0)]);
        assert_eq!(series.max_plot_magnitude(), 2.0);
    }
}
