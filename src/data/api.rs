//! REST client for the graph API.
//!
//! Two endpoints feed the chart: the OHLC series and the holder-distribution
//! history. Both are tolerant of sloppy payloads — numeric fields arrive as
//! JSON numbers, strings, or scientific notation, rows can be short, and the
//! array can be empty — so every field goes through the normalizer and
//! malformed rows are dropped with a log line rather than failing the fetch.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::config::MARKET;
use crate::data::error::ChartError;
use crate::domain::holders::{HolderPoint, dedup_holder_points};
use crate::domain::{Candle, ChartRange};
use crate::utils::normalize::RawNumber;
use crate::utils::time_utils::epoch_ms_to_sec;

#[derive(Debug, Deserialize)]
struct OhlcResponse {
    #[serde(default)]
    ohlc: Vec<Vec<RawNumber>>,
}

#[derive(Debug, Deserialize)]
struct HoldersResponse {
    #[serde(default)]
    history: Vec<RawHolderPoint>,
}

#[derive(Debug, Deserialize)]
struct RawHolderPoint {
    time: i64,
    #[serde(default)]
    length: u64,
    #[serde(default)]
    top10: f64,
    #[serde(default)]
    top20: f64,
    #[serde(default)]
    top50: f64,
    #[serde(default)]
    top100: f64,
    #[serde(rename = "active24H", default)]
    active_24h: u64,
}

/// The data source boundary the orchestrator fetches through. Swappable for
/// a canned implementation in tests.
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// A unique identifier for this implementation (so logs say which one ran).
    fn signature(&self) -> &'static str;

    async fn fetch_ohlc(&self, id: &str, range: ChartRange) -> Result<Vec<Candle>, ChartError>;

    async fn fetch_holders(
        &self,
        id: &str,
        range: ChartRange,
    ) -> Result<Vec<HolderPoint>, ChartError>;
}

pub struct HttpMarketApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpMarketApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(MARKET.client.timeout_ms))
            .build()
            .unwrap_or_default();
        HttpMarketApi {
            client,
            base_url: base_url.into(),
        }
    }
}

impl HttpMarketApi {
    /// GET with bounded retries and a fixed backoff. Send failures are
    /// retried up to the configured cap; a body that fails to parse is not,
    /// since the payload will not improve on a re-request.
    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, ChartError> {
        let mut attempt = 0u32;
        loop {
            match self.client.get(url).send().await {
                Ok(response) => return Ok(response.json().await?),
                Err(e) => {
                    attempt += 1;
                    if attempt > MARKET.client.retries {
                        return Err(e.into());
                    }
                    log::debug!("GET {url} failed (attempt {attempt}): {e}");
                    tokio::time::sleep(Duration::from_millis(MARKET.client.backoff_ms)).await;
                }
            }
        }
    }
}

impl Default for HttpMarketApi {
    fn default() -> Self {
        Self::new(MARKET.endpoints.base_url)
    }
}

#[async_trait]
impl MarketDataSource for HttpMarketApi {
    fn signature(&self) -> &'static str {
        "Graph REST API"
    }

    async fn fetch_ohlc(&self, id: &str, range: ChartRange) -> Result<Vec<Candle>, ChartError> {
        let url = format!(
            "{}/{}/{}?range={}&vs_currency={}",
            self.base_url,
            MARKET.endpoints.ohlc_path,
            id,
            range.api_param(),
            MARKET.endpoints.vs_currency,
        );

        let response: OhlcResponse = self.get_json(&url).await?;
        Ok(ingest_ohlc_rows(response.ohlc))
    }

    async fn fetch_holders(
        &self,
        id: &str,
        range: ChartRange,
    ) -> Result<Vec<HolderPoint>, ChartError> {
        let url = format!(
            "{}/{}/{}?range={}",
            self.base_url,
            MARKET.endpoints.holders_path,
            id,
            range.api_param(),
        );

        let response: HoldersResponse = self.get_json(&url).await?;
        Ok(ingest_holder_history(response.history))
    }
}

/// Convert wire rows `[time_ms, open, high, low, close, volume]` to candles.
/// Short rows are dropped; volumes are floored at zero.
fn ingest_ohlc_rows(rows: Vec<Vec<RawNumber>>) -> Vec<Candle> {
    let total = rows.len();
    let candles: Vec<Candle> = rows.iter().filter_map(|row| parse_ohlc_row(row)).collect();

    if candles.len() < total {
        log::warn!(
            "Dropped {} malformed OHLC rows out of {}",
            total - candles.len(),
            total
        );
    }
    candles
}

fn parse_ohlc_row(row: &[RawNumber]) -> Option<Candle> {
    if row.len() < 6 {
        return None;
    }

    let time = epoch_ms_to_sec(row[0].normalized() as i64);
    Some(Candle {
        time,
        open: row[1].normalized(),
        high: row[2].normalized(),
        low: row[3].normalized(),
        close: row[4].normalized(),
        volume: row[5].normalized().max(0.0),
    })
}

fn ingest_holder_history(history: Vec<RawHolderPoint>) -> Vec<HolderPoint> {
    let points = history
        .into_iter()
        .map(|raw| HolderPoint {
            time: epoch_ms_to_sec(raw.time),
            length: raw.length,
            top10: raw.top10,
            top20: raw.top20,
            top50: raw.top50,
            top100: raw.top100,
            active_24h: raw.active_24h,
        })
        .collect();

    dedup_holder_points(points)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ohlc_payload_with_mixed_field_types() {
        let payload = r#"{
            "ohlc": [
                [60000, "1.5", 1.6, "1.4", "1.55", 50],
                [0, 1, 2, 0.5, 1.5, 100]
            ]
        }"#;
        let response: OhlcResponse = serde_json::from_str(payload).unwrap();
        let candles = ingest_ohlc_rows(response.ohlc);

        assert_eq!(candles.len(), 2);
        // ms -> s on ingestion
        assert_eq!(candles[0].time, 60);
        assert_eq!(candles[0].close, 1.55);
        assert_eq!(candles[1].time, 0);
    }

    #[test]
    fn test_ohlc_scientific_strings_clamp_to_zero() {
        let payload = r#"{"ohlc": [[0, "1.2e-12", "1.2e-12", "1.2e-12", "1.2e-12", 10]]}"#;
        let response: OhlcResponse = serde_json::from_str(payload).unwrap();
        let candles = ingest_ohlc_rows(response.ohlc);

        assert_eq!(candles.len(), 1);
        assert_eq!(candles[0].close, 0.0);
    }

    #[test]
    fn test_ohlc_short_rows_dropped_and_empty_ok() {
        let payload = r#"{"ohlc": [[60000, 1.0], [0, 1, 2, 0.5, 1.5, -7]]}"#;
        let response: OhlcResponse = serde_json::from_str(payload).unwrap();
        let candles = ingest_ohlc_rows(response.ohlc);

        assert_eq!(candles.len(), 1);
        assert_eq!(candles[0].volume, 0.0); // negative volume floored

        let empty: OhlcResponse = serde_json::from_str(r#"{}"#).unwrap();
        assert!(ingest_ohlc_rows(empty.ohlc).is_empty());
    }

    #[test]
    fn test_holders_payload_dedupes_by_timestamp() {
        let payload = r#"{
            "history": [
                {"time": 10000, "length": 100, "top10": 40.0, "active24H": 5},
                {"time": 10000, "length": 120, "top10": 41.0, "active24H": 6},
                {"time": 5000, "length": 50}
            ]
        }"#;
        let response: HoldersResponse = serde_json::from_str(payload).unwrap();
        let points = ingest_holder_history(response.history);

        assert_eq!(points.len(), 2);
        assert_eq!(points[0].time, 5);
        assert_eq!(points[1].length, 120); // later entry wins
        assert_eq!(points[1].active_24h, 6);
    }
}
