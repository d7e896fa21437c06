//! Yahoo Finance chart API adapter
//!
//! ```text
//! GET {base}/v8/finance/chart/{symbol}?range=max&interval=1d&events=div,split
//!     -> full daily history with adjusted closes
//! GET {base}/v8/finance/chart/{symbol}?interval=1m&period1=now-2m&period2=now-1m
//!     -> last completed one-minute bar of the session
//! ```
//!
//! Intraday bars carry no adjusted close; it is derived from the
//! adjustment factor of the reference bar in the request context.

use crate::error::GatewayError;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use log::{debug, info};
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use std::sync::Arc;
use vigil_core::{Bar, IntradayContext, IntradayQuote, Series, Timestamp};
use vigil_ports::{Clock, MarketDataSource, SourceResult};

pub const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";

const REQUEST_TIMEOUT_SECS: u64 = 15;
const INTRADAY_INTERVAL_SECS: i64 = 60;

/// One row of a chart response, complete prices only
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartRow {
    pub timestamp: Timestamp,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub adj_close: Option<f64>,
    pub volume: f64,
}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<QuoteColumns>,
    #[serde(default)]
    adjclose: Vec<AdjCloseColumn>,
}

#[derive(Debug, Default, Deserialize)]
struct QuoteColumns {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct AdjCloseColumn {
    #[serde(default)]
    adjclose: Vec<Option<f64>>,
}

fn column(values: &[Option<f64>], index: usize) -> Option<f64> {
    values.get(index).copied().flatten().filter(|v| v.is_finite())
}

/// Parse a chart response body; rows with missing prices are skipped
pub fn parse_chart(symbol: &str, body: &str) -> Result<Vec<ChartRow>, GatewayError> {
    let envelope: ChartEnvelope = serde_json::from_str(body)?;
    if let Some(error) = envelope.chart.error {
        return Err(if error.code.eq_ignore_ascii_case("Not Found") {
            GatewayError::UnknownSymbol(symbol.to_string())
        } else {
            GatewayError::Conversion(format!(
                "{}: {}",
                error.code,
                error.description.unwrap_or_default()
            ))
        });
    }

    let Some(result) = envelope.chart.result.and_then(|r| r.into_iter().next()) else {
        return Ok(Vec::new());
    };
    let quote = result.indicators.quote.into_iter().next().unwrap_or_default();
    let adjclose = result
        .indicators
        .adjclose
        .into_iter()
        .next()
        .map(|c| c.adjclose)
        .unwrap_or_default();

    let rows = result
        .timestamp
        .iter()
        .enumerate()
        .filter_map(|(i, secs)| {
            Some(ChartRow {
                timestamp: DateTime::<Utc>::from_timestamp(*secs, 0)?,
                open: column(&quote.open, i)?,
                high: column(&quote.high, i)?,
                low: column(&quote.low, i)?,
                close: column(&quote.close, i)?,
                adj_close: column(&adjclose, i),
                volume: column(&quote.volume, i).unwrap_or(0.0),
            })
        })
        .collect();
    Ok(rows)
}

/// Daily rows to a series keyed by market-timezone date
pub fn rows_to_series(rows: &[ChartRow], market_tz: Tz) -> Series {
    Series::from_bars(
        rows.iter()
            .map(|row| {
                Bar::new(
                    row.timestamp.with_timezone(&market_tz).date_naive(),
                    row.open,
                    row.high,
                    row.low,
                    row.close,
                    row.adj_close.unwrap_or(row.close),
                    row.volume,
                )
            })
            .collect(),
    )
}

/// Latest intraday row of the context's session that has completed by `now`
pub fn latest_completed(
    rows: &[ChartRow],
    context: &IntradayContext,
    now: Timestamp,
    market_tz: Tz,
) -> Option<IntradayQuote> {
    let factor = context.adjustment_factor();
    rows.iter()
        .filter(|row| row.timestamp.with_timezone(&market_tz).date_naive() == context.session_day)
        .filter(|row| row.timestamp + Duration::seconds(INTRADAY_INTERVAL_SECS) <= now)
        .max_by_key(|row| row.timestamp)
        .map(|row| IntradayQuote {
            timestamp: row.timestamp,
            open: row.open,
            high: row.high,
            low: row.low,
            close: row.close,
            adj_close: row.close * factor,
            volume: row.volume,
        })
}

/// Yahoo Finance implementation of the market data port
pub struct YahooFinanceSource {
    client: reqwest::Client,
    base_url: Url,
    market_tz: Tz,
    clock: Arc<dyn Clock>,
}

impl YahooFinanceSource {
    pub fn new(base_url: &str, market_tz: Tz, clock: Arc<dyn Clock>) -> Result<Self, GatewayError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| GatewayError::Connection(format!("invalid base url {}: {}", base_url, e)))?;
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(concat!("vigil/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            base_url,
            market_tz,
            clock,
        })
    }

    /// Chart endpoint for `symbol` with the given query
    pub fn chart_url(&self, symbol: &str, query: &[(&str, String)]) -> Result<Url, GatewayError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| GatewayError::Connection(format!("base url {} cannot hold a path", self.base_url)))?
            .pop_if_empty()
            .extend(["v8", "finance", "chart", symbol]);
        url.query_pairs_mut()
            .extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())));
        Ok(url)
    }

    async fn fetch_chart(&self, symbol: &str, query: &[(&str, String)]) -> Result<Vec<ChartRow>, GatewayError> {
        let url = self.chart_url(symbol, query)?;
        debug!("[{}] GET {}", symbol, url);

        let response = self.client.get(url).send().await?;
        match response.status() {
            StatusCode::NOT_FOUND => return Err(GatewayError::UnknownSymbol(symbol.to_string())),
            status if !status.is_success() => {
                return Err(GatewayError::Connection(format!("HTTP {} for {}", status, symbol)));
            }
            _ => {}
        }
        let body = response.text().await?;
        parse_chart(symbol, &body)
    }
}

#[async_trait]
impl MarketDataSource for YahooFinanceSource {
    async fn fetch_history(&self, symbol: &str) -> SourceResult<Series> {
        let query = [
            ("range", "max".to_string()),
            ("interval", "1d".to_string()),
            ("events", "div,split".to_string()),
        ];
        let rows = self.fetch_chart(symbol, &query).await?;
        let series = rows_to_series(&rows, self.market_tz);
        info!("[{}] Downloaded {} daily bars", symbol, series.len());
        Ok(series)
    }

    async fn fetch_latest_intraday(
        &self,
        symbol: &str,
        context: &IntradayContext,
    ) -> SourceResult<Option<IntradayQuote>> {
        let now = self.clock.now();
        let period1 = now - Duration::seconds(2 * INTRADAY_INTERVAL_SECS);
        let period2 = now - Duration::seconds(INTRADAY_INTERVAL_SECS);
        let query = [
            ("interval", "1m".to_string()),
            ("period1", period1.timestamp().to_string()),
            ("period2", period2.timestamp().to_string()),
        ];
        let rows = self.fetch_chart(symbol, &query).await?;
        Ok(latest_completed(&rows, context, now, self.market_tz))
    }

    fn name(&self) -> &str {
        "YahooFinance"
    }
}
