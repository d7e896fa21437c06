//! Market data message types

use chrono::SecondsFormat;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use vigil_core::{Bar, Timestamp};

/// Prices and volume of one bar
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ohlcv {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub adj_close: f64,
    pub volume: f64,
}

impl From<&Bar> for Ohlcv {
    fn from(bar: &Bar) -> Self {
        Self {
            open: bar.open,
            high: bar.high,
            low: bar.low,
            close: bar.close,
            adj_close: bar.adj_close,
            volume: bar.volume,
        }
    }
}

/// Raw bar update published to the `live` pool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveUpdate {
    pub symbol: String,
    /// RFC 3339 in the market timezone
    pub timestamp: String,
    pub ohlcv: Ohlcv,
}

impl LiveUpdate {
    pub fn new(symbol: impl Into<String>, timestamp: Timestamp, market_tz: Tz, bar: &Bar) -> Self {
        Self {
            symbol: symbol.into(),
            timestamp: timestamp
                .with_timezone(&market_tz)
                .to_rfc3339_opts(SecondsFormat::Secs, false),
            ohlcv: Ohlcv::from(bar),
        }
    }
}

/// Streaming strategy output published to `analytics-<strategy>`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsUpdate {
    pub symbol: String,
    pub strategy: String,
    pub data: serde_json::Value,
}

impl AnalyticsUpdate {
    pub fn new(
        symbol: impl Into<String>,
        strategy: impl Into<String>,
        data: serde_json::Value,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            strategy: strategy.into(),
            data,
        }
    }
}
