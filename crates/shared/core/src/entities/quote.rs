use super::Bar;
use crate::values::Timestamp;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Most recent completed intraday bar returned by a market data source
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntradayQuote {
    /// Start of the intraday interval (UTC)
    pub timestamp: Timestamp,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub adj_close: f64,
    pub volume: f64,
}

impl IntradayQuote {
    /// Daily bar for `trading_day` carrying this quote's values
    pub fn to_bar(&self, trading_day: NaiveDate) -> Bar {
        Bar::new(
            trading_day,
            self.open,
            self.high,
            self.low,
            self.close,
            self.adj_close,
            self.volume,
        )
    }
}

/// What a market data source is told when asked for an intraday bar.
///
/// Only the current session is requested; `reference` is the last bar of an
/// already closed day, used to back-adjust the intraday close.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntradayContext {
    pub session_day: NaiveDate,
    pub reference: Option<Bar>,
}

impl IntradayContext {
    pub fn new(session_day: NaiveDate, reference: Option<Bar>) -> Self {
        Self {
            session_day,
            reference,
        }
    }

    /// Adjustment factor to apply to raw intraday closes
    pub fn adjustment_factor(&self) -> f64 {
        self.reference.map(|b| b.adjustment_factor()).unwrap_or(1.0)
    }
}
