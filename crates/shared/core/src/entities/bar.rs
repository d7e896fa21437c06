use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One trading day of OHLCV data for a symbol.
///
/// `date` is the calendar day in the market's trading timezone.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub adj_close: f64,
    pub volume: f64,
}

impl Bar {
    pub fn new(
        date: NaiveDate,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        adj_close: f64,
        volume: f64,
    ) -> Self {
        Self {
            date,
            open,
            high,
            low,
            close,
            adj_close,
            volume,
        }
    }

    /// Ratio between adjusted and raw close, 1.0 when it cannot be derived
    pub fn adjustment_factor(&self) -> f64 {
        if self.close > 0.0 && self.adj_close.is_finite() {
            self.adj_close / self.close
        } else {
            1.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adjustment_factor() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 8).unwrap();
        let bar = Bar::new(date, 10.0, 11.0, 9.0, 10.0, 8.0, 100.0);
        assert_eq!(bar.adjustment_factor(), 0.8);

        let zero = Bar::new(date, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0);
        assert_eq!(zero.adjustment_factor(), 1.0);
    }
}
