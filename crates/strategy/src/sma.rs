//! SMA Threshold Strategy
//!
//! Bands around the simple moving average of the adjusted close:
//!
//! ```text
//!   upper = sma * (1 + upper_pct)      price >= upper, flat     -> BUY
//!   sma   = mean(adj_close[i-w+1..=i])
//!   lower = sma * (1 - lower_pct)      price <  lower, invested -> SELL
//! ```
//!
//! A single left-to-right scan tracks whether the strategy is invested, so
//! a BUY fires only on the first crossing of the upper band and a SELL only
//! on the first close below the lower band afterwards.

use crate::cooldown::{CooldownSpec, Cooldowns};
use crate::error::{AnalyticsError, ConfigError, Result};
use crate::strategy::{NotificationContext, Signal, Strategy, StrategyResult};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use vigil_core::{Bar, Notification};

/// Reminder percentages used when none are configured
pub const DEFAULT_REMINDERS: [f64; 3] = [5.0, 2.5, 1.0];

/// SMA threshold parameters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SmaConfig {
    /// Trailing window length in bars
    #[serde(default)]
    pub window: Option<usize>,
    /// Upper band offset as a fraction of the SMA (0.02 = 2%)
    #[serde(default)]
    pub upper: Option<f64>,
    /// Lower band offset as a fraction of the SMA
    #[serde(default)]
    pub lower: Option<f64>,
    /// Proximity percentages tested while holding
    #[serde(default)]
    pub reminders: Option<Vec<f64>>,
    #[serde(default)]
    pub cooldowns: BTreeMap<String, CooldownSpec>,
}

/// Columnar SMA output, all columns aligned by index
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SmaResult {
    pub window: usize,
    pub dates: Vec<NaiveDate>,
    pub price: Vec<f64>,
    pub sma: Vec<f64>,
    pub upper: Vec<f64>,
    pub lower: Vec<f64>,
    pub signal: Vec<Signal>,
}

/// One row of an [`SmaResult`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmaPoint {
    pub date: NaiveDate,
    pub price: f64,
    pub sma: f64,
    pub upper: f64,
    pub lower: f64,
    pub signal: Signal,
}

impl SmaResult {
    fn empty(window: usize) -> Self {
        Self {
            window,
            ..Default::default()
        }
    }

    fn push(&mut self, point: SmaPoint) {
        self.dates.push(point.date);
        self.price.push(point.price);
        self.sma.push(point.sma);
        self.upper.push(point.upper);
        self.lower.push(point.lower);
        self.signal.push(point.signal);
    }

    pub fn point(&self, index: usize) -> Option<SmaPoint> {
        Some(SmaPoint {
            date: *self.dates.get(index)?,
            price: *self.price.get(index)?,
            sma: *self.sma.get(index)?,
            upper: *self.upper.get(index)?,
            lower: *self.lower.get(index)?,
            signal: *self.signal.get(index)?,
        })
    }

    pub fn latest(&self) -> Option<SmaPoint> {
        self.point(self.dates.len().checked_sub(1)?)
    }
}

/// SMA threshold strategy with reminder notifications
#[derive(Debug, Clone)]
pub struct SmaThreshold {
    window: usize,
    upper: f64,
    lower: f64,
    /// Ascending
    reminders: Vec<f64>,
    cooldowns: Cooldowns,
}

impl SmaThreshold {
    pub fn new(config: &SmaConfig) -> std::result::Result<Self, ConfigError> {
        let window = config
            .window
            .ok_or_else(|| ConfigError::MissingParameter("window".to_string()))?;
        if window == 0 {
            return Err(ConfigError::invalid("window", "must be at least 1"));
        }

        let upper = config
            .upper
            .ok_or_else(|| ConfigError::MissingParameter("upper".to_string()))?;
        if !upper.is_finite() || upper < 0.0 {
            return Err(ConfigError::invalid("upper", "must be a non-negative fraction"));
        }

        let lower = config
            .lower
            .ok_or_else(|| ConfigError::MissingParameter("lower".to_string()))?;
        if !lower.is_finite() || !(0.0..1.0).contains(&lower) {
            return Err(ConfigError::invalid("lower", "must be a fraction in [0, 1)"));
        }

        let mut reminders = config
            .reminders
            .clone()
            .unwrap_or_else(|| DEFAULT_REMINDERS.to_vec());
        if reminders.iter().any(|pct| !pct.is_finite() || *pct <= 0.0) {
            return Err(ConfigError::invalid("reminders", "percentages must be positive"));
        }
        reminders.sort_by(f64::total_cmp);

        Ok(Self {
            window,
            upper,
            lower,
            reminders,
            cooldowns: Cooldowns::parse(&config.cooldowns)?,
        })
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Reminder percentages in the order they are tested
    pub fn reminders(&self) -> &[f64] {
        &self.reminders
    }

    fn scan(&self, bars: &[Bar]) -> Result<SmaResult> {
        let mut result = SmaResult::empty(self.window);
        if bars.len() < self.window {
            return Ok(result);
        }

        if let Some(bad) = bars.iter().find(|b| !b.adj_close.is_finite()) {
            return Err(AnalyticsError::Execution {
                strategy: self.name().to_string(),
                reason: format!("non-finite adjusted close on {}", bad.date),
            });
        }

        let window = self.window as f64;
        let mut invested = false;
        for (end, bar) in bars.iter().enumerate().skip(self.window - 1) {
            let start = end + 1 - self.window;
            let sma = bars[start..=end].iter().map(|b| b.adj_close).sum::<f64>() / window;
            let upper = sma * (1.0 + self.upper);
            let lower = sma * (1.0 - self.lower);
            let price = bar.adj_close;

            let signal = if !invested && price >= upper {
                invested = true;
                Signal::Buy
            } else if invested && price < lower {
                invested = false;
                Signal::Sell
            } else {
                Signal::Hold
            };

            result.push(SmaPoint {
                date: bar.date,
                price,
                sma,
                upper,
                lower,
                signal,
            });
        }
        Ok(result)
    }

    /// First reminder percentage the point falls within, BUY side first
    fn reminder_label(&self, point: &SmaPoint) -> Option<(String, String)> {
        for pct in &self.reminders {
            if point.price < point.upper
                && (point.upper - point.price) / point.upper * 100.0 <= *pct
            {
                return Some((
                    format!("BUY_REMINDER_{:.1}%", pct),
                    format!(
                        "price {:.2} is within {:.1}% of the upper band {:.2}",
                        point.price, pct, point.upper
                    ),
                ));
            }
            if point.price > point.lower
                && (point.price - point.lower) / point.lower * 100.0 <= *pct
            {
                return Some((
                    format!("SELL_REMINDER_{:.1}%", pct),
                    format!(
                        "price {:.2} is within {:.1}% of the lower band {:.2}",
                        point.price, pct, point.lower
                    ),
                ));
            }
        }
        None
    }
}

impl Strategy for SmaThreshold {
    fn name(&self) -> &str {
        "sma"
    }

    fn compute(&self, bars: &[Bar], streaming: bool) -> Result<StrategyResult> {
        let full = self.scan(bars)?;
        if !streaming {
            return Ok(StrategyResult::Sma(full));
        }

        let mut latest = SmaResult::empty(self.window);
        if let Some(point) = full.latest() {
            latest.push(point);
        }
        Ok(StrategyResult::Sma(latest))
    }

    fn generate_notifications(
        &self,
        result: &StrategyResult,
        ctx: &NotificationContext<'_>,
    ) -> Result<Option<Notification>> {
        let StrategyResult::Sma(sma) = result else {
            return Err(AnalyticsError::ResultMismatch {
                strategy: ctx.strategy.to_string(),
                found: result.kind().to_string(),
            });
        };
        let Some(point) = sma.latest() else {
            return Ok(None);
        };

        let (label, detail) = match point.signal {
            Signal::Buy => (
                Signal::Buy.label().to_string(),
                format!(
                    "BUY signal: price {:.2} reached the upper band {:.2}",
                    point.price, point.upper
                ),
            ),
            Signal::Sell => (
                Signal::Sell.label().to_string(),
                format!(
                    "SELL signal: price {:.2} fell below the lower band {:.2}",
                    point.price, point.lower
                ),
            ),
            Signal::Hold => match self.reminder_label(&point) {
                Some(reminder) => reminder,
                None => return Ok(None),
            },
        };

        let message = format!(
            "{} {}: {} (SMA{} {:.2})",
            ctx.symbol, point.date, detail, self.window, point.sma
        );
        let cooldown = self.cooldowns.get(&label);
        Ok(Some(Notification::new(
            ctx.strategy,
            label,
            ctx.now,
            message,
            cooldown,
        )))
    }
}
