//! Strategy Trait and Results
//!
//! A strategy is a pure computation over a daily bar series plus a
//! notification step that inspects its own result. Strategies hold only
//! immutable configuration, so one instance serves every symbol.

use crate::dummy::DummyResult;
use crate::error::Result;
use crate::sma::SmaResult;
use chrono::NaiveDate;
use serde::Serialize;
use vigil_core::{Bar, Notification, Timestamp};

/// Trading signal emitted per computed point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Signal {
    Buy,
    Sell,
    Hold,
}

impl Signal {
    pub fn label(&self) -> &'static str {
        match self {
            Signal::Buy => "BUY",
            Signal::Sell => "SELL",
            Signal::Hold => "HOLD",
        }
    }
}

/// Output of a strategy run
///
/// Full mode carries every computed point as aligned columns, streaming
/// mode the same columns holding only the latest point.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StrategyResult {
    Sma(SmaResult),
    Dummy(DummyResult),
}

impl StrategyResult {
    pub fn kind(&self) -> &'static str {
        match self {
            StrategyResult::Sma(_) => "sma",
            StrategyResult::Dummy(_) => "dummy",
        }
    }

    /// Number of computed points
    pub fn len(&self) -> usize {
        match self {
            StrategyResult::Sma(r) => r.dates.len(),
            StrategyResult::Dummy(r) => r.dates.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        match self {
            StrategyResult::Sma(r) => r.dates.last().copied(),
            StrategyResult::Dummy(r) => r.dates.last().copied(),
        }
    }
}

/// Who and when, for notifications built from a result
#[derive(Debug, Clone, Copy)]
pub struct NotificationContext<'a> {
    /// Registered name of the strategy
    pub strategy: &'a str,
    pub symbol: &'a str,
    pub now: Timestamp,
}

/// Capability set every analytics strategy provides
pub trait Strategy: Send + Sync {
    /// Short identifier of the implementation
    fn name(&self) -> &str;

    /// Compute over `bars` (ascending, unique dates). Recomputes from
    /// scratch on every call.
    fn compute(&self, bars: &[Bar], streaming: bool) -> Result<StrategyResult>;

    /// Inspect the latest point of `result` and build at most one
    /// notification
    fn generate_notifications(
        &self,
        result: &StrategyResult,
        ctx: &NotificationContext<'_>,
    ) -> Result<Option<Notification>>;
}
