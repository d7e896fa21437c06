//! Vigil Ports
//!
//! Port definitions (traits) for the Vigil market synchronisation engine.
//! These define the boundaries between the per-symbol orchestration logic
//! and the collaborators it depends on:
//!
//! - [`Clock`]: where "now" comes from
//! - [`TradingCalendar`]: trading days and session hours
//! - [`MarketDataSource`]: daily history and intraday quotes
//! - [`SeriesStore`] / [`LedgerStore`]: durable state
//! - [`AlertChannel`]: outbound alert delivery

mod alert;
mod calendar;
mod clock;
mod error;
mod market_data;
mod store;

pub use alert::AlertChannel;
pub use calendar::{Session, TradingCalendar};
pub use clock::Clock;
pub use error::{AlertError, SourceError, SourceResult, StoreError, StoreResult};
pub use market_data::MarketDataSource;
pub use store::{LedgerStore, SeriesStore};
