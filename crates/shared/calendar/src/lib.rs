//! Vigil Trading Calendars
//!
//! Rule-based implementations of the [`TradingCalendar`] port. Holidays are
//! derived from their statutory rules rather than looked up in a table, so
//! the calendar needs no refresh as years roll over. Ad-hoc closures
//! (national days of mourning and the like) are supplied by the caller.

mod nyse;

pub use nyse::NyseCalendar;

pub use vigil_ports::{Session, TradingCalendar};
