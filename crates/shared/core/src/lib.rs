//! Vigil Core Domain
//!
//! Pure domain types for the Vigil market synchronisation engine.
//! This crate contains no async, no I/O, and is 100% unit testable.

pub mod entities;
pub mod values;

// Re-export commonly used types at crate root
pub use entities::{
    // Market data
    Bar,
    IntradayContext,
    IntradayQuote,
    Series,
    // Alerts
    Ledger,
    Notification,
};
pub use values::{Timestamp, sanitize_symbol};
