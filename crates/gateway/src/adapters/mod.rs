//! Market data adapters
//!
//! Implementations of the `MarketDataSource` port for external providers.

pub mod yahoo;
