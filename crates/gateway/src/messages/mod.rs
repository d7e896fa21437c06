//! Wire message types
//!
//! Messages pushed to subscriber pools, serialized as JSON.

pub mod market_data;
