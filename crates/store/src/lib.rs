//! Vigil Store
//!
//! File-backed implementations of the storage ports:
//!
//! - [`JsonSeriesStore`]: one JSON document per symbol under a data
//!   directory, replaced atomically on every save, moved to a `stale/`
//!   directory when archived under the injected clock's UTC time
//! - [`JsonLedgerStore`]: the notification ledger of one symbol
//!
//! ```text
//! <data_dir>/
//!   GSPC.json                      daily series
//!   stale/GSPC_20240311_093100.json archived copies
//!   notifications/GSPC.json        ledger
//! ```

mod fs;
mod ledger;
mod series;

pub use ledger::JsonLedgerStore;
pub use series::JsonSeriesStore;
