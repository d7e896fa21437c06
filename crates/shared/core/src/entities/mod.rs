mod bar;
mod notification;
mod quote;
mod series;

pub use bar::Bar;
pub use notification::{Ledger, Notification};
pub use quote::{IntradayContext, IntradayQuote};
pub use series::Series;
