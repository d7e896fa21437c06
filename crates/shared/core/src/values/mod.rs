use chrono::{DateTime, Utc};

/// Timestamp in UTC
pub type Timestamp = DateTime<Utc>;

/// Filesystem-safe form of a symbol: index carets are dropped and any
/// character outside `[A-Za-z0-9._-]` becomes `_`.
pub fn sanitize_symbol(symbol: &str) -> String {
    symbol
        .chars()
        .filter(|c| *c != '^')
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}
