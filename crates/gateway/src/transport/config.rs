//! Pool naming

/// Names of the subscriber pools
///
/// Raw price updates go to `live`; each strategy's streaming output goes to
/// `analytics-<strategy>`.
pub struct Pools;

impl Pools {
    /// Raw bar updates
    pub const LIVE: &'static str = "live";

    const ANALYTICS_PREFIX: &'static str = "analytics-";

    /// Streaming output of a strategy: `analytics-sma`
    pub fn analytics(strategy: &str) -> String {
        format!("{}{}", Self::ANALYTICS_PREFIX, strategy)
    }

    /// Strategy name of an analytics pool, `None` for any other pool
    pub fn strategy_of(pool: &str) -> Option<&str> {
        pool.strip_prefix(Self::ANALYTICS_PREFIX)
            .filter(|name| !name.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pools() {
        assert_eq!(Pools::analytics("sma"), "analytics-sma");
        assert_eq!(Pools::strategy_of("analytics-sma"), Some("sma"));
        assert_eq!(Pools::strategy_of("analytics-"), None);
        assert_eq!(Pools::strategy_of(Pools::LIVE), None);
    }
}
