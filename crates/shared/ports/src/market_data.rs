use crate::error::SourceResult;
use async_trait::async_trait;
use vigil_core::{IntradayContext, IntradayQuote, Series};

/// Port for the upstream market data provider
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Full daily history for `symbol`; an empty series when none is available
    async fn fetch_history(&self, symbol: &str) -> SourceResult<Series>;

    /// Most recent *completed* intraday bar for the context's session, or
    /// `None` when nothing has completed yet
    async fn fetch_latest_intraday(
        &self,
        symbol: &str,
        context: &IntradayContext,
    ) -> SourceResult<Option<IntradayQuote>>;

    /// Provider name for logging
    fn name(&self) -> &str {
        "MarketDataSource"
    }
}
