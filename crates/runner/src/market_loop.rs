//! Market Loop - one polling iteration for one symbol
//!
//! ```text
//! iterate()
//!   1. day check ──gap──► archive + forced download
//!        │        └─ordinary─► cached series if fresh, else download
//!   2. intraday  (market open only) ─► merge on a copy ─► persist ─► commit
//!   3. live      ─► push LiveUpdate to `live`
//!   4. analytics ─► per subscribed `analytics-<name>`: execute, notify, push
//! ```
//!
//! The loop owns its recorded current day; the series is shared with the
//! server's request accessors through an `Arc` snapshot swapped on commit.

use crate::error::{Result, ServerError};
use chrono::NaiveDate;
use log::{debug, error, info, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use vigil_core::{Bar, IntradayContext, Series, Timestamp};
use vigil_gateway::{AnalyticsUpdate, ConnectionPools, LiveUpdate, Pools};
use vigil_notifier::Notifier;
use vigil_ports::{Clock, MarketDataSource, SeriesStore, StoreError, TradingCalendar};
use vigil_strategy::AnalyticsRegistry;

/// Latest committed series, shared between the loop and request accessors
pub type SharedSeries = Arc<RwLock<Option<Arc<Series>>>>;

/// Collaborators shared by every market server of a process
#[derive(Clone)]
pub struct ServerDeps {
    pub source: Arc<dyn MarketDataSource>,
    pub store: Arc<dyn SeriesStore>,
    pub calendar: Arc<dyn TradingCalendar>,
    pub clock: Arc<dyn Clock>,
    pub registry: Arc<AnalyticsRegistry>,
}

/// Per-server loop settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoopSettings {
    pub poll_interval: Duration,
    pub trim_provisional: bool,
}

impl Default for LoopSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(60),
            trim_provisional: true,
        }
    }
}

/// What the day check found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayTransition {
    /// Same day as recorded
    Unchanged,
    /// Weekend or holiday
    NonTradingDay,
    /// Next trading day (or first observed day)
    Ordinary,
    /// One or more trading days were missed
    Gap,
}

/// Summary of one iteration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IterationOutcome {
    pub day: DayTransition,
    /// Bar merged from the latest intraday quote
    pub merged: Option<Bar>,
}

pub struct MarketLoop {
    symbol: String,
    deps: ServerDeps,
    notifier: Arc<Notifier>,
    pools: Arc<ConnectionPools>,
    series: SharedSeries,
    settings: LoopSettings,
    current_day: Option<NaiveDate>,
}

impl MarketLoop {
    pub fn new(
        symbol: impl Into<String>,
        deps: ServerDeps,
        notifier: Arc<Notifier>,
        pools: Arc<ConnectionPools>,
        series: SharedSeries,
        settings: LoopSettings,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            deps,
            notifier,
            pools,
            series,
            settings,
            current_day: None,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Recorded current trading day
    pub fn current_day(&self) -> Option<NaiveDate> {
        self.current_day
    }

    async fn snapshot(&self) -> Option<Arc<Series>> {
        self.series.read().await.clone()
    }

    async fn commit(&self, series: Series) {
        *self.series.write().await = Some(Arc::new(series));
    }

    /// Initial load: the persisted series when there is a usable one, a
    /// download otherwise. The day of its last bar becomes the current day,
    /// so the first day check refreshes it and days missed while stopped
    /// count as a gap.
    pub async fn startup(&mut self) -> Result<()> {
        let series = match self.load_cached().await? {
            Some(series) => series,
            None => self.reload(true).await?,
        };
        info!(
            "[{}] Loaded {} bars (last {:?})",
            self.symbol,
            series.len(),
            series.last_date()
        );
        self.current_day = series.last_date();
        self.commit(series).await;
        Ok(())
    }

    /// Run one iteration; failures are logged and the affected step skipped
    pub async fn iterate(&mut self) -> IterationOutcome {
        let day = match self.check_day().await {
            Ok(day) => day,
            Err(e) => {
                error!("[{}] Day check failed: {}", self.symbol, e);
                DayTransition::Unchanged
            }
        };

        let merged = match self.update_intraday().await {
            Ok(merged) => merged,
            Err(e) => {
                warn!("[{}] Intraday update skipped: {}", self.symbol, e);
                None
            }
        };

        if let Some((timestamp, bar, session_day)) = merged {
            self.broadcast_live(timestamp, &bar).await;
            self.fan_out_analytics(session_day).await;
        }

        IterationOutcome {
            day,
            merged: merged.map(|(_, bar, _)| bar),
        }
    }

    async fn check_day(&mut self) -> Result<DayTransition> {
        let today = self.deps.calendar.local_day(self.deps.clock.now());
        let loaded = self.series.read().await.is_some();
        if self.current_day == Some(today) && loaded {
            return Ok(DayTransition::Unchanged);
        }
        if !self.deps.calendar.is_trading_day(today)? {
            return Ok(DayTransition::NonTradingDay);
        }

        let gap = match self.current_day {
            Some(previous) if previous != today => !self
                .deps
                .calendar
                .is_immediate_next_trading_day(previous, today)?,
            _ => false,
        };
        let transition = if gap {
            DayTransition::Gap
        } else {
            DayTransition::Ordinary
        };

        // A failed archive leaves the day unrecorded so the gap is retried
        if transition == DayTransition::Gap {
            warn!(
                "[{}] Gap detected before {}, archiving persisted series",
                self.symbol, today
            );
            self.deps.store.archive(&self.symbol).await?;
        }
        self.current_day = Some(today);

        let reloaded = self.reload(transition == DayTransition::Gap).await;

        match reloaded {
            Ok(series) => {
                info!(
                    "[{}] New trading day {} ({:?}), {} bars",
                    self.symbol,
                    today,
                    transition,
                    series.len()
                );
                self.commit(series).await;
            }
            Err(e) => error!("[{}] Reload for {} failed: {}", self.symbol, today, e),
        }
        Ok(transition)
    }

    /// Load the series, downloading when forced, missing, corrupt or stale.
    /// A failed or empty download falls back to the persisted copy.
    async fn reload(&self, force: bool) -> Result<Series> {
        let cached = if force { None } else { self.load_cached().await? };

        if let Some(cached) = &cached {
            if self.is_fresh(cached)? {
                debug!("[{}] Persisted series is fresh", self.symbol);
                return Ok(cached.clone());
            }
        }

        match self.deps.source.fetch_history(&self.symbol).await {
            Ok(series) if !series.is_empty() => {
                self.deps.store.save(&self.symbol, &series).await?;
                info!(
                    "[{}] Downloaded {} bars from {}",
                    self.symbol,
                    series.len(),
                    self.deps.source.name()
                );
                Ok(series)
            }
            Ok(_) => {
                warn!("[{}] {} returned no history", self.symbol, self.deps.source.name());
                cached.ok_or_else(|| ServerError::NoData(self.symbol.clone()))
            }
            Err(e) => {
                warn!("[{}] History download failed: {}", self.symbol, e);
                cached.ok_or(ServerError::Source(e))
            }
        }
    }

    async fn load_cached(&self) -> Result<Option<Series>> {
        match self.deps.store.load(&self.symbol).await {
            Ok(Some(series)) if series.is_empty() => {
                warn!("[{}] Persisted series is empty, archiving it", self.symbol);
                self.deps.store.archive(&self.symbol).await?;
                Ok(None)
            }
            Ok(series) => Ok(series),
            Err(StoreError::Corrupt { path, reason }) => {
                warn!("[{}] Corrupt series {}: {}, archiving it", self.symbol, path, reason);
                self.deps.store.archive(&self.symbol).await?;
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Fresh when it reaches the trading day before today
    fn is_fresh(&self, series: &Series) -> Result<bool> {
        let today = self.deps.calendar.local_day(self.deps.clock.now());
        let Some(last) = series.last_date() else {
            return Ok(false);
        };
        Ok(match self.deps.calendar.previous_trading_day(today)? {
            Some(previous) => last >= previous,
            None => true,
        })
    }

    /// Merge the latest completed intraday bar while the market is open
    async fn update_intraday(&mut self) -> Result<Option<(Timestamp, Bar, NaiveDate)>> {
        let now = self.deps.clock.now();
        if !self.deps.calendar.is_open(now)? {
            return Ok(None);
        }
        let Some(current) = self.snapshot().await else {
            return Err(ServerError::NotReady(format!(
                "{} has no series loaded",
                self.symbol
            )));
        };

        let session_day = self.deps.calendar.local_day(now);
        let context = IntradayContext::new(session_day, current.last_before(session_day).copied());
        let Some(quote) = self
            .deps
            .source
            .fetch_latest_intraday(&self.symbol, &context)
            .await?
        else {
            debug!("[{}] No completed intraday bar yet", self.symbol);
            return Ok(None);
        };

        let bar = quote.to_bar(session_day);
        let mut merged = (*current).clone();
        merged.upsert(bar);
        self.deps.store.save(&self.symbol, &merged).await?;
        self.commit(merged).await;
        debug!(
            "[{}] Merged intraday bar {} close {:.2}",
            self.symbol, session_day, bar.close
        );
        Ok(Some((quote.timestamp, bar, session_day)))
    }

    async fn broadcast_live(&self, timestamp: Timestamp, bar: &Bar) {
        let update = LiveUpdate::new(&self.symbol, timestamp, self.deps.calendar.timezone(), bar);
        match serde_json::to_string(&update) {
            Ok(payload) => {
                let outcome = self.pools.push(Pools::LIVE, &payload).await;
                debug!(
                    "[{}] Live update delivered to {} ({} pruned)",
                    self.symbol, outcome.delivered, outcome.pruned
                );
            }
            Err(e) => error!("[{}] Failed to encode live update: {}", self.symbol, e),
        }
    }

    async fn fan_out_analytics(&self, session_day: NaiveDate) {
        let Some(series) = self.snapshot().await else {
            return;
        };
        for name in self.pools.subscribed_strategies() {
            if !self.deps.registry.exists(&name) {
                debug!("[{}] No strategy for pool {}", self.symbol, Pools::analytics(&name));
                continue;
            }
            if let Err(e) = self.run_analytics(&name, &series, session_day).await {
                error!("[{}] Analytics {} failed: {}", self.symbol, name, e);
            }
        }
    }

    async fn run_analytics(&self, name: &str, series: &Series, session_day: NaiveDate) -> Result<()> {
        let registry = &self.deps.registry;
        let (live, notification) = registry.execute(name, series, &self.symbol, true)?;

        if let Some(notification) = notification {
            match self.notifier.register(notification).await {
                Ok(true) => {}
                Ok(false) => debug!("[{}] {} notification in cooldown", self.symbol, name),
                Err(e) => warn!("[{}] {} notification not delivered: {}", self.symbol, name, e),
            }
        }

        let result = if self.settings.trim_provisional {
            let closed = series.before(session_day);
            registry.get(name)?.compute(closed.bars(), true)?
        } else {
            live
        };

        let update = AnalyticsUpdate::new(&self.symbol, name, serde_json::to_value(&result)?);
        let payload = serde_json::to_string(&update)?;
        self.pools.push(&Pools::analytics(name), &payload).await;
        Ok(())
    }
}
