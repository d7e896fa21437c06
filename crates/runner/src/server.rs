//! Market Server - per-symbol orchestrator
//!
//! ```text
//!   Stopped ──start()──► Starting ──history loaded──► Running
//!      ▲                                                │
//!      └──────── Stopping ◄────────── stop() ───────────┘
//! ```
//!
//! One tokio task per server runs the `MarketLoop`. Cancellation is a
//! `watch` signal raced against the startup load, every iteration and every
//! sleep.

use crate::error::{Result, ServerError};
use crate::market_loop::{LoopSettings, MarketLoop, ServerDeps, SharedSeries};
use log::{debug, error, info, warn};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::{RwLock, watch};
use tokio::task::JoinHandle;
use vigil_core::Series;
use vigil_gateway::{Connection, ConnectionId, ConnectionPools, Pools};
use vigil_notifier::Notifier;
use vigil_strategy::StrategyResult;

/// Lifecycle state of a market server
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    Stopped,
    Starting,
    Running,
    Stopping,
}

struct LoopTask {
    cancel: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

pub struct MarketServer {
    symbol: String,
    deps: ServerDeps,
    notifier: Arc<Notifier>,
    pools: Arc<ConnectionPools>,
    series: SharedSeries,
    settings: LoopSettings,
    state: Arc<Mutex<ServerState>>,
    task: Mutex<Option<LoopTask>>,
}

impl MarketServer {
    pub fn new(
        symbol: impl Into<String>,
        deps: ServerDeps,
        notifier: Arc<Notifier>,
        settings: LoopSettings,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            deps,
            notifier,
            pools: Arc::new(ConnectionPools::new()),
            series: Arc::new(RwLock::new(None)),
            settings,
            state: Arc::new(Mutex::new(ServerState::Stopped)),
            task: Mutex::new(None),
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn state(&self) -> ServerState {
        *lock(&self.state)
    }

    pub fn pools(&self) -> &Arc<ConnectionPools> {
        &self.pools
    }

    /// Spawn the polling loop. No-op while a loop is already running.
    pub fn start(&self) {
        let mut task = lock(&self.task);
        if task.is_some() {
            debug!("[{}] Already started", self.symbol);
            return;
        }

        *lock(&self.state) = ServerState::Starting;
        let (cancel, cancel_rx) = watch::channel(false);
        let market_loop = MarketLoop::new(
            self.symbol.clone(),
            self.deps.clone(),
            self.notifier.clone(),
            self.pools.clone(),
            self.series.clone(),
            self.settings,
        );
        let handle = tokio::spawn(run(
            market_loop,
            self.settings.poll_interval,
            cancel_rx,
            self.state.clone(),
        ));
        *task = Some(LoopTask { cancel, handle });
        info!("[{}] Market server starting", self.symbol);
    }

    /// Cancel the loop, wait for it to unwind and flush the notification
    /// ledger. No-op when not started.
    pub async fn stop(&self) {
        let task = lock(&self.task).take();
        let Some(task) = task else {
            return;
        };

        *lock(&self.state) = ServerState::Stopping;
        let _ = task.cancel.send(true);
        if let Err(e) = task.handle.await {
            error!("[{}] Market loop ended abnormally: {}", self.symbol, e);
        }
        if let Err(e) = self.notifier.close().await {
            warn!("[{}] Failed to flush notifications: {}", self.symbol, e);
        }
        *lock(&self.state) = ServerState::Stopped;
        info!("[{}] Market server stopped", self.symbol);
    }

    /// Latest committed daily series
    pub async fn history(&self) -> Result<Arc<Series>> {
        self.series
            .read()
            .await
            .clone()
            .ok_or_else(|| ServerError::NotReady(format!("{} history not loaded", self.symbol)))
    }

    /// Full-mode result of strategy `name`, without the in-progress bar
    /// while the session is open
    pub async fn analytics(&self, name: &str) -> Result<StrategyResult> {
        if !self.deps.registry.exists(name) {
            return Err(ServerError::NotFound(format!("strategy {}", name)));
        }
        let series = self.history().await?;

        let now = self.deps.clock.now();
        let trimmed;
        let bars = if self.settings.trim_provisional && self.deps.calendar.is_open(now)? {
            trimmed = series.before(self.deps.calendar.local_day(now));
            trimmed.bars()
        } else {
            series.bars()
        };
        Ok(self.deps.registry.get(name)?.compute(bars, false)?)
    }

    /// Registered strategies as (name, label)
    pub fn strategies(&self) -> Vec<(String, String)> {
        self.deps.registry.list()
    }

    /// Subscribe a connection to `live` or `analytics-<strategy>`
    pub fn register_connection(&self, pool: &str, connection: Arc<dyn Connection>) -> Result<()> {
        let known = pool == Pools::LIVE
            || Pools::strategy_of(pool).is_some_and(|name| self.deps.registry.exists(name));
        if !known {
            return Err(ServerError::NotFound(format!("pool {}", pool)));
        }
        self.pools.register(pool, connection);
        Ok(())
    }

    pub fn unregister_connection(&self, pool: &str, id: ConnectionId) -> bool {
        self.pools.unregister(pool, id)
    }
}

async fn run(
    mut market_loop: MarketLoop,
    interval: Duration,
    mut cancel: watch::Receiver<bool>,
    state: Arc<Mutex<ServerState>>,
) {
    let symbol = market_loop.symbol().to_string();

    let started = tokio::select! {
        result = market_loop.startup() => Some(result),
        _ = cancel.changed() => None,
    };
    match started {
        None => {
            debug!("[{}] Cancelled during startup", symbol);
            return;
        }
        Some(Err(e)) => error!("[{}] Startup load failed, retrying in the loop: {}", symbol, e),
        Some(Ok(())) => {}
    }

    {
        let mut state = lock(&state);
        if *state == ServerState::Starting {
            *state = ServerState::Running;
        }
    }
    info!("[{}] Market server running", symbol);

    loop {
        if *cancel.borrow() {
            break;
        }
        tokio::select! {
            outcome = market_loop.iterate() => debug!("[{}] Iteration: {:?}", symbol, outcome),
            _ = cancel.changed() => break,
        }
        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            _ = cancel.changed() => break,
        }
    }
    debug!("[{}] Market loop exited", symbol);
}
