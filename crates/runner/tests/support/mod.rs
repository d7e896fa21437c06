//! In-memory collaborators for market server tests
#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{Duration, NaiveDate, TimeZone, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use vigil_calendar::NyseCalendar;
use vigil_clock::ManualClock;
use vigil_core::{Bar, IntradayContext, IntradayQuote, Ledger, Series, Timestamp};
use vigil_notifier::Notifier;
use vigil_ports::{
    AlertChannel, AlertError, LedgerStore, MarketDataSource, SeriesStore, SourceError,
    SourceResult, StoreError, StoreResult,
};
use vigil_runner::{LoopSettings, ServerDeps};
use vigil_strategy::{AnalyticsConfig, AnalyticsRegistry};

pub const SYMBOL: &str = "^GSPC";

pub fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> Timestamp {
    Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
}

pub fn bar(date: NaiveDate, close: f64) -> Bar {
    Bar::new(date, close, close, close, close, close, 1_000.0)
}

/// `n` daily bars at `close`, the last one on `last`
pub fn series_ending(last: NaiveDate, n: usize, close: f64) -> Series {
    Series::from_bars(
        (0..n)
            .map(|i| bar(last - Duration::days(i as i64), close))
            .collect(),
    )
}

pub fn quote(at: Timestamp, close: f64) -> IntradayQuote {
    IntradayQuote {
        timestamp: at,
        open: close,
        high: close,
        low: close,
        close,
        adj_close: close,
        volume: 10.0,
    }
}

#[derive(Default)]
pub struct MemorySeriesStore {
    pub series: Mutex<HashMap<String, Series>>,
    pub corrupt: Mutex<HashSet<String>>,
    pub archived: Mutex<Vec<Option<Series>>>,
    pub saves: AtomicUsize,
    /// Makes `archive` fail with an I/O error
    pub fail_archive: AtomicBool,
}

impl MemorySeriesStore {
    pub fn with(symbol: &str, series: Series) -> Self {
        let store = Self::default();
        store.series.lock().unwrap().insert(symbol.to_string(), series);
        store
    }

    pub fn stored(&self, symbol: &str) -> Option<Series> {
        self.series.lock().unwrap().get(symbol).cloned()
    }

    pub fn archive_count(&self) -> usize {
        self.archived.lock().unwrap().len()
    }

    pub fn mark_corrupt(&self, symbol: &str) {
        self.corrupt.lock().unwrap().insert(symbol.to_string());
    }
}

#[async_trait]
impl SeriesStore for MemorySeriesStore {
    async fn load(&self, symbol: &str) -> StoreResult<Option<Series>> {
        if self.corrupt.lock().unwrap().contains(symbol) {
            return Err(StoreError::Corrupt {
                path: format!("memory://{}", symbol),
                reason: "garbage".to_string(),
            });
        }
        Ok(self.stored(symbol))
    }

    async fn save(&self, symbol: &str, series: &Series) -> StoreResult<()> {
        self.series
            .lock()
            .unwrap()
            .insert(symbol.to_string(), series.clone());
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn archive(&self, symbol: &str) -> StoreResult<bool> {
        if self.fail_archive.load(Ordering::SeqCst) {
            return Err(StoreError::Io {
                path: format!("memory://stale/{}", symbol),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
            });
        }
        let was_corrupt = self.corrupt.lock().unwrap().remove(symbol);
        let removed = self.series.lock().unwrap().remove(symbol);
        let existed = was_corrupt || removed.is_some();
        if existed {
            self.archived.lock().unwrap().push(removed);
        }
        Ok(existed)
    }
}

/// Market data source answering from preset values
#[derive(Default)]
pub struct ScriptedSource {
    /// `None` makes history downloads fail
    pub history: Mutex<Option<Series>>,
    pub intraday: Mutex<Option<IntradayQuote>>,
    pub fail_intraday: Mutex<bool>,
    pub history_calls: AtomicUsize,
    pub contexts: Mutex<Vec<IntradayContext>>,
    /// Makes intraday requests wait forever
    pub hang_intraday: AtomicBool,
}

impl ScriptedSource {
    pub fn set_history(&self, series: Option<Series>) {
        *self.history.lock().unwrap() = series;
    }

    pub fn set_intraday(&self, quote: Option<IntradayQuote>) {
        *self.intraday.lock().unwrap() = quote;
    }

    pub fn downloads(&self) -> usize {
        self.history_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MarketDataSource for ScriptedSource {
    async fn fetch_history(&self, symbol: &str) -> SourceResult<Series> {
        self.history_calls.fetch_add(1, Ordering::SeqCst);
        self.history
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| SourceError::Unreachable(format!("no history for {}", symbol)))
    }

    async fn fetch_latest_intraday(
        &self,
        symbol: &str,
        context: &IntradayContext,
    ) -> SourceResult<Option<IntradayQuote>> {
        self.contexts.lock().unwrap().push(*context);
        if self.hang_intraday.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        if *self.fail_intraday.lock().unwrap() {
            return Err(SourceError::Unreachable(format!("intraday for {}", symbol)));
        }
        Ok(*self.intraday.lock().unwrap())
    }

    fn name(&self) -> &str {
        "Scripted"
    }
}

#[derive(Default)]
pub struct MemoryLedgerStore {
    pub ledger: Mutex<Ledger>,
    pub saves: AtomicUsize,
}

#[async_trait]
impl LedgerStore for MemoryLedgerStore {
    async fn load(&self) -> StoreResult<Ledger> {
        Ok(self.ledger.lock().unwrap().clone())
    }

    async fn save(&self, ledger: &Ledger) -> StoreResult<()> {
        *self.ledger.lock().unwrap() = ledger.clone();
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingAlert {
    pub sent: Mutex<Vec<(String, String)>>,
}

impl RecordingAlert {
    pub fn count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl AlertChannel for RecordingAlert {
    async fn send(&self, _recipients: &[String], subject: &str, body: &str) -> Result<(), AlertError> {
        self.sent
            .lock()
            .unwrap()
            .push((subject.to_string(), body.to_string()));
        Ok(())
    }
}

/// Shared wiring for one symbol
pub struct Harness {
    pub clock: Arc<ManualClock>,
    pub store: Arc<MemorySeriesStore>,
    pub source: Arc<ScriptedSource>,
    pub ledger: Arc<MemoryLedgerStore>,
    pub alerts: Arc<RecordingAlert>,
    pub deps: ServerDeps,
}

pub const SMA_CONFIG: &str =
    r#"{"sma": {"window": 3, "upper": 0.02, "lower": 0.01, "reminders": [0.1]}}"#;

impl Harness {
    pub fn new(now: Timestamp, stored: Option<Series>, analytics: &str) -> Self {
        let _ = env_logger::try_init();
        let clock = Arc::new(ManualClock::new(now));
        let store = Arc::new(match stored {
            Some(series) => MemorySeriesStore::with(SYMBOL, series),
            None => MemorySeriesStore::default(),
        });
        let source = Arc::new(ScriptedSource::default());
        let config: AnalyticsConfig = serde_json::from_str(analytics).unwrap();
        let registry = AnalyticsRegistry::from_config(&config, clock.clone()).unwrap();

        let deps = ServerDeps {
            source: source.clone(),
            store: store.clone(),
            calendar: Arc::new(NyseCalendar::new()),
            clock: clock.clone(),
            registry: Arc::new(registry),
        };
        Self {
            clock,
            store,
            source,
            ledger: Arc::new(MemoryLedgerStore::default()),
            alerts: Arc::new(RecordingAlert::default()),
            deps,
        }
    }

    pub async fn notifier(&self) -> Arc<Notifier> {
        Arc::new(
            Notifier::open(
                SYMBOL,
                vec!["ops@example.com".to_string()],
                self.ledger.clone(),
                self.alerts.clone(),
            )
            .await,
        )
    }

    pub fn settings(poll_ms: u64, trim_provisional: bool) -> LoopSettings {
        LoopSettings {
            poll_interval: std::time::Duration::from_millis(poll_ms),
            trim_provisional,
        }
    }
}
