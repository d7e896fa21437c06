//! Single-iteration behaviour of the market loop, driven by a manual clock
//! over the NYSE calendar. 2024-03-08 is a Friday.

mod support;

use std::sync::Arc;
use std::sync::atomic::Ordering;
use support::{Harness, SMA_CONFIG, SYMBOL, day, quote, series_ending, utc};
use tokio::sync::{RwLock, mpsc};
use vigil_gateway::{ChannelConnection, ConnectionPools, Pools};
use vigil_runner::{DayTransition, LoopSettings, MarketLoop, SharedSeries};

async fn market_loop(
    h: &Harness,
    pools: Arc<ConnectionPools>,
    settings: LoopSettings,
) -> (MarketLoop, SharedSeries) {
    let shared: SharedSeries = Arc::new(RwLock::new(None));
    let ml = MarketLoop::new(
        SYMBOL,
        h.deps.clone(),
        h.notifier().await,
        pools,
        shared.clone(),
        settings,
    );
    (ml, shared)
}

fn subscribe(pools: &ConnectionPools, pool: &str) -> mpsc::Receiver<String> {
    let (conn, rx) = ChannelConnection::pair(16);
    pools.register(pool, Arc::new(conn));
    rx
}

fn json(payload: &str) -> serde_json::Value {
    serde_json::from_str(payload).unwrap()
}

#[tokio::test]
async fn test_next_trading_day_is_not_a_gap_but_skipped_day_is() {
    // Friday after the close
    let h = Harness::new(
        utc(2024, 3, 8, 22, 0),
        Some(series_ending(day(2024, 3, 8), 10, 100.0)),
        "{}",
    );
    let (mut ml, _) = market_loop(&h, Arc::new(ConnectionPools::new()), Harness::settings(10, true)).await;
    ml.startup().await.unwrap();
    assert_eq!(h.source.downloads(), 0);
    assert_eq!(ml.current_day(), Some(day(2024, 3, 8)));
    assert_eq!(ml.iterate().await.day, DayTransition::Unchanged);

    // Saturday
    h.clock.set(utc(2024, 3, 9, 15, 0));
    assert_eq!(ml.iterate().await.day, DayTransition::NonTradingDay);
    assert_eq!(ml.current_day(), Some(day(2024, 3, 8)));

    // Monday 10:30 EDT: immediate next trading day, cache still fresh
    h.clock.set(utc(2024, 3, 11, 14, 30));
    assert_eq!(ml.iterate().await.day, DayTransition::Ordinary);
    assert_eq!(h.store.archive_count(), 0);
    assert_eq!(h.source.downloads(), 0);

    // Wednesday: Tuesday was missed
    h.source
        .set_history(Some(series_ending(day(2024, 3, 12), 10, 101.0)));
    h.clock.set(utc(2024, 3, 13, 14, 30));
    assert_eq!(ml.iterate().await.day, DayTransition::Gap);
    assert_eq!(h.store.archive_count(), 1);
    assert_eq!(h.source.downloads(), 1);
    assert_eq!(
        h.store.stored(SYMBOL).unwrap().last_date(),
        Some(day(2024, 3, 12))
    );
    assert_eq!(ml.current_day(), Some(day(2024, 3, 13)));
}

#[tokio::test]
async fn test_intraday_bar_is_merged_persisted_and_broadcast() {
    // Friday 10:00 EST, history through Thursday
    let h = Harness::new(
        utc(2024, 3, 8, 15, 0),
        Some(series_ending(day(2024, 3, 7), 5, 100.0)),
        SMA_CONFIG,
    );
    h.source.set_intraday(Some(quote(utc(2024, 3, 8, 14, 58), 101.0)));
    let pools = Arc::new(ConnectionPools::new());
    let mut live = subscribe(&pools, Pools::LIVE);
    let (mut ml, shared) = market_loop(&h, pools.clone(), Harness::settings(10, true)).await;
    ml.startup().await.unwrap();

    let outcome = ml.iterate().await;
    assert_eq!(outcome.day, DayTransition::Ordinary);
    assert_eq!(outcome.merged.unwrap().date, day(2024, 3, 8));

    let stored = h.store.stored(SYMBOL).unwrap();
    assert_eq!(stored.len(), 6);
    assert_eq!(stored.last_date(), Some(day(2024, 3, 8)));
    assert_eq!(
        shared.read().await.as_ref().unwrap().last_date(),
        Some(day(2024, 3, 8))
    );

    let context = h.source.contexts.lock().unwrap()[0];
    assert_eq!(context.session_day, day(2024, 3, 8));
    assert_eq!(context.reference.unwrap().date, day(2024, 3, 7));

    let update = json(&live.recv().await.unwrap());
    assert_eq!(update["symbol"], SYMBOL);
    assert_eq!(update["timestamp"], "2024-03-08T09:58:00-05:00");
    assert_eq!(update["ohlcv"]["close"], 101.0);

    // A later quote overwrites today's bar
    h.source.set_intraday(Some(quote(utc(2024, 3, 8, 14, 59), 102.0)));
    h.clock.advance(chrono::Duration::minutes(1));
    ml.iterate().await;
    let stored = h.store.stored(SYMBOL).unwrap();
    assert_eq!(stored.len(), 6);
    approx::assert_relative_eq!(stored.last().unwrap().close, 102.0);
}

#[tokio::test]
async fn test_analytics_trimmed_payload_and_cooldown() {
    let h = Harness::new(
        utc(2024, 3, 8, 15, 0),
        Some(series_ending(day(2024, 3, 7), 3, 100.0)),
        SMA_CONFIG,
    );
    // Breaks above the upper band of the live series
    h.source.set_intraday(Some(quote(utc(2024, 3, 8, 14, 58), 110.0)));
    let pools = Arc::new(ConnectionPools::new());
    let mut sma = subscribe(&pools, &Pools::analytics("sma"));
    let (mut ml, _) = market_loop(&h, pools, Harness::settings(10, true)).await;
    ml.startup().await.unwrap();

    ml.iterate().await;
    assert_eq!(h.alerts.count(), 1);
    assert!(h.alerts.sent.lock().unwrap()[0].0.ends_with("sma BUY"));

    // Broadcast payload excludes the provisional bar
    let update = json(&sma.recv().await.unwrap());
    assert_eq!(update["strategy"], "sma");
    assert_eq!(update["data"]["type"], "sma");
    assert_eq!(update["data"]["dates"][0], "2024-03-07");
    assert_eq!(update["data"]["signal"][0], "HOLD");

    // Same signal a minute later is inside the default one hour cooldown
    h.clock.advance(chrono::Duration::minutes(1));
    ml.iterate().await;
    assert_eq!(h.alerts.count(), 1);
    assert!(sma.recv().await.is_some());
}

#[tokio::test]
async fn test_untrimmed_payload_when_disabled() {
    let h = Harness::new(
        utc(2024, 3, 8, 15, 0),
        Some(series_ending(day(2024, 3, 7), 3, 100.0)),
        SMA_CONFIG,
    );
    h.source.set_intraday(Some(quote(utc(2024, 3, 8, 14, 58), 110.0)));
    let pools = Arc::new(ConnectionPools::new());
    let mut sma = subscribe(&pools, &Pools::analytics("sma"));
    let (mut ml, _) = market_loop(&h, pools, Harness::settings(10, false)).await;
    ml.startup().await.unwrap();
    ml.iterate().await;

    let update = json(&sma.recv().await.unwrap());
    assert_eq!(update["data"]["dates"][0], "2024-03-08");
    assert_eq!(update["data"]["signal"][0], "BUY");
}

#[tokio::test]
async fn test_pool_without_strategy_is_skipped() {
    let h = Harness::new(
        utc(2024, 3, 8, 15, 0),
        Some(series_ending(day(2024, 3, 7), 3, 100.0)),
        SMA_CONFIG,
    );
    h.source.set_intraday(Some(quote(utc(2024, 3, 8, 14, 58), 100.0)));
    let pools = Arc::new(ConnectionPools::new());
    let mut unknown = subscribe(&pools, &Pools::analytics("macd"));
    let (mut ml, _) = market_loop(&h, pools, Harness::settings(10, true)).await;
    ml.startup().await.unwrap();

    assert!(ml.iterate().await.merged.is_some());
    assert!(unknown.try_recv().is_err());
}

#[tokio::test]
async fn test_corrupt_series_is_archived_and_reloaded() {
    let h = Harness::new(
        utc(2024, 3, 8, 22, 0),
        Some(series_ending(day(2024, 3, 7), 5, 100.0)),
        "{}",
    );
    h.store.mark_corrupt(SYMBOL);
    h.source
        .set_history(Some(series_ending(day(2024, 3, 8), 20, 100.0)));
    let (mut ml, shared) =
        market_loop(&h, Arc::new(ConnectionPools::new()), Harness::settings(10, true)).await;

    ml.startup().await.unwrap();
    assert_eq!(h.store.archive_count(), 1);
    assert_eq!(h.source.downloads(), 1);
    assert_eq!(h.store.stored(SYMBOL).unwrap().len(), 20);
    assert_eq!(shared.read().await.as_ref().unwrap().len(), 20);
}

#[tokio::test]
async fn test_restart_after_missed_days_is_a_gap() {
    // Stopped since Friday, restarted on Wednesday morning
    let h = Harness::new(
        utc(2024, 3, 13, 14, 30),
        Some(series_ending(day(2024, 3, 8), 5, 100.0)),
        "{}",
    );
    h.source
        .set_history(Some(series_ending(day(2024, 3, 12), 10, 101.0)));
    let (mut ml, shared) =
        market_loop(&h, Arc::new(ConnectionPools::new()), Harness::settings(10, true)).await;

    ml.startup().await.unwrap();
    assert_eq!(h.source.downloads(), 0);
    assert_eq!(ml.current_day(), Some(day(2024, 3, 8)));

    assert_eq!(ml.iterate().await.day, DayTransition::Gap);
    assert_eq!(h.store.archive_count(), 1);
    assert_eq!(
        h.store.archived.lock().unwrap()[0].as_ref().unwrap().last_date(),
        Some(day(2024, 3, 8))
    );
    assert_eq!(h.source.downloads(), 1);
    assert_eq!(
        shared.read().await.as_ref().unwrap().last_date(),
        Some(day(2024, 3, 12))
    );
}

#[tokio::test]
async fn test_failed_download_after_gap_keeps_series_in_memory() {
    let h = Harness::new(
        utc(2024, 3, 8, 22, 0),
        Some(series_ending(day(2024, 3, 1), 5, 100.0)),
        "{}",
    );
    let (mut ml, shared) =
        market_loop(&h, Arc::new(ConnectionPools::new()), Harness::settings(10, true)).await;

    ml.startup().await.unwrap();
    assert_eq!(h.source.downloads(), 0);

    assert_eq!(ml.iterate().await.day, DayTransition::Gap);
    assert_eq!(h.store.archive_count(), 1);
    assert_eq!(h.source.downloads(), 1);
    assert_eq!(
        shared.read().await.as_ref().unwrap().last_date(),
        Some(day(2024, 3, 1))
    );
}

#[tokio::test]
async fn test_failed_archive_is_retried_next_iteration() {
    let h = Harness::new(
        utc(2024, 3, 13, 14, 30),
        Some(series_ending(day(2024, 3, 8), 5, 100.0)),
        "{}",
    );
    h.source
        .set_history(Some(series_ending(day(2024, 3, 12), 10, 101.0)));
    h.store.fail_archive.store(true, Ordering::SeqCst);
    let (mut ml, shared) =
        market_loop(&h, Arc::new(ConnectionPools::new()), Harness::settings(10, true)).await;
    ml.startup().await.unwrap();

    ml.iterate().await;
    assert_eq!(ml.current_day(), Some(day(2024, 3, 8)));
    assert_eq!(h.store.archive_count(), 0);
    assert_eq!(h.source.downloads(), 0);

    h.store.fail_archive.store(false, Ordering::SeqCst);
    assert_eq!(ml.iterate().await.day, DayTransition::Gap);
    assert_eq!(ml.current_day(), Some(day(2024, 3, 13)));
    assert_eq!(h.store.archive_count(), 1);
    assert_eq!(
        shared.read().await.as_ref().unwrap().last_date(),
        Some(day(2024, 3, 12))
    );
}

#[tokio::test]
async fn test_missing_data_is_retried_next_iteration() {
    let h = Harness::new(utc(2024, 3, 8, 22, 0), None, "{}");
    let (mut ml, shared) =
        market_loop(&h, Arc::new(ConnectionPools::new()), Harness::settings(10, true)).await;

    assert!(ml.startup().await.is_err());
    ml.iterate().await;
    assert!(shared.read().await.is_none());

    h.source
        .set_history(Some(series_ending(day(2024, 3, 8), 5, 100.0)));
    assert_eq!(ml.iterate().await.day, DayTransition::Ordinary);
    assert_eq!(shared.read().await.as_ref().unwrap().len(), 5);
}

#[tokio::test]
async fn test_intraday_failure_skips_the_cycle() {
    let h = Harness::new(
        utc(2024, 3, 8, 15, 0),
        Some(series_ending(day(2024, 3, 7), 5, 100.0)),
        "{}",
    );
    *h.source.fail_intraday.lock().unwrap() = true;
    let (mut ml, _) = market_loop(&h, Arc::new(ConnectionPools::new()), Harness::settings(10, true)).await;
    ml.startup().await.unwrap();

    let outcome = ml.iterate().await;
    assert!(outcome.merged.is_none());
    assert_eq!(h.store.stored(SYMBOL).unwrap().len(), 5);
}
