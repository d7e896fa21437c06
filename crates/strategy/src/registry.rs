//! Analytics Registry
//!
//! Owns the named strategy instances of a process and dispatches by name.
//! Built once from configuration; read-only afterwards, so it is shared
//! across market servers behind an `Arc`.

use crate::dummy::{DummyConfig, DummyStrategy};
use crate::error::{AnalyticsError, ConfigError, Result};
use crate::sma::{SmaConfig, SmaThreshold};
use crate::strategy::{NotificationContext, Strategy, StrategyResult};
use log::debug;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use vigil_core::{Notification, Series};
use vigil_ports::Clock;

/// Strategies to enable; absent sections are not registered
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    #[serde(default)]
    pub sma: Option<SmaConfig>,
    #[serde(default)]
    pub dummy: Option<DummyConfig>,
}

struct Entry {
    name: String,
    label: String,
    strategy: Box<dyn Strategy>,
}

pub struct AnalyticsRegistry {
    /// Registration order
    entries: Vec<Entry>,
    clock: Arc<dyn Clock>,
}

impl AnalyticsRegistry {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Vec::new(),
            clock,
        }
    }

    /// Construct every configured strategy; any invalid parameter is fatal
    pub fn from_config(
        config: &AnalyticsConfig,
        clock: Arc<dyn Clock>,
    ) -> std::result::Result<Self, ConfigError> {
        let mut registry = Self::new(clock);
        if let Some(sma) = &config.sma {
            let strategy = SmaThreshold::new(sma)?;
            let label = format!("SMA threshold (window {})", strategy.window());
            registry.register("sma", Box::new(strategy), label);
        }
        if let Some(dummy) = &config.dummy {
            registry.register("dummy", Box::new(DummyStrategy::new(dummy)?), "Example strategy");
        }
        Ok(registry)
    }

    /// Add a strategy, replacing any previous one with the same name
    pub fn register(
        &mut self,
        name: impl Into<String>,
        strategy: Box<dyn Strategy>,
        label: impl Into<String>,
    ) {
        let entry = Entry {
            name: name.into(),
            label: label.into(),
            strategy,
        };
        match self.entries.iter_mut().find(|e| e.name == entry.name) {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
    }

    pub fn exists(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e.name == name)
    }

    pub fn get(&self, name: &str) -> Result<&dyn Strategy> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .map(|e| e.strategy.as_ref())
            .ok_or_else(|| AnalyticsError::NotFound(name.to_string()))
    }

    /// Registered (name, human label) pairs in registration order
    pub fn list(&self) -> Vec<(String, String)> {
        self.entries
            .iter()
            .map(|e| (e.name.clone(), e.label.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Compute `name` over `series` and build its notification, stamped
    /// with the registry clock
    pub fn execute(
        &self,
        name: &str,
        series: &Series,
        symbol: &str,
        streaming: bool,
    ) -> Result<(StrategyResult, Option<Notification>)> {
        let strategy = self.get(name)?;
        let result = strategy.compute(series.bars(), streaming)?;
        let ctx = NotificationContext {
            strategy: name,
            symbol,
            now: self.clock.now(),
        };
        let notification = strategy.generate_notifications(&result, &ctx)?;
        debug!(
            "[{}] {} computed {} points, notification: {}",
            symbol,
            name,
            result.len(),
            notification.as_ref().map_or("none", |n| n.label.as_str())
        );
        Ok((result, notification))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use vigil_clock::ManualClock;

    fn clock() -> Arc<dyn Clock> {
        Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 3, 8, 15, 0, 0).unwrap(),
        ))
    }

    fn config() -> AnalyticsConfig {
        serde_json::from_str(
            r#"{"sma": {"window": 3, "upper": 0.02, "lower": 0.01},
                "dummy": {"labels": ["PING"], "seed": 3}}"#,
        )
        .unwrap()
    }

    #[test]
    fn test_from_config_registers_in_order() {
        let registry = AnalyticsRegistry::from_config(&config(), clock()).unwrap();
        assert_eq!(registry.len(), 2);
        let names: Vec<String> = registry.list().into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["sma", "dummy"]);
        assert!(registry.exists("sma"));
        assert!(!registry.exists("macd"));
    }

    #[test]
    fn test_unknown_strategy_is_not_found() {
        let registry = AnalyticsRegistry::from_config(&config(), clock()).unwrap();
        assert!(matches!(registry.get("macd"), Err(AnalyticsError::NotFound(_))));
        assert!(matches!(
            registry.execute("macd", &Series::new(), "AAPL", true),
            Err(AnalyticsError::NotFound(_))
        ));
    }

    #[test]
    fn test_execute_stamps_registry_clock() {
        let registry = AnalyticsRegistry::from_config(&config(), clock()).unwrap();
        let series = Series::from_bars(vec![vigil_core::Bar::new(
            chrono::NaiveDate::from_ymd_opt(2024, 3, 8).unwrap(),
            1.0,
            1.0,
            1.0,
            1.0,
            1.0,
            1.0,
        )]);
        let (result, notification) = registry.execute("dummy", &series, "AAPL", true).unwrap();
        assert_eq!(result.len(), 1);
        let notification = notification.unwrap();
        assert_eq!(notification.strategy, "dummy");
        assert_eq!(
            notification.timestamp,
            Utc.with_ymd_and_hms(2024, 3, 8, 15, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_invalid_config_is_fatal() {
        let config: AnalyticsConfig =
            serde_json::from_str(r#"{"sma": {"upper": 0.02, "lower": 0.01}}"#).unwrap();
        assert!(AnalyticsRegistry::from_config(&config, clock()).is_err());
    }
}
