//! Example strategy drawing random labels
//!
//! Exercises the analytics pipeline end to end without any market logic.
//! Seed it for reproducible draws.

use crate::cooldown::{CooldownSpec, Cooldowns};
use crate::error::{AnalyticsError, ConfigError, Result};
use crate::strategy::{NotificationContext, Strategy, StrategyResult};
use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Mutex;
use vigil_core::{Bar, Notification};

fn default_labels() -> Vec<String> {
    vec!["UP".to_string(), "DOWN".to_string(), "FLAT".to_string()]
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DummyConfig {
    #[serde(default = "default_labels")]
    pub labels: Vec<String>,
    /// Fixed seed for reproducible draws
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub cooldowns: BTreeMap<String, CooldownSpec>,
}

impl Default for DummyConfig {
    fn default() -> Self {
        Self {
            labels: default_labels(),
            seed: None,
            cooldowns: BTreeMap::new(),
        }
    }
}

/// One drawn label per computed bar
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DummyResult {
    pub dates: Vec<NaiveDate>,
    pub labels: Vec<String>,
}

pub struct DummyStrategy {
    labels: Vec<String>,
    cooldowns: Cooldowns,
    rng: Mutex<StdRng>,
}

impl DummyStrategy {
    pub fn new(config: &DummyConfig) -> std::result::Result<Self, ConfigError> {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::build(config, rng)
    }

    /// Create with a specific seed, overriding the configured one
    pub fn with_seed(config: &DummyConfig, seed: u64) -> std::result::Result<Self, ConfigError> {
        Self::build(config, StdRng::seed_from_u64(seed))
    }

    fn build(config: &DummyConfig, rng: StdRng) -> std::result::Result<Self, ConfigError> {
        if config.labels.is_empty() {
            return Err(ConfigError::invalid("labels", "at least one label is required"));
        }
        Ok(Self {
            labels: config.labels.clone(),
            cooldowns: Cooldowns::parse(&config.cooldowns)?,
            rng: Mutex::new(rng),
        })
    }

    fn draw(&self, count: usize) -> Vec<String> {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        (0..count)
            .map(|_| self.labels[rng.gen_range(0..self.labels.len())].clone())
            .collect()
    }
}

impl Strategy for DummyStrategy {
    fn name(&self) -> &str {
        "dummy"
    }

    fn compute(&self, bars: &[Bar], streaming: bool) -> Result<StrategyResult> {
        let selected = if streaming {
            &bars[bars.len().saturating_sub(1)..]
        } else {
            bars
        };
        Ok(StrategyResult::Dummy(DummyResult {
            dates: selected.iter().map(|b| b.date).collect(),
            labels: self.draw(selected.len()),
        }))
    }

    fn generate_notifications(
        &self,
        result: &StrategyResult,
        ctx: &NotificationContext<'_>,
    ) -> Result<Option<Notification>> {
        let StrategyResult::Dummy(dummy) = result else {
            return Err(AnalyticsError::ResultMismatch {
                strategy: ctx.strategy.to_string(),
                found: result.kind().to_string(),
            });
        };
        let (Some(date), Some(label)) = (dummy.dates.last(), dummy.labels.last()) else {
            return Ok(None);
        };

        Ok(Some(Notification::new(
            ctx.strategy,
            label.clone(),
            ctx.now,
            format!("{} {}: example strategy drew {}", ctx.symbol, date, label),
            self.cooldowns.get(label),
        )))
    }
}
