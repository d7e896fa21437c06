//! Per-label cooldown tables
//!
//! Configured as a mapping from label to a duration string. Categories may
//! nest; nested keys are joined with `_`:
//!
//! ```text
//! { "BUY": "2h", "REMINDER": { "BUY": "1d" } }
//!     -> BUY = 2h, REMINDER_BUY = 1d
//! ```

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

/// Cooldown applied to labels missing from the table
pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(3600);

/// Raw cooldown entry as it appears in configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CooldownSpec {
    Duration(String),
    Nested(BTreeMap<String, CooldownSpec>),
}

/// Parsed label -> duration table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cooldowns {
    table: HashMap<String, Duration>,
}

impl Cooldowns {
    /// Parse and flatten a configured table
    pub fn parse(raw: &BTreeMap<String, CooldownSpec>) -> Result<Self, ConfigError> {
        let mut table = HashMap::new();
        flatten(None, raw, &mut table)?;
        Ok(Self { table })
    }

    /// Cooldown for `label`, one hour when unconfigured
    pub fn get(&self, label: &str) -> Duration {
        self.table.get(label).copied().unwrap_or(DEFAULT_COOLDOWN)
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

fn flatten(
    prefix: Option<&str>,
    raw: &BTreeMap<String, CooldownSpec>,
    out: &mut HashMap<String, Duration>,
) -> Result<(), ConfigError> {
    for (key, spec) in raw {
        let label = match prefix {
            Some(prefix) => format!("{}_{}", prefix, key),
            None => key.clone(),
        };
        match spec {
            CooldownSpec::Duration(value) => {
                out.insert(label, parse_duration(value)?);
            }
            CooldownSpec::Nested(inner) => flatten(Some(&label), inner, out)?,
        }
    }
    Ok(())
}

/// Parse `<number><unit>` with unit in hours, minutes or days
///
/// Accepts `h`, `hr`, `hour(s)`, `m`, `min`, `minute(s)`, `d`, `day(s)`,
/// case-insensitive, optional whitespace before the unit.
pub fn parse_duration(value: &str) -> Result<Duration, ConfigError> {
    let trimmed = value.trim();
    let split = trimmed
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(trimmed.len());
    let (number, unit) = trimmed.split_at(split);

    let amount: f64 = number.parse().map_err(|_| ConfigError::InvalidDuration {
        value: value.to_string(),
        reason: "expected a leading number".to_string(),
    })?;

    let seconds_per_unit = match unit.trim().to_ascii_lowercase().as_str() {
        "h" | "hr" | "hrs" | "hour" | "hours" => 3600.0,
        "m" | "min" | "mins" | "minute" | "minutes" => 60.0,
        "d" | "day" | "days" => 86_400.0,
        other => {
            return Err(ConfigError::UnknownUnit {
                value: value.to_string(),
                unit: other.to_string(),
            });
        }
    };

    Duration::try_from_secs_f64(amount * seconds_per_unit).map_err(|e| {
        ConfigError::InvalidDuration {
            value: value.to_string(),
            reason: e.to_string(),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(json: &str) -> BTreeMap<String, CooldownSpec> {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_parse_units() {
        assert_eq!(parse_duration("2h").unwrap(), Duration::from_secs(7200));
        assert_eq!(parse_duration("30m").unwrap(), Duration::from_secs(1800));
        assert_eq!(parse_duration("1d").unwrap(), Duration::from_secs(86_400));
        assert_eq!(parse_duration("90 minutes").unwrap(), Duration::from_secs(5400));
        assert_eq!(parse_duration("1.5 Hours").unwrap(), Duration::from_secs(5400));
        assert_eq!(parse_duration("3days").unwrap(), Duration::from_secs(3 * 86_400));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            parse_duration("2w"),
            Err(ConfigError::UnknownUnit { .. })
        ));
        assert!(matches!(
            parse_duration("h"),
            Err(ConfigError::InvalidDuration { .. })
        ));
        assert!(matches!(
            parse_duration("1.2.3h"),
            Err(ConfigError::InvalidDuration { .. })
        ));
        assert!(parse_duration("").is_err());
    }

    #[test]
    fn test_nested_tables_flatten() {
        let cooldowns =
            Cooldowns::parse(&spec(r#"{"BUY": "2h", "REMINDER": {"BUY": "1d", "SELL": "30m"}}"#))
                .unwrap();
        assert_eq!(cooldowns.len(), 3);
        assert_eq!(cooldowns.get("BUY"), Duration::from_secs(7200));
        assert_eq!(cooldowns.get("REMINDER_BUY"), Duration::from_secs(86_400));
        assert_eq!(cooldowns.get("REMINDER_SELL"), Duration::from_secs(1800));
    }

    #[test]
    fn test_missing_label_defaults_to_one_hour() {
        let cooldowns = Cooldowns::parse(&spec(r#"{"BUY": "2h"}"#)).unwrap();
        assert_eq!(cooldowns.get("SELL"), DEFAULT_COOLDOWN);
        assert_eq!(Cooldowns::default().get("BUY"), Duration::from_secs(3600));
    }

    #[test]
    fn test_bad_entry_fails_whole_table() {
        let result = Cooldowns::parse(&spec(r#"{"BUY": "2h", "SELL": "soon"}"#));
        assert!(result.is_err());
    }
}
