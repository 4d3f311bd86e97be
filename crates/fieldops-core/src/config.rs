use serde::{Deserialize, Serialize};
use std::env;
use std::fs::File;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::model::{ClockRange, DayPeriod};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid value for {key}: '{value}'")]
    InvalidEnv { key: &'static str, value: String },
    #[error("{0}")]
    Invalid(String),
}

/// Which seasonal window applies when several cover the same date.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeasonalPrecedence {
    /// Latest `created_at` wins; ties go to the earlier start date, then id.
    #[default]
    MostRecentlyCreated,
    /// First covering window in stored order.
    FirstInOrder,
}

/// Clock ranges seasonal periods expand to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodClock {
    pub morning: ClockRange,
    pub afternoon: ClockRange,
    pub evening: ClockRange,
}

impl PeriodClock {
    /// `None` for `Anytime`, which is not bounded by a range.
    pub fn range_for(&self, period: DayPeriod) -> Option<ClockRange> {
        match period {
            DayPeriod::Morning => Some(self.morning),
            DayPeriod::Afternoon => Some(self.afternoon),
            DayPeriod::Evening => Some(self.evening),
            DayPeriod::Anytime => None,
        }
    }
}

impl Default for PeriodClock {
    fn default() -> Self {
        let range = |start: (u32, u32), end: (u32, u32)| {
            ClockRange::from_hm(start, end).unwrap_or_else(|| unreachable!("constant clock range"))
        };
        Self {
            morning: range((6, 0), (12, 0)),
            afternoon: range((12, 0), (18, 0)),
            evening: range((18, 0), (23, 59)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Requests spanning at least this many hours are checked at day level.
    pub day_level_threshold_hours: i64,
    pub periods: PeriodClock,
    pub seasonal_precedence: SeasonalPrecedence,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            day_level_threshold_hours: 6,
            periods: PeriodClock::default(),
            seasonal_precedence: SeasonalPrecedence::default(),
        }
    }
}

impl EngineConfig {
    pub fn load_from_json<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: EngineConfig = serde_json::from_reader(file)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.day_level_threshold_hours <= 0 {
            return Err(ConfigError::Invalid(format!(
                "day_level_threshold_hours must be positive (got {})",
                self.day_level_threshold_hours
            )));
        }
        for period in [DayPeriod::Morning, DayPeriod::Afternoon, DayPeriod::Evening] {
            if let Some(range) = self.periods.range_for(period) {
                if range.end <= range.start {
                    return Err(ConfigError::Invalid(format!(
                        "{} range {} is empty",
                        period, range
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Process-level settings for the HTTP binary.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    pub snapshot_path: Option<PathBuf>,
    pub engine_config_path: Option<PathBuf>,
    pub rate_limit_requests: u32,
    pub rate_limit_window: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            snapshot_path: None,
            engine_config_path: None,
            rate_limit_requests: 120,
            rate_limit_window: Duration::from_secs(60),
        }
    }
}

impl ServerConfig {
    /// Reads `FIELDOPS_HTTP_ADDR`, `FIELDOPS_SNAPSHOT`, `FIELDOPS_ENGINE_CONFIG`,
    /// `FIELDOPS_RATE_LIMIT` (requests per window) and
    /// `FIELDOPS_RATE_WINDOW_SECS`; unset variables keep their defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(value) = lookup("FIELDOPS_HTTP_ADDR") {
            config.addr = value.parse().map_err(|_| ConfigError::InvalidEnv {
                key: "FIELDOPS_HTTP_ADDR",
                value,
            })?;
        }
        config.snapshot_path = lookup("FIELDOPS_SNAPSHOT").map(PathBuf::from);
        config.engine_config_path = lookup("FIELDOPS_ENGINE_CONFIG").map(PathBuf::from);
        if let Some(value) = lookup("FIELDOPS_RATE_LIMIT") {
            config.rate_limit_requests = match value.parse::<u32>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(ConfigError::InvalidEnv {
                        key: "FIELDOPS_RATE_LIMIT",
                        value,
                    });
                }
            };
        }
        if let Some(value) = lookup("FIELDOPS_RATE_WINDOW_SECS") {
            let secs = match value.parse::<u64>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(ConfigError::InvalidEnv {
                        key: "FIELDOPS_RATE_WINDOW_SECS",
                        value,
                    });
                }
            };
            config.rate_limit_window = Duration::from_secs(secs);
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn default_period_ranges() {
        let clock = PeriodClock::default();
        assert_eq!(clock.morning.to_string(), "06:00-12:00");
        assert_eq!(clock.afternoon.to_string(), "12:00-18:00");
        assert_eq!(clock.evening.to_string(), "18:00-23:59");
        assert!(clock.range_for(DayPeriod::Anytime).is_none());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config: EngineConfig =
            serde_json::from_str(r#"{ "seasonal_precedence": "first_in_order" }"#).unwrap();
        assert_eq!(config.day_level_threshold_hours, 6);
        assert_eq!(config.seasonal_precedence, SeasonalPrecedence::FirstInOrder);
    }

    #[test]
    fn server_config_reads_lookup() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("FIELDOPS_HTTP_ADDR", "127.0.0.1:8088"),
            ("FIELDOPS_RATE_LIMIT", "10"),
        ]);
        let config =
            ServerConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string())).unwrap();
        assert_eq!(config.addr.port(), 8088);
        assert_eq!(config.rate_limit_requests, 10);
        assert_eq!(config.rate_limit_window, Duration::from_secs(60));
    }

    #[test]
    fn server_config_rejects_zero_rate() {
        let err = ServerConfig::from_lookup(|key| {
            (key == "FIELDOPS_RATE_LIMIT").then(|| "0".to_string())
        })
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { .. }));
    }
}
