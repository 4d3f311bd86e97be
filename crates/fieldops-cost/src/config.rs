use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;

use crate::error::{CostError, CostResult};

/// Distance bands for check-in verification, in metres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GpsThresholds {
    pub verified_m: f64,
    pub warning_m: f64,
}

impl Default for GpsThresholds {
    fn default() -> Self {
        Self {
            verified_m: 200.0,
            warning_m: 1000.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostConfig {
    pub gps: GpsThresholds,
    pub tax_pct: f64,
    /// Overhead applied to logs that do not carry their own.
    pub default_overhead_pct: f64,
}

impl Default for CostConfig {
    fn default() -> Self {
        Self {
            gps: GpsThresholds::default(),
            tax_pct: 10.0,
            default_overhead_pct: 0.0,
        }
    }
}

impl CostConfig {
    pub fn load_from_json<P: AsRef<Path>>(path: P) -> CostResult<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| CostError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: CostConfig = serde_json::from_reader(file)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> CostResult<()> {
        let gps = &self.gps;
        if !(gps.verified_m.is_finite() && gps.warning_m.is_finite())
            || gps.verified_m < 0.0
            || gps.warning_m < gps.verified_m
        {
            return Err(CostError::Config(format!(
                "gps thresholds must satisfy 0 <= verified ({}) <= warning ({})",
                gps.verified_m, gps.warning_m
            )));
        }
        if !self.tax_pct.is_finite() || self.tax_pct < 0.0 {
            return Err(CostError::Config(format!(
                "tax_pct must be a non-negative number (got {})",
                self.tax_pct
            )));
        }
        if !self.default_overhead_pct.is_finite() || self.default_overhead_pct < 0.0 {
            return Err(CostError::Config(format!(
                "default_overhead_pct must be a non-negative number (got {})",
                self.default_overhead_pct
            )));
        }
        Ok(())
    }
}
