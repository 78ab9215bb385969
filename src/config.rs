//! Engine configuration
//!
//! Every policy constant of the engine lives here as a named field so a
//! deployment can override it without touching the computations.

use std::fs::File;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::decline::DeclineType;
use crate::error::{EngineError, Result};
use crate::production::Month;

/// Maximum forecast months evaluated per phase (50 years)
pub const DEFAULT_MAX_PERIODS: usize = 600;

/// Lowest b-factor accepted for hyperbolic decline
pub const DEFAULT_B_FACTOR_FLOOR: f64 = 0.8;

/// Forward window for remaining reserves, in years from next month
pub const DEFAULT_RESERVES_LOOKAHEAD_YEARS: u32 = 15;

/// Months of forecast kept behind the latest actual in aggregate views
pub const DEFAULT_BACKLOG_TRIM_MONTHS: u32 = 6;

/// Inclusive month range reported by the portfolio aggregate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportingWindow {
    pub start: Month,
    pub end: Month,
}

impl ReportingWindow {
    pub fn new(start: Month, end: Month) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, month: Month) -> bool {
        month >= self.start && month <= self.end
    }
}

impl Default for ReportingWindow {
    fn default() -> Self {
        Self {
            start: Month::new(2020, 1),
            end: Month::new(2032, 12),
        }
    }
}

/// Configuration shared by all engine components
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Forecast months evaluated per phase
    pub max_periods: usize,

    /// b-factor floor applied before hyperbolic evaluation
    pub b_factor_floor: f64,

    /// Lookahead window for EUR-counted and remaining forecast (years)
    pub reserves_lookahead_years: u32,

    /// Months of forecast kept in aggregates, counted back from and
    /// including the latest producing month (6 keeps latest-5 ..= latest)
    pub backlog_trim_months: u32,

    /// Portfolio aggregate reporting range
    pub reporting_window: ReportingWindow,

    /// Oil decline type when a settings record omits it
    pub default_oil_decline: DeclineType,

    /// Gas decline type when a settings record omits it
    pub default_gas_decline: DeclineType,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_periods: DEFAULT_MAX_PERIODS,
            b_factor_floor: DEFAULT_B_FACTOR_FLOOR,
            reserves_lookahead_years: DEFAULT_RESERVES_LOOKAHEAD_YEARS,
            backlog_trim_months: DEFAULT_BACKLOG_TRIM_MONTHS,
            reporting_window: ReportingWindow::default(),
            default_oil_decline: DeclineType::Hyperbolic,
            default_gas_decline: DeclineType::Exponential,
        }
    }
}

impl EngineConfig {
    /// Load overrides from a JSON file; absent fields keep their defaults
    pub fn from_json_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let config: Self = serde_json::from_reader(file)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings no computation can work with
    pub fn validate(&self) -> Result<()> {
        if self.max_periods == 0 {
            return Err(EngineError::InvalidConfig("max_periods must be positive".into()));
        }
        if !(self.b_factor_floor.is_finite() && self.b_factor_floor > 0.0) {
            return Err(EngineError::InvalidConfig(format!(
                "b_factor_floor must be a positive number, got {}",
                self.b_factor_floor
            )));
        }
        if self.reporting_window.start > self.reporting_window.end {
            return Err(EngineError::InvalidConfig(format!(
                "reporting window starts ({}) after it ends ({})",
                self.reporting_window.start, self.reporting_window.end
            )));
        }
        Ok(())
    }

    /// Lookahead window length in months
    pub fn lookahead_months(&self) -> i32 {
        i32::try_from(self.reserves_lookahead_years)
            .unwrap_or(i32::MAX)
            .saturating_mul(12)
    }
}
