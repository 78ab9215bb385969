//! Per-phase decline parameters

use serde::{Deserialize, Serialize};

use super::curve::{DeclineCurve, DeclineSchedule, DeclineType};
use crate::config::EngineConfig;
use crate::production::Month;

/// Hydrocarbon phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Phase {
    #[default]
    Oil,
    Gas,
}

/// Decline inputs for one phase of one well
///
/// Edited interactively; every evaluation works from a snapshot, so nothing
/// here is cached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeclineParameters {
    /// Initial rate (qi), per month
    pub initial_rate: f64,

    /// Economic limit rate (qf), per month
    pub economic_limit_rate: f64,

    pub decline_type: DeclineType,

    /// Arps exponent, raised to the configured floor before use
    pub b_factor: f64,

    /// Nominal initial annual decline (Di)
    pub initial_annual_decline: f64,

    /// Terminal annual decline
    pub terminal_annual_decline: f64,

    /// First forecast month; None means no forecast for this phase
    pub forecast_start_month: Option<Month>,
}

impl DeclineParameters {
    /// Parameters with no forecast: all rates zero, no start month
    pub fn none(decline_type: DeclineType) -> Self {
        Self {
            initial_rate: 0.0,
            economic_limit_rate: 0.0,
            decline_type,
            b_factor: crate::config::DEFAULT_B_FACTOR_FLOOR,
            initial_annual_decline: 0.0,
            terminal_annual_decline: 0.0,
            forecast_start_month: None,
        }
    }

    /// b-factor raised to `floor`; unusable values become the floor
    pub fn effective_b_factor(&self, floor: f64) -> f64 {
        if self.b_factor.is_finite() {
            self.b_factor.max(floor)
        } else {
            floor
        }
    }

    /// The decline curve these parameters describe
    pub fn curve(&self, config: &EngineConfig) -> DeclineCurve {
        DeclineCurve::new(
            self.initial_rate,
            self.economic_limit_rate,
            self.decline_type,
            self.effective_b_factor(config.b_factor_floor),
            self.initial_annual_decline,
            self.terminal_annual_decline,
        )
    }

    /// Evaluate the curve up to the configured horizon
    pub fn schedule(&self, config: &EngineConfig) -> DeclineSchedule {
        self.curve(config).evaluate(config.max_periods)
    }
}
