//! Decline inputs as stored by the well settings store
//!
//! The store keeps one flat record per well with upper-case keys. Values may
//! arrive as numbers, numeric strings, or null, so every numeric field is read
//! leniently and coerced to a number here.

use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;

use log::warn;
use serde::{Deserialize, Deserializer, Serialize};

use super::curve::DeclineType;
use super::params::{DeclineParameters, Phase};
use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::production::Month;

/// Accept a number, a numeric string, or null
fn lenient_number<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    })
}

/// Settings-store record for one well
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct WellDeclineInputs {
    #[serde(default, deserialize_with = "lenient_number")]
    pub oil_calc_qi: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub oil_q_min: Option<f64>,
    #[serde(default)]
    pub oil_decline_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub oil_calc_b_factor: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub oil_empirical_di: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub oil_d_min: Option<f64>,
    #[serde(default)]
    pub fcst_start_oil: Option<String>,

    #[serde(default, deserialize_with = "lenient_number")]
    pub gas_calc_qi: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub gas_q_min: Option<f64>,
    #[serde(default)]
    pub gas_decline_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub gas_calc_b_factor: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub gas_empirical_di: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub gas_d_min: Option<f64>,
    #[serde(default)]
    pub fcst_start_gas: Option<String>,

    /// Gas forecast horizon in whole years from the forecast origin
    #[serde(default, deserialize_with = "lenient_number")]
    pub gas_fcst_yrs: Option<f64>,
}

/// Both phases' parameters plus the gas horizon, ready for the forecast builder
#[derive(Debug, Clone, PartialEq)]
pub struct WellForecastInputs {
    pub oil: DeclineParameters,
    pub gas: DeclineParameters,
    pub gas_forecast_years: Option<u32>,
}

fn number(value: Option<f64>) -> f64 {
    value.filter(|v| v.is_finite()).unwrap_or(0.0)
}

fn decline_type(code: Option<&str>, default: DeclineType) -> Result<DeclineType> {
    match code.map(str::trim) {
        None | Some("") => Ok(default),
        Some(code) => {
            DeclineType::from_code(code).ok_or_else(|| EngineError::UnknownDeclineType(code.to_string()))
        }
    }
}

/// An unparseable start date is treated as no start
fn start_month(raw: Option<&str>, field: &str) -> Option<Month> {
    let raw = raw.map(str::trim).filter(|s| !s.is_empty())?;
    match Month::parse(raw) {
        Ok(month) => Some(month),
        Err(_) => {
            warn!("{} '{}' is not a date, phase will not be forecast", field, raw);
            None
        }
    }
}

impl WellDeclineInputs {
    /// Normalize the record into per-phase parameters
    pub fn to_parameters(&self, config: &EngineConfig) -> Result<WellForecastInputs> {
        let oil = DeclineParameters {
            initial_rate: number(self.oil_calc_qi),
            economic_limit_rate: number(self.oil_q_min),
            decline_type: decline_type(self.oil_decline_type.as_deref(), config.default_oil_decline)?,
            b_factor: self
                .oil_calc_b_factor
                .filter(|b| b.is_finite())
                .unwrap_or(config.b_factor_floor),
            initial_annual_decline: number(self.oil_empirical_di),
            terminal_annual_decline: number(self.oil_d_min),
            forecast_start_month: start_month(self.fcst_start_oil.as_deref(), "FCST_START_OIL"),
        };

        let gas = DeclineParameters {
            initial_rate: number(self.gas_calc_qi),
            economic_limit_rate: number(self.gas_q_min),
            decline_type: decline_type(self.gas_decline_type.as_deref(), config.default_gas_decline)?,
            b_factor: self
                .gas_calc_b_factor
                .filter(|b| b.is_finite())
                .unwrap_or(config.b_factor_floor),
            initial_annual_decline: number(self.gas_empirical_di),
            terminal_annual_decline: number(self.gas_d_min),
            forecast_start_month: start_month(self.fcst_start_gas.as_deref(), "FCST_START_GAS"),
        };

        // Zero or negative horizons mean no cutoff
        let gas_forecast_years = self
            .gas_fcst_yrs
            .filter(|y| y.is_finite() && *y >= 1.0)
            .map(|y| y.trunc() as u32);

        Ok(WellForecastInputs {
            oil,
            gas,
            gas_forecast_years,
        })
    }
}

/// Plain Arps inputs for the bulk forecast path
///
/// `di` is the decline per period (month) and `b == 0` is exponential. No
/// economic limit or terminal decline applies: exactly `periods` months are
/// forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArpsInputs {
    #[serde(default)]
    pub phase: Phase,
    pub qi: f64,
    pub di: f64,
    #[serde(default)]
    pub b: f64,
    #[serde(default)]
    pub periods: usize,
    /// First forecast month; defaults to the month after the last actual
    #[serde(default)]
    pub start: Option<Month>,
}

/// Load a JSON object mapping well id to its bulk Arps inputs
pub fn load_arps_inputs<P: AsRef<Path>>(path: P) -> Result<BTreeMap<String, ArpsInputs>> {
    let file = File::open(path)?;
    Ok(serde_json::from_reader(file)?)
}

/// Load a JSON object mapping well id to its settings record
pub fn load_decline_inputs<P: AsRef<Path>>(path: P) -> Result<BTreeMap<String, WellDeclineInputs>> {
    let file = File::open(path)?;
    Ok(serde_json::from_reader(file)?)
}
