//! Core types for reserve calculations

use log::warn;
use serde::{Deserialize, Serialize};

use crate::production::Month;

/// Owner's net revenue interest in a well
///
/// `Unknown` is distinct from `Known(0.0)`: an unknown interest leaves every
/// net figure undefined, a zero interest makes them zero.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum OwnerInterest {
    Known(f64),
    #[default]
    Unknown,
}

impl OwnerInterest {
    /// From an optional raw fraction; non-finite is unknown, the rest is
    /// clamped into [0, 1]
    pub fn from_raw(value: Option<f64>) -> Self {
        match value {
            Some(v) if v.is_finite() => {
                let clamped = v.clamp(0.0, 1.0);
                if clamped != v {
                    warn!("owner interest {} outside [0, 1], using {}", v, clamped);
                }
                OwnerInterest::Known(clamped)
            }
            _ => OwnerInterest::Unknown,
        }
    }

    pub fn fraction(&self) -> Option<f64> {
        match self {
            OwnerInterest::Known(f) => Some(*f),
            OwnerInterest::Unknown => None,
        }
    }

    /// Net share of a gross volume
    pub fn apply(&self, gross: Option<f64>) -> Option<f64> {
        match self {
            OwnerInterest::Known(f) if *f == 0.0 => Some(0.0),
            OwnerInterest::Known(f) => gross.map(|g| g * f),
            OwnerInterest::Unknown => None,
        }
    }
}

/// Reserves derived from a well's merged series
///
/// Every figure is optional: None means "no data", which display layers show
/// differently from zero.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WellReserves {
    /// Earliest month with counted volume (either phase)
    pub first_production_month: Option<Month>,

    /// Latest month with counted volume (either phase)
    pub last_production_month: Option<Month>,

    pub gross_oil_eur: Option<f64>,
    pub gross_gas_eur: Option<f64>,

    pub net_oil_eur: Option<f64>,
    pub net_gas_eur: Option<f64>,

    /// Net forecast volume inside the lookahead window
    pub remaining_net_oil: Option<f64>,
    pub remaining_net_gas: Option<f64>,
}

impl WellReserves {
    /// Combined net EUR of both phases
    ///
    /// Undefined phases are skipped; None only if neither phase is defined.
    pub fn net_eur(&self) -> Option<f64> {
        match (self.net_oil_eur, self.net_gas_eur) {
            (None, None) => None,
            (oil, gas) => Some(oil.unwrap_or(0.0) + gas.unwrap_or(0.0)),
        }
    }
}
