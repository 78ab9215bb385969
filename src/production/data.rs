//! Production history records as ingested from the production database export

use serde::{Deserialize, Serialize};

use super::Month;

/// One month of reported production for one well
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionRecord {
    /// Well identifier (API/UWI)
    pub well_id: String,

    /// Producing month
    pub month: Month,

    /// Oil volume (barrels)
    pub oil_volume: f64,

    /// Gas volume (thousand cubic feet)
    pub gas_volume: f64,
}

impl ProductionRecord {
    /// Create a record, coercing non-finite or negative volumes to zero
    pub fn new(well_id: impl Into<String>, month: Month, oil_volume: f64, gas_volume: f64) -> Self {
        Self {
            well_id: well_id.into(),
            month,
            oil_volume: non_negative(oil_volume),
            gas_volume: non_negative(gas_volume),
        }
    }
}

/// Clamp a volume or rate to a finite, non-negative value
pub(crate) fn non_negative(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

/// First and last producing months of a set of rows
///
/// Returns None for an empty history.
pub fn production_span(rows: &[ProductionRecord]) -> Option<(Month, Month)> {
    let first = rows.iter().map(|r| r.month).min()?;
    let last = rows.iter().map(|r| r.month).max()?;
    Some((first, last))
}
