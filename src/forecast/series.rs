//! Merged monthly series (history + forecast) for one well

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::decline::Phase;
use crate::production::{Month, ProductionRecord};

/// One month of a merged series
///
/// History carries 0 where nothing was reported. Forecast carries None where
/// the phase has no forecast coverage, which is not the same as a forecast of
/// zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyEntry {
    pub month: Month,
    pub history_oil: f64,
    pub history_gas: f64,
    pub forecast_oil: Option<f64>,
    pub forecast_gas: Option<f64>,
}

impl MonthlyEntry {
    /// An entry with no data on any channel
    pub fn empty(month: Month) -> Self {
        Self {
            month,
            history_oil: 0.0,
            history_gas: 0.0,
            forecast_oil: None,
            forecast_gas: None,
        }
    }

    pub fn history(&self, phase: Phase) -> f64 {
        match phase {
            Phase::Oil => self.history_oil,
            Phase::Gas => self.history_gas,
        }
    }

    pub fn forecast(&self, phase: Phase) -> Option<f64> {
        match phase {
            Phase::Oil => self.forecast_oil,
            Phase::Gas => self.forecast_gas,
        }
    }
}

/// A well's merged series, ascending by month
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MergedSeries {
    pub well_id: String,

    pub entries: Vec<MonthlyEntry>,

    /// Shared month-0 of the oil and gas forecasts, if either was forecast
    pub forecast_origin: Option<Month>,
}

impl MergedSeries {
    pub fn new(well_id: impl Into<String>, entries: Vec<MonthlyEntry>, forecast_origin: Option<Month>) -> Self {
        Self {
            well_id: well_id.into(),
            entries,
            forecast_origin,
        }
    }

    /// Series of actuals only; every forecast channel is None
    pub fn history_only(well_id: impl Into<String>, rows: &[ProductionRecord]) -> Self {
        Self::new(well_id, history_entries(rows).into_values().collect(), None)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MonthlyEntry> {
        self.entries.iter()
    }

    /// Total actual volume for a phase
    pub fn total_history(&self, phase: Phase) -> f64 {
        self.entries.iter().map(|e| e.history(phase)).sum()
    }
}

/// Sum rows per month into history-only entries
pub(crate) fn history_entries(rows: &[ProductionRecord]) -> BTreeMap<Month, MonthlyEntry> {
    let mut by_month: BTreeMap<Month, MonthlyEntry> = BTreeMap::new();
    for row in rows {
        let entry = by_month
            .entry(row.month)
            .or_insert_with(|| MonthlyEntry::empty(row.month));
        entry.history_oil += row.oil_volume;
        entry.history_gas += row.gas_volume;
    }
    by_month
}
