//! Portfolio runner for batch forecasting across wells
//!
//! Holds one configuration and reuses it for every well. Builds are
//! independent per well, so they run in parallel.

use std::collections::{BTreeMap, BTreeSet};

use log::{info, warn};
use rayon::prelude::*;

use crate::aggregate::{AggregateSeries, ProductionAggregator, WellSelection};
use crate::config::EngineConfig;
use crate::decline::{ArpsInputs, WellDeclineInputs, WellForecastInputs};
use crate::forecast::{ForecastBuilder, MergedSeries};
use crate::production::{Month, ProductionRecord};
use crate::reserves::{OwnerInterest, ReservesCalculator, WellReserves};

/// Batch runner over many wells
///
/// # Example
/// ```ignore
/// let runner = PortfolioRunner::new(config);
/// let inputs = runner.resolve_inputs(&load_decline_inputs("params.json")?);
/// let series = runner.build_all(&group_by_well(rows), &inputs);
/// let totals = runner.aggregate(&series, &WellSelection::All);
/// ```
#[derive(Debug, Clone, Default)]
pub struct PortfolioRunner {
    builder: ForecastBuilder,
    aggregator: ProductionAggregator,
    calculator: ReservesCalculator,
}

impl PortfolioRunner {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            aggregator: ProductionAggregator::new(&config),
            calculator: ReservesCalculator::new(&config),
            builder: ForecastBuilder::new(config),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        self.builder.config()
    }

    /// Convert raw settings records, skipping wells whose settings are invalid
    pub fn resolve_inputs(&self, raw: &BTreeMap<String, WellDeclineInputs>) -> BTreeMap<String, WellForecastInputs> {
        raw.iter()
            .filter_map(|(well_id, record)| match record.to_parameters(self.config()) {
                Ok(inputs) => Some((well_id.clone(), inputs)),
                Err(e) => {
                    warn!("skipping decline settings for well {}: {}", well_id, e);
                    None
                }
            })
            .collect()
    }

    /// Build every well's merged series in parallel
    ///
    /// Wells without decline inputs get a history-only series. Output is in
    /// well-id order.
    pub fn build_all(
        &self,
        wells: &BTreeMap<String, Vec<ProductionRecord>>,
        inputs: &BTreeMap<String, WellForecastInputs>,
    ) -> Vec<MergedSeries> {
        let well_list: Vec<(&String, &Vec<ProductionRecord>)> = wells.iter().collect();

        let series: Vec<MergedSeries> = well_list
            .par_iter()
            .map(|(well_id, rows)| match inputs.get(*well_id) {
                Some(well_inputs) => self.builder.build_well(well_id, rows, well_inputs),
                None => MergedSeries::history_only(well_id.as_str(), rows),
            })
            .collect();

        let forecast_count = series.iter().filter(|s| s.forecast_origin.is_some()).count();
        info!("built {} wells ({} with forecasts)", series.len(), forecast_count);
        series
    }

    /// Bulk Arps forecasts for every well in parallel
    ///
    /// Covers every well with either history or Arps inputs; wells with inputs
    /// but no history are forecast from their explicit start month.
    pub fn build_all_arps(
        &self,
        wells: &BTreeMap<String, Vec<ProductionRecord>>,
        arps: &BTreeMap<String, ArpsInputs>,
    ) -> Vec<MergedSeries> {
        let well_ids: Vec<&String> = wells.keys().chain(arps.keys()).collect::<BTreeSet<_>>().into_iter().collect();

        let series: Vec<MergedSeries> = well_ids
            .par_iter()
            .map(|well_id| {
                let rows = wells.get(*well_id).map(Vec::as_slice).unwrap_or_default();
                match arps.get(*well_id) {
                    Some(params) => self.builder.build_arps(well_id, rows, params),
                    None => MergedSeries::history_only(well_id.as_str(), rows),
                }
            })
            .collect();

        info!("built {} wells from bulk Arps inputs ({} parameter sets)", series.len(), arps.len());
        series
    }

    /// Portfolio totals for the selected wells
    pub fn aggregate(&self, series: &[MergedSeries], selection: &WellSelection) -> AggregateSeries {
        self.aggregator.aggregate(series, selection)
    }

    /// Reserves for every well, in parallel
    ///
    /// Wells missing from `owner_interests` are treated as unknown interest.
    pub fn reserves_all(
        &self,
        series: &[MergedSeries],
        owner_interests: &BTreeMap<String, OwnerInterest>,
        as_of: Month,
    ) -> Vec<(String, WellReserves)> {
        series
            .par_iter()
            .map(|s| {
                let interest = owner_interests.get(&s.well_id).copied().unwrap_or_default();
                (s.well_id.clone(), self.calculator.reserves(&s.entries, interest, as_of))
            })
            .collect()
    }
}
