//! Portfolio aggregation of per-well merged series
//!
//! Sums history and forecast across a selected subset of wells, month by
//! month, then applies the forecast-backlog trim and the reporting window.
//!
//! # Backlog trim
//!
//! Forecast months that sit well behind the latest reported actual are stale:
//! the history is already in for those months. Only the trailing
//! `backlog_trim_months` months up to and including the latest producing month
//! keep their forecast; earlier forecast is cleared before windowing.

use std::collections::{BTreeMap, BTreeSet};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
pub use crate::config::ReportingWindow;
use crate::forecast::MergedSeries;
use crate::production::Month;

/// Y-axis bounds used when there is nothing positive to plot
pub const DEFAULT_Y_BOUNDS: (f64, f64) = (1.0, 1000.0);

/// Which wells feed the aggregate
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WellSelection {
    /// No selection has been made yet: every well is included
    #[default]
    All,
    /// An explicit selection; an empty set includes no wells
    Only(BTreeSet<String>),
}

impl WellSelection {
    /// Build from a selected-id set and whether the selection is active
    pub fn from_flags<I, S>(selected_well_ids: I, selection_is_active: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if selection_is_active {
            WellSelection::Only(selected_well_ids.into_iter().map(Into::into).collect())
        } else {
            WellSelection::All
        }
    }

    pub fn includes(&self, well_id: &str) -> bool {
        match self {
            WellSelection::All => true,
            WellSelection::Only(ids) => ids.contains(well_id),
        }
    }
}

/// Portfolio monthly totals, aligned by index with `months`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateSeries {
    pub months: Vec<Month>,
    pub oil: Vec<f64>,
    pub gas: Vec<f64>,
    /// None where no included well had forecast coverage, or after trimming
    pub oil_forecast: Vec<Option<f64>>,
    pub gas_forecast: Vec<Option<f64>>,
    /// Wells with an entry in each month
    pub well_count: Vec<usize>,
    /// Log-scale chart bounds
    pub y_min: f64,
    pub y_max: f64,
}

impl AggregateSeries {
    fn empty() -> Self {
        Self {
            months: Vec::new(),
            oil: Vec::new(),
            gas: Vec::new(),
            oil_forecast: Vec::new(),
            gas_forecast: Vec::new(),
            well_count: Vec::new(),
            y_min: DEFAULT_Y_BOUNDS.0,
            y_max: DEFAULT_Y_BOUNDS.1,
        }
    }

    pub fn len(&self) -> usize {
        self.months.len()
    }

    pub fn is_empty(&self) -> bool {
        self.months.is_empty()
    }
}

/// Per-month accumulator
#[derive(Debug, Clone, Default)]
struct MonthBucket {
    oil: f64,
    gas: f64,
    oil_forecast: Option<f64>,
    gas_forecast: Option<f64>,
    wells: usize,
}

fn add_forecast(total: &mut Option<f64>, value: Option<f64>) {
    if let Some(v) = value {
        *total = Some(total.unwrap_or(0.0) + v);
    }
}

/// Powers of ten bracketing the positive values, or the defaults
fn log_bounds<I: IntoIterator<Item = f64>>(values: I) -> (f64, f64) {
    let (min, max) = values
        .into_iter()
        .filter(|v| v.is_finite() && *v > 0.0)
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));

    if min.is_finite() {
        (10f64.powf(min.log10().floor()), 10f64.powf(max.log10().ceil()))
    } else {
        DEFAULT_Y_BOUNDS
    }
}

/// Aggregates merged series into portfolio totals
#[derive(Debug, Clone)]
pub struct ProductionAggregator {
    window: ReportingWindow,
    backlog_trim_months: u32,
}

impl Default for ProductionAggregator {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

impl ProductionAggregator {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            window: config.reporting_window,
            backlog_trim_months: config.backlog_trim_months,
        }
    }

    /// Sum the selected wells' series into windowed monthly totals
    ///
    /// The month axis comes from every well in `per_well_series`, so the axis
    /// does not move when the selection changes; excluded wells contribute
    /// zeros.
    pub fn aggregate(&self, per_well_series: &[MergedSeries], selection: &WellSelection) -> AggregateSeries {
        let mut monthly: BTreeMap<Month, MonthBucket> = BTreeMap::new();
        let mut included = 0usize;

        for series in per_well_series {
            let include = selection.includes(&series.well_id);
            if include {
                included += 1;
            }
            for entry in &series.entries {
                let bucket = monthly.entry(entry.month).or_default();
                if !include {
                    continue;
                }
                bucket.oil += entry.history_oil;
                bucket.gas += entry.history_gas;
                add_forecast(&mut bucket.oil_forecast, entry.forecast_oil);
                add_forecast(&mut bucket.gas_forecast, entry.forecast_gas);
                bucket.wells += 1;
            }
        }

        self.trim_backlog(&mut monthly);

        let mut result = AggregateSeries::empty();
        for (month, bucket) in monthly.into_iter().filter(|(m, _)| self.window.contains(*m)) {
            result.months.push(month);
            result.oil.push(bucket.oil);
            result.gas.push(bucket.gas);
            result.oil_forecast.push(bucket.oil_forecast);
            result.gas_forecast.push(bucket.gas_forecast);
            result.well_count.push(bucket.wells);
        }

        let (y_min, y_max) = log_bounds(
            result
                .oil
                .iter()
                .chain(&result.gas)
                .copied()
                .chain(result.oil_forecast.iter().flatten().copied())
                .chain(result.gas_forecast.iter().flatten().copied()),
        );
        result.y_min = y_min;
        result.y_max = y_max;

        debug!(
            "aggregated {} of {} wells into {} months in window {}..{}",
            included,
            per_well_series.len(),
            result.len(),
            self.window.start,
            self.window.end
        );

        result
    }

    /// Clear forecast older than the trailing trim window behind the latest actual
    fn trim_backlog(&self, monthly: &mut BTreeMap<Month, MonthBucket>) {
        let latest = monthly
            .iter()
            .rev()
            .find(|(_, b)| b.oil > 0.0 || b.gas > 0.0)
            .map(|(m, _)| *m);

        let Some(latest) = latest else {
            return;
        };

        // Only months strictly before the latest actual are ever trimmed
        let keep_from = latest
            .add_months(1 - i32::try_from(self.backlog_trim_months).unwrap_or(i32::MAX))
            .min(latest);
        for (_, bucket) in monthly.range_mut(..keep_from) {
            bucket.oil_forecast = None;
            bucket.gas_forecast = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forecast::MonthlyEntry;
    use approx::assert_relative_eq;

    fn entry(month: Month, oil: f64, gas: f64, oil_fc: Option<f64>, gas_fc: Option<f64>) -> MonthlyEntry {
        MonthlyEntry {
            month,
            history_oil: oil,
            history_gas: gas,
            forecast_oil: oil_fc,
            forecast_gas: gas_fc,
        }
    }

    fn well(id: &str, scale: f64) -> MergedSeries {
        let start = Month::new(2021, 1);
        let entries = (0..24)
            .map(|i| {
                let month = start.add_months(i);
                if i < 12 {
                    entry(month, 100.0 * scale, 300.0 * scale, None, None)
                } else {
                    entry(month, 0.0, 0.0, Some(50.0 * scale), Some(120.0 * scale))
                }
            })
            .collect();
        MergedSeries::new(id, entries, Some(Month::new(2022, 1)))
    }

    fn three_wells() -> Vec<MergedSeries> {
        vec![well("A", 1.0), well("B", 2.0), well("C", 4.0)]
    }

    #[test]
    fn test_selection_of_one_well_matches_that_well() {
        let aggregator = ProductionAggregator::default();
        let wells = three_wells();

        let only_a = aggregator.aggregate(&wells, &WellSelection::from_flags(["A"], true));
        let a_alone = aggregator.aggregate(&wells[..1], &WellSelection::All);

        assert_eq!(only_a.months, a_alone.months);
        assert_eq!(only_a.oil, a_alone.oil);
        assert_eq!(only_a.gas_forecast, a_alone.gas_forecast);
        assert!(only_a.well_count.iter().all(|&c| c == 1));
    }

    #[test]
    fn test_active_empty_selection_is_all_zero() {
        let aggregator = ProductionAggregator::default();
        let wells = three_wells();
        let none: [&str; 0] = [];

        let result = aggregator.aggregate(&wells, &WellSelection::from_flags(none, true));

        assert_eq!(result.len(), 24);
        assert!(result.oil.iter().all(|&v| v == 0.0));
        assert!(result.gas.iter().all(|&v| v == 0.0));
        assert!(result.oil_forecast.iter().all(Option::is_none));
        assert!(result.well_count.iter().all(|&c| c == 0));
        assert_eq!((result.y_min, result.y_max), DEFAULT_Y_BOUNDS);
    }

    #[test]
    fn test_inactive_selection_sums_all_wells() {
        let aggregator = ProductionAggregator::default();
        let wells = three_wells();

        let result = aggregator.aggregate(&wells, &WellSelection::from_flags(["A"], false));

        assert_relative_eq!(result.oil[0], 700.0);
        assert_relative_eq!(result.gas[0], 2100.0);
        assert_relative_eq!(result.oil_forecast[12].unwrap(), 350.0);
        assert!(result.well_count.iter().all(|&c| c == 3));
    }

    #[test]
    fn test_forecast_sum_skips_null_wells() {
        let aggregator = ProductionAggregator::default();
        let m = Month::new(2024, 3);
        let wells = vec![
            MergedSeries::new("A", vec![entry(m, 10.0, 0.0, Some(5.0), None)], None),
            MergedSeries::new("B", vec![entry(m, 20.0, 0.0, None, None)], None),
        ];
        let result = aggregator.aggregate(&wells, &WellSelection::All);
        assert_eq!(result.oil_forecast, vec![Some(5.0)]);
        assert_eq!(result.gas_forecast, vec![None]);
        assert_eq!(result.well_count, vec![2]);
    }

    #[test]
    fn test_backlog_trim() {
        let aggregator = ProductionAggregator::default();
        let latest = Month::new(2024, 10);
        let stale = latest.add_months(-8);
        let recent = latest.add_months(-3);
        let future = latest.add_months(2);

        let mut entries = vec![
            entry(stale, 0.0, 0.0, Some(40.0), Some(90.0)),
            entry(recent, 0.0, 0.0, Some(30.0), Some(80.0)),
            entry(latest, 25.0, 60.0, None, None),
            entry(future, 0.0, 0.0, Some(20.0), Some(70.0)),
        ];
        entries.sort_by_key(|e| e.month);
        let wells = vec![MergedSeries::new("A", entries, Some(stale))];

        let result = aggregator.aggregate(&wells, &WellSelection::All);
        let at = |m: Month| result.months.iter().position(|&x| x == m).unwrap();

        assert_eq!(result.oil_forecast[at(stale)], None);
        assert_eq!(result.gas_forecast[at(stale)], None);
        assert_eq!(result.oil_forecast[at(recent)], Some(30.0));
        assert_eq!(result.gas_forecast[at(future)], Some(70.0));
    }

    #[test]
    fn test_trim_boundary_keeps_six_months_ending_at_latest() {
        let aggregator = ProductionAggregator::default();
        let latest = Month::new(2023, 6);
        let mut entries: Vec<MonthlyEntry> = (1..=7)
            .map(|back| entry(latest.add_months(-back), 0.0, 0.0, Some(1.0), None))
            .collect();
        entries.push(entry(latest, 5.0, 0.0, None, None));
        entries.sort_by_key(|e| e.month);
        let wells = vec![MergedSeries::new("A", entries, None)];

        let result = aggregator.aggregate(&wells, &WellSelection::All);
        let kept: Vec<i32> = result
            .months
            .iter()
            .zip(&result.oil_forecast)
            .filter(|(_, fc)| fc.is_some())
            .map(|(m, _)| latest.months_since(*m))
            .collect();
        assert_eq!(kept, vec![5, 4, 3, 2, 1]);
    }

    #[test]
    fn test_huge_trim_window_keeps_all_forecast() {
        let config = EngineConfig {
            backlog_trim_months: u32::MAX,
            ..Default::default()
        };
        let aggregator = ProductionAggregator::new(&config);
        let latest = Month::new(2023, 6);
        let wells = vec![MergedSeries::new(
            "A",
            vec![
                entry(latest.add_months(-30), 0.0, 0.0, Some(1.0), None),
                entry(latest, 5.0, 0.0, None, None),
            ],
            None,
        )];
        let result = aggregator.aggregate(&wells, &WellSelection::All);
        assert_eq!(result.oil_forecast[0], Some(1.0));
    }

    #[test]
    fn test_reporting_window_applied_after_trim() {
        let aggregator = ProductionAggregator::default();
        let wells = vec![MergedSeries::new(
            "A",
            vec![
                entry(Month::new(2019, 12), 100.0, 0.0, None, None),
                entry(Month::new(2020, 1), 90.0, 0.0, None, None),
                entry(Month::new(2032, 12), 0.0, 0.0, Some(3.0), None),
                entry(Month::new(2033, 1), 0.0, 0.0, Some(2.9), None),
            ],
            None,
        )];
        let result = aggregator.aggregate(&wells, &WellSelection::All);
        assert_eq!(result.months, vec![Month::new(2020, 1), Month::new(2032, 12)]);
    }

    #[test]
    fn test_no_months_in_window_gives_default_bounds() {
        let aggregator = ProductionAggregator::default();
        let wells = vec![MergedSeries::new(
            "A",
            vec![entry(Month::new(2010, 1), 100.0, 0.0, None, None)],
            None,
        )];
        let result = aggregator.aggregate(&wells, &WellSelection::All);
        assert!(result.is_empty());
        assert_eq!((result.y_min, result.y_max), (1.0, 1000.0));

        let empty = aggregator.aggregate(&[], &WellSelection::All);
        assert!(empty.is_empty());
    }

    #[test]
    fn test_log_bounds_bracket_values() {
        let aggregator = ProductionAggregator::default();
        let m = Month::new(2021, 1);
        let wells = vec![MergedSeries::new("A", vec![entry(m, 35.0, 4200.0, None, Some(0.0))], None)];
        let result = aggregator.aggregate(&wells, &WellSelection::All);
        assert_relative_eq!(result.y_min, 10.0);
        assert_relative_eq!(result.y_max, 10000.0);
    }
}
