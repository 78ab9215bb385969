//! Forecast builder: history plus oil and gas decline forecasts on one axis

use std::collections::BTreeMap;

use log::{debug, warn};

use super::series::{history_entries, MergedSeries, MonthlyEntry};
use crate::config::EngineConfig;
use crate::decline::{arps_rates, ArpsInputs, DeclineParameters, Phase, WellForecastInputs};
use crate::production::{production_span, Month, ProductionRecord};

/// Builds merged monthly series from production history and decline inputs
///
/// Holds configuration only. Every call recomputes from scratch, so the same
/// inputs always produce the same series.
#[derive(Debug, Clone, Default)]
pub struct ForecastBuilder {
    config: EngineConfig,
}

/// Clamp a start month into the producing history, when the history is known
fn clamp_start(start: Month, first: Option<Month>, last: Option<Month>, phase: Phase) -> Month {
    let mut clamped = start;
    if let Some(first) = first {
        clamped = clamped.max(first);
    }
    if let Some(last) = last {
        clamped = clamped.min(last);
    }
    if clamped != start {
        warn!("{:?} forecast start {} moved into producing history at {}", phase, start, clamped);
    }
    clamped
}

impl ForecastBuilder {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Merge one well's history with its oil and gas forecasts
    ///
    /// `rows` must belong to a single well. `gas_forecast_years` truncates the
    /// gas forecast to that many years after the shared forecast origin.
    pub fn build(
        &self,
        rows: &[ProductionRecord],
        oil: &DeclineParameters,
        gas: &DeclineParameters,
        first_prod_month: Option<Month>,
        last_prod_month: Option<Month>,
        gas_forecast_years: Option<u32>,
    ) -> Vec<MonthlyEntry> {
        self.build_with_origin(rows, oil, gas, first_prod_month, last_prod_month, gas_forecast_years)
            .0
    }

    /// Build a well's merged series, taking the history span from its rows
    pub fn build_well(&self, well_id: &str, rows: &[ProductionRecord], inputs: &WellForecastInputs) -> MergedSeries {
        let span = production_span(rows);
        let (entries, origin) = self.build_with_origin(
            rows,
            &inputs.oil,
            &inputs.gas,
            span.map(|(first, _)| first),
            span.map(|(_, last)| last),
            inputs.gas_forecast_years,
        );
        MergedSeries::new(well_id, entries, origin)
    }

    /// Bulk path: history plus a plain Arps forecast for one phase
    ///
    /// Period 1 lands on `params.start`, or on the month after the last
    /// actual. With neither, or with zero periods, the series is history only.
    /// The forecast is capped at `max_periods` months.
    pub fn build_arps(&self, well_id: &str, rows: &[ProductionRecord], params: &ArpsInputs) -> MergedSeries {
        let mut merged = history_entries(rows);
        let start = params
            .start
            .or_else(|| production_span(rows).map(|(_, last)| last.add_months(1)));

        let Some(start) = start.filter(|_| params.periods > 0) else {
            if params.periods > 0 {
                warn!("well {} has no history and no Arps start month, not forecast", well_id);
            }
            return MergedSeries::new(well_id, merged.into_values().collect(), None);
        };

        let periods = params.periods.min(self.config.max_periods);
        for (i, rate) in arps_rates(params.qi, params.di, params.b, periods).into_iter().enumerate() {
            let month = start.add_months(i as i32);
            let entry = merged.entry(month).or_insert_with(|| MonthlyEntry::empty(month));
            match params.phase {
                Phase::Oil => entry.forecast_oil = Some(rate),
                Phase::Gas => entry.forecast_gas = Some(rate),
            }
        }

        debug!("{:?} Arps forecast for {}: {} months from {}", params.phase, well_id, periods, start);
        MergedSeries::new(well_id, merged.into_values().collect(), Some(start))
    }

    fn build_with_origin(
        &self,
        rows: &[ProductionRecord],
        oil: &DeclineParameters,
        gas: &DeclineParameters,
        first_prod_month: Option<Month>,
        last_prod_month: Option<Month>,
        gas_forecast_years: Option<u32>,
    ) -> (Vec<MonthlyEntry>, Option<Month>) {
        let mut merged = history_entries(rows);

        let oil_start = oil
            .forecast_start_month
            .map(|m| clamp_start(m, first_prod_month, last_prod_month, Phase::Oil));
        let gas_start = gas
            .forecast_start_month
            .map(|m| clamp_start(m, first_prod_month, last_prod_month, Phase::Gas));

        // Earlier of the two starts is month 0 of the shared axis
        let origin = match (oil_start, gas_start) {
            (Some(o), Some(g)) => Some(o.min(g)),
            (start, None) | (None, start) => start,
        };

        if let Some(origin) = origin {
            let gas_cutoff = self.gas_horizon_months(gas_forecast_years).map(|months| origin.add_months(months));

            if let Some(start) = oil_start {
                self.place_forecast(&mut merged, Phase::Oil, oil, origin, start, None);
            }
            if let Some(start) = gas_start {
                self.place_forecast(&mut merged, Phase::Gas, gas, origin, start, gas_cutoff);
            }
        }

        debug!(
            "merged series: {} months, forecast origin {:?}",
            merged.len(),
            origin.map(|m| m.to_string())
        );

        (merged.into_values().collect(), origin)
    }

    /// Gas horizon in months, or None for no cutoff
    ///
    /// A horizon that overflows, or that reaches past `max_periods`, cannot
    /// truncate anything and is treated as no cutoff.
    fn gas_horizon_months(&self, gas_forecast_years: Option<u32>) -> Option<i32> {
        let years = gas_forecast_years?;
        let months = i32::try_from(years).ok().and_then(|y| y.checked_mul(12));
        match months {
            Some(months) if (months as usize) < self.config.max_periods => Some(months),
            _ => {
                debug!("gas horizon of {} years is beyond the forecast, no cutoff", years);
                None
            }
        }
    }

    /// Write one phase's rates onto the shared axis
    ///
    /// Rates past `max_periods` months from the origin are dropped, as are
    /// months after `cutoff`.
    fn place_forecast(
        &self,
        merged: &mut BTreeMap<Month, MonthlyEntry>,
        phase: Phase,
        params: &DeclineParameters,
        origin: Month,
        start: Month,
        cutoff: Option<Month>,
    ) {
        let schedule = params.schedule(&self.config);
        let offset = start.months_since(origin).max(0) as usize;
        let length = schedule.len().min(self.config.max_periods.saturating_sub(offset));

        for (i, &rate) in schedule.rates.iter().take(length).enumerate() {
            let month = origin.add_months((offset + i) as i32);
            if cutoff.is_some_and(|c| month > c) {
                break;
            }
            let entry = merged.entry(month).or_insert_with(|| MonthlyEntry::empty(month));
            match phase {
                Phase::Oil => entry.forecast_oil = Some(rate),
                Phase::Gas => entry.forecast_gas = Some(rate),
            }
        }

        debug!("{:?} forecast: {} months placed at offset {}", phase, length, offset);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decline::DeclineType;
    use approx::assert_relative_eq;

    fn history(months: i32, start: Month) -> Vec<ProductionRecord> {
        (0..months)
            .map(|i| ProductionRecord::new("W1", start.add_months(i), 500.0 - i as f64, 2000.0))
            .collect()
    }

    fn exp_params(qi: f64, start: Option<Month>) -> DeclineParameters {
        DeclineParameters {
            initial_rate: qi,
            economic_limit_rate: 1.0,
            decline_type: DeclineType::Exponential,
            b_factor: 0.8,
            initial_annual_decline: 0.5,
            terminal_annual_decline: 0.0,
            forecast_start_month: start,
        }
    }

    #[test]
    fn test_history_only_when_no_start() {
        let builder = ForecastBuilder::default();
        let rows = history(6, Month::new(2022, 1));
        let none = DeclineParameters::none(DeclineType::Exponential);
        let entries = builder.build(&rows, &none, &none, Some(Month::new(2022, 1)), Some(Month::new(2022, 6)), None);

        assert_eq!(entries.len(), 6);
        assert!(entries.iter().all(|e| e.forecast_oil.is_none() && e.forecast_gas.is_none()));
    }

    #[test]
    fn test_start_clamped_into_history() {
        let builder = ForecastBuilder::default();
        let first = Month::new(2022, 1);
        let last = Month::new(2022, 12);
        let rows = history(12, first);

        // Oil start after history ends lands on the last producing month
        let oil = exp_params(400.0, Some(Month::new(2030, 1)));
        let none = DeclineParameters::none(DeclineType::Exponential);
        let entries = builder.build(&rows, &oil, &none, Some(first), Some(last), None);
        let first_fc = entries.iter().find(|e| e.forecast_oil.is_some()).unwrap();
        assert_eq!(first_fc.month, last);
        assert_eq!(first_fc.forecast_oil, Some(400.0));

        // Gas start before history begins lands on the first producing month
        let gas = exp_params(900.0, Some(Month::new(2015, 6)));
        let entries = builder.build(&rows, &none, &gas, Some(first), Some(last), None);
        let first_fc = entries.iter().find(|e| e.forecast_gas.is_some()).unwrap();
        assert_eq!(first_fc.month, first);
    }

    #[test]
    fn test_phases_offset_on_shared_axis() {
        let builder = ForecastBuilder::default();
        let first = Month::new(2020, 1);
        let last = Month::new(2022, 12);
        let rows = history(36, first);

        let oil = exp_params(300.0, Some(Month::new(2022, 6)));
        let gas = exp_params(1500.0, Some(Month::new(2022, 1)));
        let entries = builder.build(&rows, &oil, &gas, Some(first), Some(last), None);

        let by_month: BTreeMap<Month, &MonthlyEntry> = entries.iter().map(|e| (e.month, e)).collect();
        assert_eq!(by_month[&Month::new(2022, 1)].forecast_gas, Some(1500.0));
        assert_eq!(by_month[&Month::new(2022, 1)].forecast_oil, None);
        assert_eq!(by_month[&Month::new(2022, 6)].forecast_oil, Some(300.0));

        // History and forecast coexist in overlapping months
        let overlap = by_month[&Month::new(2022, 6)];
        assert!(overlap.history_oil > 0.0);

        // Ascending, unique months
        for pair in entries.windows(2) {
            assert!(pair[0].month < pair[1].month);
        }
    }

    #[test]
    fn test_gas_horizon_truncates_gas_only() {
        let builder = ForecastBuilder::default();
        let first = Month::new(2020, 1);
        let last = Month::new(2020, 12);
        let rows = history(12, first);
        let start = Some(Month::new(2020, 12));

        let mut oil = exp_params(300.0, start);
        oil.initial_annual_decline = 0.05;
        let mut gas = exp_params(1500.0, start);
        gas.initial_annual_decline = 0.05;

        let entries = builder.build(&rows, &oil, &gas, Some(first), Some(last), Some(2));
        let cutoff = Month::new(2022, 12);

        let last_gas = entries.iter().filter(|e| e.forecast_gas.is_some()).map(|e| e.month).max().unwrap();
        assert_eq!(last_gas, cutoff);
        assert!(entries.iter().any(|e| e.month > cutoff && e.forecast_oil.is_some()));
    }

    #[test]
    fn test_oversized_gas_horizon_means_no_cutoff() {
        let builder = ForecastBuilder::default();
        let rows = history(12, Month::new(2020, 1));
        let record = |years: &str| -> WellForecastInputs {
            let json = format!(
                r#"{{"GAS_CALC_QI": 1500, "GAS_Q_MIN": 1, "GAS_DECLINE_TYPE": "EXP",
                    "GAS_EMPIRICAL_DI": 0.3, "FCST_START_GAS": "2020-12-01", "GAS_FCST_YRS": {}}}"#,
                years
            );
            let raw: crate::decline::WellDeclineInputs = serde_json::from_str(&json).unwrap();
            raw.to_parameters(builder.config()).unwrap()
        };
        let gas_months = |inputs: &WellForecastInputs| {
            builder
                .build_well("W1", &rows, inputs)
                .iter()
                .filter(|e| e.forecast_gas.is_some())
                .count()
        };

        let mut unlimited = record("1");
        unlimited.gas_forecast_years = None;
        let full = gas_months(&unlimited);
        assert!(full > 13);

        assert_eq!(gas_months(&record("1")), 13);
        assert_eq!(gas_months(&record("3e8")), full);
        assert_eq!(gas_months(&record("5e9")), full);
        assert_eq!(gas_months(&record("50")), full);
    }

    #[test]
    fn test_forecast_limited_to_max_periods_from_origin() {
        let config = EngineConfig {
            max_periods: 24,
            ..Default::default()
        };
        let builder = ForecastBuilder::new(config);
        let first = Month::new(2021, 1);
        let last = Month::new(2021, 12);
        let rows = history(12, first);

        let mut oil = exp_params(300.0, Some(Month::new(2021, 1)));
        oil.initial_annual_decline = 0.01;
        let mut gas = exp_params(300.0, Some(Month::new(2021, 11)));
        gas.initial_annual_decline = 0.01;

        let entries = builder.build(&rows, &oil, &gas, Some(first), Some(last), None);
        let oil_months = entries.iter().filter(|e| e.forecast_oil.is_some()).count();
        let gas_months = entries.iter().filter(|e| e.forecast_gas.is_some()).count();
        assert_eq!(oil_months, 24);
        // Gas starts 10 months into the 24-month axis
        assert_eq!(gas_months, 14);
    }

    #[test]
    fn test_build_is_deterministic() {
        let builder = ForecastBuilder::default();
        let first = Month::new(2019, 3);
        let rows = history(30, first);
        let oil = DeclineParameters {
            initial_rate: 800.0,
            economic_limit_rate: 5.0,
            decline_type: DeclineType::Hyperbolic,
            b_factor: 1.1,
            initial_annual_decline: 0.7,
            terminal_annual_decline: 0.06,
            forecast_start_month: Some(Month::new(2021, 6)),
        };
        let gas = exp_params(2500.0, Some(Month::new(2021, 2)));
        let inputs = WellForecastInputs {
            oil,
            gas,
            gas_forecast_years: Some(20),
        };

        let a = builder.build_well("W1", &rows, &inputs);
        let b = builder.build_well("W1", &rows, &inputs);
        assert_eq!(a, b);
        assert_eq!(a.forecast_origin, Some(Month::new(2021, 2)));
        for (x, y) in a.entries.iter().zip(&b.entries) {
            assert_eq!(x.forecast_oil.map(f64::to_bits), y.forecast_oil.map(f64::to_bits));
        }
    }

    fn arps(periods: usize, start: Option<Month>) -> ArpsInputs {
        ArpsInputs {
            phase: Phase::Oil,
            qi: 400.0,
            di: 0.05,
            b: 0.0,
            periods,
            start,
        }
    }

    #[test]
    fn test_arps_forecast_follows_history() {
        let builder = ForecastBuilder::default();
        let rows = history(6, Month::new(2022, 1));
        let series = builder.build_arps("W1", &rows, &arps(12, None));

        assert_eq!(series.len(), 18);
        assert_eq!(series.forecast_origin, Some(Month::new(2022, 7)));
        let first_fc = &series.entries[6];
        assert_eq!(first_fc.month, Month::new(2022, 7));
        assert_relative_eq!(first_fc.forecast_oil.unwrap(), 400.0 * (-0.05_f64).exp(), epsilon = 1e-9);
        assert_relative_eq!(
            series.entries[17].forecast_oil.unwrap(),
            400.0 * (-0.05_f64 * 12.0).exp(),
            epsilon = 1e-9
        );
        assert!(series.iter().all(|e| e.forecast_gas.is_none()));
    }

    #[test]
    fn test_arps_forecast_explicit_start_and_gas_phase() {
        let builder = ForecastBuilder::default();
        let mut params = arps(3, Some(Month::new(2030, 1)));
        params.phase = Phase::Gas;
        params.b = 0.5;

        let series = builder.build_arps("W9", &[], &params);
        assert_eq!(series.len(), 3);
        assert_eq!(series.entries[0].month, Month::new(2030, 1));
        assert!(series.entries[0].forecast_gas.is_some());
        assert!(series.entries[0].forecast_oil.is_none());
    }

    #[test]
    fn test_arps_forecast_without_anchor_or_periods_is_history_only() {
        let builder = ForecastBuilder::default();
        assert!(builder.build_arps("W1", &[], &arps(12, None)).is_empty());

        let rows = history(4, Month::new(2022, 1));
        let series = builder.build_arps("W1", &rows, &arps(0, None));
        assert_eq!(series.len(), 4);
        assert_eq!(series.forecast_origin, None);
    }

    #[test]
    fn test_arps_forecast_capped_at_max_periods() {
        let config = EngineConfig {
            max_periods: 10,
            ..Default::default()
        };
        let builder = ForecastBuilder::new(config);
        let series = builder.build_arps("W1", &[], &arps(50, Some(Month::new(2025, 1))));
        assert_eq!(series.len(), 10);
    }

    #[test]
    fn test_forecast_without_history_is_unclamped() {
        let builder = ForecastBuilder::default();
        let oil = exp_params(100.0, Some(Month::new(2026, 1)));
        let none = DeclineParameters::none(DeclineType::Exponential);
        let entries = builder.build(&[], &oil, &none, None, None, None);

        assert_eq!(entries[0].month, Month::new(2026, 1));
        assert_relative_eq!(entries[1].forecast_oil.unwrap(), 100.0 * (-0.5_f64 / 12.0).exp(), epsilon = 1e-9);
    }
}
