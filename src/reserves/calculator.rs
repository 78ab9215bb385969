//! EUR and remaining-reserves calculation from a merged series

use log::debug;

use super::types::{OwnerInterest, WellReserves};
use crate::config::EngineConfig;
use crate::decline::Phase;
use crate::forecast::MonthlyEntry;
use crate::production::Month;

/// Running totals for one phase
#[derive(Debug, Default)]
struct PhaseTotals {
    /// History plus counted forecast; None until a month counts
    eur: Option<f64>,
    /// All forecast inside the lookahead window
    remaining: f64,
}

/// Derives gross/net EUR and remaining volumes for a well
#[derive(Debug, Clone)]
pub struct ReservesCalculator {
    lookahead_months: i32,
}

impl Default for ReservesCalculator {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

impl ReservesCalculator {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            lookahead_months: config.lookahead_months(),
        }
    }

    /// Lookahead window `[start, end)` for a valuation month
    ///
    /// Starts at the month after `as_of` and spans the configured years.
    pub fn lookahead_window(&self, as_of: Month) -> (Month, Month) {
        let start = as_of.add_months(1);
        (start, start.add_months(self.lookahead_months))
    }

    /// Reserves as of `as_of` (normally the current month)
    ///
    /// A month counts toward EUR for a phase when it has positive history, or
    /// when it has no history, positive forecast, and lies inside the
    /// lookahead window. Forecast never overrides an actual. Remaining volume
    /// counts every forecast month in the window regardless of history.
    pub fn reserves(&self, series: &[MonthlyEntry], owner_interest: OwnerInterest, as_of: Month) -> WellReserves {
        let (window_start, window_end) = self.lookahead_window(as_of);
        let mut oil = PhaseTotals::default();
        let mut gas = PhaseTotals::default();
        let mut first: Option<Month> = None;
        let mut last: Option<Month> = None;

        for entry in series {
            let in_window = entry.month >= window_start && entry.month < window_end;

            for (phase, totals) in [(Phase::Oil, &mut oil), (Phase::Gas, &mut gas)] {
                let history = entry.history(phase);
                let forecast = entry.forecast(phase).filter(|v| v.is_finite());

                let counted = if history > 0.0 {
                    Some(history)
                } else if history == 0.0 && in_window {
                    forecast.filter(|&v| v > 0.0)
                } else {
                    None
                };

                if let Some(volume) = counted {
                    totals.eur = Some(totals.eur.unwrap_or(0.0) + volume);
                    first = Some(first.map_or(entry.month, |m| m.min(entry.month)));
                    last = Some(last.map_or(entry.month, |m| m.max(entry.month)));
                }

                if in_window {
                    totals.remaining += forecast.unwrap_or(0.0);
                }
            }
        }

        debug!(
            "reserves as of {}: gross oil {:?}, gross gas {:?}, window {}..{}",
            as_of, oil.eur, gas.eur, window_start, window_end
        );

        WellReserves {
            first_production_month: first,
            last_production_month: last,
            gross_oil_eur: oil.eur,
            gross_gas_eur: gas.eur,
            net_oil_eur: owner_interest.apply(oil.eur),
            net_gas_eur: owner_interest.apply(gas.eur),
            remaining_net_oil: owner_interest.apply(Some(oil.remaining)),
            remaining_net_gas: owner_interest.apply(Some(gas.remaining)),
        }
    }
}
