//! Single-well editing session
//!
//! Opening a well captures its value baseline and owner interest; every
//! parameter edit is followed by a full re-evaluation. Opening another well
//! or closing the editor discards the baseline. One editor serves one user,
//! so concurrent edits to the same well need to be serialized by the caller.

use log::info;
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::decline::{DeclineParameters, WellForecastInputs};
use crate::forecast::{ForecastBuilder, MergedSeries};
use crate::production::{Month, ProductionRecord};
use crate::reserves::{OwnerInterest, ReservesCalculator, WellReserves};
use crate::valuation::{ValueBaseline, ValueScaler};

/// Everything held for the well currently open
#[derive(Debug, Clone)]
pub struct WellSession {
    pub well_id: String,
    pub production: Vec<ProductionRecord>,
    pub inputs: WellForecastInputs,
    pub owner_interest: OwnerInterest,
    pub baseline: ValueBaseline,
}

/// Result of one evaluation of the open well
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditorView {
    pub series: MergedSeries,
    pub reserves: WellReserves,
    /// Rescaled present value; None when the well has no baseline PV
    pub present_value: Option<f64>,
}

/// Editing session host
#[derive(Debug, Clone)]
pub struct WellEditor {
    builder: ForecastBuilder,
    calculator: ReservesCalculator,
    session: Option<WellSession>,
}

impl WellEditor {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            calculator: ReservesCalculator::new(&config),
            builder: ForecastBuilder::new(config),
            session: None,
        }
    }

    /// Open a well, returning the session it replaces
    pub fn open(&mut self, session: WellSession) -> Option<WellSession> {
        info!("opening well {} for editing", session.well_id);
        self.session.replace(session)
    }

    /// Close the open well, discarding its baseline
    pub fn close(&mut self) -> Option<WellSession> {
        self.session.take()
    }

    pub fn session(&self) -> Option<&WellSession> {
        self.session.as_ref()
    }

    /// Replace the oil parameters of the open well
    pub fn set_oil(&mut self, params: DeclineParameters) {
        if let Some(session) = self.session.as_mut() {
            session.inputs.oil = params;
        }
    }

    /// Replace the gas parameters of the open well
    pub fn set_gas(&mut self, params: DeclineParameters) {
        if let Some(session) = self.session.as_mut() {
            session.inputs.gas = params;
        }
    }

    pub fn set_gas_forecast_years(&mut self, years: Option<u32>) {
        if let Some(session) = self.session.as_mut() {
            session.inputs.gas_forecast_years = years;
        }
    }

    /// Rebuild the forecast, reserves and value for the open well
    pub fn evaluate(&self, as_of: Month) -> Option<EditorView> {
        let session = self.session.as_ref()?;

        let series = self
            .builder
            .build_well(&session.well_id, &session.production, &session.inputs);
        let reserves = self
            .calculator
            .reserves(&series.entries, session.owner_interest, as_of);
        let present_value = ValueScaler::scale(reserves.net_eur(), &session.baseline);

        Some(EditorView {
            series,
            reserves,
            present_value,
        })
    }
}
