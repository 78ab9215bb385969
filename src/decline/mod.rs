//! Decline curves and the parameters that drive them

mod curve;
mod params;
pub mod inputs;

pub use curve::{arps_rates, rates, DeclineCurve, DeclineSchedule, DeclineType};
pub use inputs::{load_arps_inputs, load_decline_inputs, ArpsInputs, WellDeclineInputs, WellForecastInputs};
pub use params::{DeclineParameters, Phase};
