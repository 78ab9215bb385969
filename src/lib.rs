//! Decline Engine - decline-curve forecasting and reserves aggregation for oil & gas wells
//!
//! This library provides:
//! - Arps exponential and hyperbolic decline with a terminal exponential switch
//! - Merged history + forecast monthly series per well
//! - Portfolio aggregation over a dynamic well selection
//! - Gross/net EUR and remaining reserves per well
//! - Present-value rescaling against a load-time baseline

pub mod aggregate;
pub mod config;
pub mod decline;
pub mod editor;
pub mod error;
pub mod forecast;
pub mod portfolio;
pub mod production;
pub mod reserves;
pub mod valuation;

// Re-export commonly used types
pub use aggregate::{AggregateSeries, ProductionAggregator, WellSelection};
pub use config::EngineConfig;
pub use decline::{DeclineCurve, DeclineParameters, DeclineType, WellForecastInputs};
pub use editor::{EditorView, WellEditor, WellSession};
pub use error::{EngineError, Result};
pub use forecast::{ForecastBuilder, MergedSeries, MonthlyEntry};
pub use portfolio::PortfolioRunner;
pub use production::{Month, ProductionRecord};
pub use reserves::{OwnerInterest, ReservesCalculator, WellReserves};
pub use valuation::{ValueBaseline, ValueScaler};
