//! Forecast construction: merged history + decline forecast per well

mod builder;
mod series;

pub use builder::ForecastBuilder;
pub use series::{MergedSeries, MonthlyEntry};
