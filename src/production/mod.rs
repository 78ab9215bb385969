//! Production history data structures and CSV ingestion

mod data;
mod month;
pub mod loader;

pub use data::{production_span, ProductionRecord};
pub(crate) use data::non_negative;
pub use loader::{group_by_well, load_production, load_production_from_reader};
pub use month::Month;
