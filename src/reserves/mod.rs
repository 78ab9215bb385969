//! Reserve calculations: gross/net EUR and remaining volumes per well
//!
//! # Counting rules
//!
//! For each phase, a month counts toward EUR when:
//! - it has positive history, or
//! - it has zero history, positive forecast, and falls in the lookahead
//!   window (`reserves_lookahead_years` starting next month).
//!
//! Remaining volume is the owner's share of all forecast inside the window,
//! whether or not history exists in the same month, so it can exceed the
//! forecast part of EUR.
//!
//! # Example
//!
//! ```rust,ignore
//! use decline_engine::reserves::{ReservesCalculator, OwnerInterest};
//! use decline_engine::production::Month;
//!
//! let calculator = ReservesCalculator::default();
//! let reserves = calculator.reserves(&series.entries, OwnerInterest::Known(0.125), Month::current());
//! println!("Net oil EUR: {:?}", reserves.net_oil_eur);
//! ```

mod calculator;
mod types;

pub use calculator::ReservesCalculator;
pub use types::{OwnerInterest, WellReserves};
