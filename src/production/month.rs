//! Calendar month used as the time axis of every series

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// A calendar month (day implicitly 1)
///
/// Ordering follows the calendar. Arithmetic works on a linear month index
/// (`year * 12 + month - 1`), so offsets across year boundaries need no
/// special handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Month {
    year: i32,
    /// 1-12
    month: u32,
}

impl Month {
    /// Create a month; out-of-range month numbers roll into adjacent years
    pub const fn new(year: i32, month: u32) -> Self {
        Self::from_index(year * 12 + month as i32 - 1)
    }

    /// Month from its linear index
    pub const fn from_index(index: i32) -> Self {
        Self {
            year: index.div_euclid(12),
            month: index.rem_euclid(12) as u32 + 1,
        }
    }

    /// Linear month index
    pub const fn index(&self) -> i32 {
        self.year * 12 + self.month as i32 - 1
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// Shift by a signed number of months, saturating at the ends of the axis
    pub fn add_months(&self, months: i32) -> Self {
        Self::from_index(self.index().saturating_add(months))
    }

    /// Signed number of months from `earlier` to `self`
    pub fn months_since(&self, earlier: Month) -> i32 {
        self.index() - earlier.index()
    }

    /// Month containing a date
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// The month containing today's date (UTC)
    pub fn current() -> Self {
        Self::from_date(Utc::now().date_naive())
    }

    /// Parse `YYYY-MM-DD`, `YYYY-MM` or an RFC 3339 timestamp, dropping the day
    pub fn parse(value: &str) -> Result<Self> {
        let trimmed = value.trim();

        if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
            return Ok(Self::from_date(date));
        }
        if let Ok(ts) = DateTime::parse_from_rfc3339(trimmed) {
            return Ok(Self::from_date(ts.with_timezone(&Utc).date_naive()));
        }
        if let Ok(date) = NaiveDate::parse_from_str(&format!("{}-01", trimmed), "%Y-%m-%d") {
            return Ok(Self::from_date(date));
        }
        // Database exports sometimes carry a time component without an offset
        if let Some((date_part, _)) = trimmed.split_once(|c| c == 'T' || c == ' ') {
            if let Ok(date) = NaiveDate::parse_from_str(date_part, "%Y-%m-%d") {
                return Ok(Self::from_date(date));
            }
        }

        Err(EngineError::InvalidMonth(value.to_string()))
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-01", self.year, self.month)
    }
}

impl FromStr for Month {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Month {
    type Error = EngineError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<Month> for String {
    fn from(month: Month) -> Self {
        month.to_string()
    }
}
