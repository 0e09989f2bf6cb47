// Canonical monthly time axis.
//
// A `Period` is the first day of a calendar month. Every aggregation in the
// dashboard keys on it, so equality and ordering must be chronological.
#[cfg(test)]
use chrono::Datelike;
use chrono::{Months, NaiveDate};
use serde::{Serialize, Serializer};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Period(NaiveDate);

impl Period {
    /// Build a period from a year and a month.
    ///
    /// The month is zero-padded into a `YYYY-MM` key which is then parsed as
    /// day 1 of that month; anything that is not a real calendar month
    /// (month 0, month 13, out-of-range years) yields `None`.
    pub fn from_year_month(year: i64, month: i64) -> Option<Self> {
        let key = format!("{}-{:0>2}", year, month);
        Self::parse_key(&key)
    }

    /// Parse a `YYYY-MM` key.
    pub fn parse_key(key: &str) -> Option<Self> {
        NaiveDate::parse_from_str(&format!("{}-01", key), "%Y-%m-%d")
            .ok()
            .map(Period)
    }

    #[cfg(test)]
    pub fn year(&self) -> i32 {
        self.0.year()
    }

    #[cfg(test)]
    pub fn month(&self) -> u32 {
        self.0.month()
    }

    /// The period `n` calendar months earlier.
    pub fn months_back(&self, n: u32) -> Option<Self> {
        self.0.checked_sub_months(Months::new(n)).map(Period)
    }

    /// `2024-03`
    pub fn key(&self) -> String {
        self.0.format("%Y-%m").to_string()
    }

    /// `Mar-2024`
    pub fn short_label(&self) -> String {
        self.0.format("%b-%Y").to_string()
    }

    /// `March 2024`
    pub fn long_label(&self) -> String {
        self.0.format("%B %Y").to_string()
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

impl Serialize for Period {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.key())
    }
}
