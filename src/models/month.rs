//! Calendar month key for monthly budgets
//!
//! A `MonthYear` is always the first day of a calendar month. Month ranges are
//! half-open: `[start_date, end_exclusive)`.

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::PlanError;

/// A calendar month, stored as its first day
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "NaiveDate", into = "NaiveDate")]
pub struct MonthYear(NaiveDate);

impl MonthYear {
    /// Create a month from a year and a 1-based month number
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(Self)
    }

    /// The month containing `date`
    pub fn from_date(date: NaiveDate) -> Self {
        Self(date.with_day(1).unwrap_or(date))
    }

    /// The current local calendar month
    pub fn current() -> Self {
        Self::from_date(chrono::Local::now().date_naive())
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    /// First day of the month (inclusive lower bound)
    pub fn start_date(&self) -> NaiveDate {
        self.0
    }

    /// First day of the following month (exclusive upper bound)
    ///
    /// The last month chrono can represent ends at `NaiveDate::MAX`.
    pub fn end_exclusive(&self) -> NaiveDate {
        self.0
            .checked_add_months(Months::new(1))
            .unwrap_or(NaiveDate::MAX)
    }

    /// Check if a date falls within this month
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start_date() && date < self.end_exclusive()
    }

    /// The following month; stays put at the end of chrono's range
    pub fn next(&self) -> Self {
        self.0
            .checked_add_months(Months::new(1))
            .map_or(*self, Self)
    }

    /// The preceding month; stays put at the start of chrono's range
    pub fn prev(&self) -> Self {
        self.0
            .checked_sub_months(Months::new(1))
            .map_or(*self, Self)
    }

    /// Calendar-month distance from this month to the month containing `date`
    ///
    /// Same month is 0, next month is 1, the previous month is -1.
    pub fn months_until(&self, date: NaiveDate) -> i64 {
        let years = i64::from(date.year()) - i64::from(self.year());
        let months = i64::from(date.month()) - i64::from(self.month());
        years * 12 + months
    }

    /// The "YYYY-MM" token
    pub fn token(&self) -> String {
        format!("{:04}-{:02}", self.year(), self.month())
    }

    /// Human-friendly form, e.g. "January 2025"
    pub fn friendly(&self) -> String {
        self.0.format("%B %Y").to_string()
    }

    /// Parse a month token
    ///
    /// Accepts "YYYY-MM" and full "YYYY-MM-DD" dates (normalized to day 1).
    pub fn parse(s: &str) -> Result<Self, MonthParseError> {
        let s = s.trim();

        if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            return Ok(Self::from_date(date));
        }

        let (year, month) = s
            .split_once('-')
            .ok_or_else(|| MonthParseError::InvalidFormat(s.to_string()))?;

        if year.len() != 4 || month.is_empty() || month.len() > 2 {
            return Err(MonthParseError::InvalidFormat(s.to_string()));
        }

        let year: i32 = year
            .parse()
            .map_err(|_| MonthParseError::InvalidFormat(s.to_string()))?;
        let month: u32 = month
            .parse()
            .map_err(|_| MonthParseError::InvalidFormat(s.to_string()))?;

        Self::new(year, month).ok_or(MonthParseError::InvalidMonth(month))
    }

    /// Parse an optional token, defaulting to the current month
    pub fn parse_or_current(s: Option<&str>) -> Result<Self, MonthParseError> {
        match s {
            Some(token) if !token.trim().is_empty() => Self::parse(token),
            _ => Ok(Self::current()),
        }
    }
}

impl From<NaiveDate> for MonthYear {
    fn from(date: NaiveDate) -> Self {
        Self::from_date(date)
    }
}

impl From<MonthYear> for NaiveDate {
    fn from(month: MonthYear) -> Self {
        month.0
    }
}

impl fmt::Display for MonthYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.token())
    }
}

/// Error type for month parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonthParseError {
    InvalidFormat(String),
    InvalidMonth(u32),
}

impl fmt::Display for MonthParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MonthParseError::InvalidFormat(s) => {
                write!(f, "Invalid month '{}', expected YYYY-MM", s)
            }
            MonthParseError::InvalidMonth(m) => write!(f, "Invalid month number: {}", m),
        }
    }
}

impl std::error::Error for MonthParseError {}

impl From<MonthParseError> for PlanError {
    fn from(err: MonthParseError) -> Self {
        PlanError::Validation(err.to_string())
    }
}
