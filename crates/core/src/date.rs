//! Partial calendar dates and their fractional-year encoding.
//!
//! A [`FractionalDate`] is a year with an optional month and day. Which
//! fields are present decides its [`Precision`], and the precision decides
//! which real instant the date stands for: the first day of the window, the
//! last day, or the middle.
//!
//! Every encoded value is `year + ordinal0 / days_in_year` for some chosen
//! day, so values of different precisions sort on the same axis and two
//! dates naming the same day always encode to the same `f64`.

use chrono::{Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{Result, SpanlineError};

/// Average Gregorian year length, used by the midpoint encoding of month
/// precision dates.
const MEAN_YEAR_DAYS: f64 = 365.25;

/// How much of a date is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Precision {
    Year,
    Month,
    Day,
}

/// Which instant of a precision window to encode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FractionMode {
    /// Earliest day consistent with the precision.
    Start,
    /// Latest day consistent with the precision.
    End,
    /// Centre of the precision window.
    Midpoint,
}

/// A calendar date of year, month or day precision.
///
/// Deserializing goes through [`FractionalDate::from_parts`], so a decoded
/// value is always a real calendar position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "DateParts")]
pub struct FractionalDate {
    year: i32,
    month: Option<u32>,
    day: Option<u32>,
}

/// Unchecked wire shape of a [`FractionalDate`].
#[derive(Deserialize)]
struct DateParts {
    year: i32,
    #[serde(default)]
    month: Option<u32>,
    #[serde(default)]
    day: Option<u32>,
}

impl TryFrom<DateParts> for FractionalDate {
    type Error = SpanlineError;

    fn try_from(parts: DateParts) -> Result<Self> {
        Self::from_parts(Some(parts.year), parts.month, parts.day)
    }
}

impl FractionalDate {
    /// Build a date from stored nullable fields.
    ///
    /// Upstream storage writes `0` for "not specified", so a zero month or
    /// day is read as absent, never as January or the 0th.
    ///
    /// # Errors
    ///
    /// Returns [`SpanlineError::InvalidDate`] if `year` is absent, if a day
    /// is given without a month, or if the month/day is not a real calendar
    /// position.
    pub fn from_parts(year: Option<i32>, month: Option<u32>, day: Option<u32>) -> Result<Self> {
        let year = year.ok_or_else(|| SpanlineError::InvalidDate("year is required".into()))?;
        let month = month.filter(|m| *m != 0);
        let day = day.filter(|d| *d != 0);

        match (month, day) {
            (None, Some(d)) => {
                return Err(SpanlineError::InvalidDate(format!(
                    "day {d} given without a month in {year}"
                )))
            }
            (Some(m), None) if !(1..=12).contains(&m) => {
                return Err(SpanlineError::InvalidDate(format!(
                    "month {m} out of range in {year}"
                )))
            }
            (Some(m), Some(d)) if NaiveDate::from_ymd_opt(year, m, d).is_none() => {
                return Err(SpanlineError::InvalidDate(format!(
                    "{year:04}-{m:02}-{d:02} is not a calendar date"
                )))
            }
            _ => {}
        }

        // Years chrono cannot represent would make every later encoding fail.
        if NaiveDate::from_ymd_opt(year, 1, 1).is_none() {
            return Err(SpanlineError::InvalidDate(format!(
                "year {year} out of range"
            )));
        }

        Ok(Self { year, month, day })
    }

    /// A year-only date.
    pub fn year(year: i32) -> Result<Self> {
        Self::from_parts(Some(year), None, None)
    }

    /// A month-precision date.
    pub fn year_month(year: i32, month: u32) -> Result<Self> {
        Self::from_parts(Some(year), Some(month), None)
    }

    /// A day-precision date.
    pub fn ymd(year: i32, month: u32, day: u32) -> Result<Self> {
        Self::from_parts(Some(year), Some(month), Some(day))
    }

    pub fn from_naive(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: Some(date.month()),
            day: Some(date.day()),
        }
    }

    /// Today's date (UTC) at day precision.
    pub fn today() -> Self {
        Self::from_naive(Utc::now().date_naive())
    }

    /// Decode a fractional-year value back to the day it encodes.
    ///
    /// The result always has day precision. Values past the last day of a
    /// year land on December 31st.
    pub fn from_fractional(value: f64) -> Result<Self> {
        if !value.is_finite() {
            return Err(SpanlineError::InvalidDate(format!(
                "fractional year {value} is not finite"
            )));
        }
        let year = value.floor();
        if year < f64::from(i32::MIN) || year > f64::from(i32::MAX) {
            return Err(SpanlineError::InvalidDate(format!(
                "fractional year {value} out of range"
            )));
        }
        let year = year as i32;
        let days = days_in_year(year);
        let ordinal0 = (((value - f64::from(year)) * f64::from(days)).round() as u32).min(days - 1);
        NaiveDate::from_yo_opt(year, ordinal0 + 1)
            .map(Self::from_naive)
            .ok_or_else(|| SpanlineError::InvalidDate(format!("fractional year {value} out of range")))
    }

    pub fn year_value(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> Option<u32> {
        self.month
    }

    pub fn day(&self) -> Option<u32> {
        self.day
    }

    pub fn precision(&self) -> Precision {
        match (self.month, self.day) {
            (Some(_), Some(_)) => Precision::Day,
            (Some(_), None) => Precision::Month,
            _ => Precision::Year,
        }
    }

    /// Encode as a fractional year.
    pub fn to_fractional(&self, mode: FractionMode) -> f64 {
        let year = f64::from(self.year);
        let days = f64::from(days_in_year(self.year));

        match (mode, self.month, self.day) {
            (_, Some(m), Some(d)) => year + f64::from(ordinal0(self.year, m, d)) / days,

            (FractionMode::Start, Some(m), None) => year + f64::from(ordinal0(self.year, m, 1)) / days,
            (FractionMode::End, Some(m), None) => {
                let last = days_in_month(self.year, m);
                year + f64::from(ordinal0(self.year, m, last)) / days
            }
            (FractionMode::Midpoint, Some(m), None) => {
                let before = f64::from(ordinal0(self.year, m, 1));
                let half = f64::from(days_in_month(self.year, m)) / 2.0;
                year + (before + half) / MEAN_YEAR_DAYS
            }

            (FractionMode::Start, None, _) => year,
            (FractionMode::End, None, _) => year + (days - 1.0) / days,
            (FractionMode::Midpoint, None, _) => year + 0.5,
        }
    }

    /// The concrete calendar day this date stands for under `mode`.
    ///
    /// Midpoint dates resolve to the day their encoded value falls on.
    pub fn to_naive(&self, mode: FractionMode) -> Option<NaiveDate> {
        match (mode, self.month, self.day) {
            (_, Some(m), Some(d)) => NaiveDate::from_ymd_opt(self.year, m, d),
            (FractionMode::Start, Some(m), None) => NaiveDate::from_ymd_opt(self.year, m, 1),
            (FractionMode::End, Some(m), None) => {
                NaiveDate::from_ymd_opt(self.year, m, days_in_month(self.year, m))
            }
            (FractionMode::Start, None, _) => NaiveDate::from_ymd_opt(self.year, 1, 1),
            (FractionMode::End, None, _) => NaiveDate::from_ymd_opt(self.year, 12, 31),
            (FractionMode::Midpoint, _, _) => Self::from_fractional(self.to_fractional(mode))
                .ok()
                .and_then(|d| d.to_naive(FractionMode::Start)),
        }
    }
}

impl std::fmt::Display for FractionalDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.month, self.day) {
            (Some(m), Some(d)) => write!(f, "{:04}-{m:02}-{d:02}", self.year),
            (Some(m), None) => write!(f, "{:04}-{m:02}", self.year),
            _ => write!(f, "{:04}", self.year),
        }
    }
}

pub(crate) fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

pub(crate) fn days_in_year(year: i32) -> u32 {
    if is_leap_year(year) {
        366
    } else {
        365
    }
}

pub(crate) fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 31,
    }
}

/// Zero-based day of year. Callers guarantee `month`/`day` are valid.
fn ordinal0(year: i32, month: u32, day: u32) -> u32 {
    let before: u32 = (1..month).map(|m| days_in_month(year, m)).sum();
    before + day - 1
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
