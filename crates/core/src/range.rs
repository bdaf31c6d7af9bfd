//! Date ranges with an optional (ongoing) end.

use serde::{Deserialize, Serialize};

use crate::{DateFields, FractionMode, FractionalDate, Result, SpanlineError};

/// A closed or ongoing interval between two [`FractionalDate`]s.
///
/// The start is always read in [`FractionMode::Start`] and the end in
/// [`FractionMode::End`], so "1995–1998" covers Jan 1 1995 through
/// Dec 31 1998.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RangeParts")]
pub struct TemporalRange {
    start: FractionalDate,
    end: Option<FractionalDate>,
}

#[derive(Deserialize)]
struct RangeParts {
    start: FractionalDate,
    #[serde(default)]
    end: Option<FractionalDate>,
}

impl TryFrom<RangeParts> for TemporalRange {
    type Error = SpanlineError;

    fn try_from(parts: RangeParts) -> Result<Self> {
        Self::new(parts.start, parts.end)
    }
}

impl TemporalRange {
    /// # Errors
    ///
    /// Returns [`SpanlineError::InvalidRange`] if `end` falls before `start`.
    pub fn new(start: FractionalDate, end: Option<FractionalDate>) -> Result<Self> {
        if let Some(end) = end {
            if end.to_fractional(FractionMode::End) < start.to_fractional(FractionMode::Start) {
                return Err(SpanlineError::InvalidRange(format!(
                    "end {end} is before start {start}"
                )));
            }
        }
        Ok(Self { start, end })
    }

    pub fn ongoing(start: FractionalDate) -> Self {
        Self { start, end: None }
    }

    /// Read the six stored date fields of an entity.
    ///
    /// An end month or day without an end year is treated as no end at all.
    pub fn from_fields(fields: &DateFields) -> Result<Self> {
        let start = fields.start_date()?;
        let end = fields.end_date()?;
        Self::new(start, end)
    }

    pub fn start(&self) -> FractionalDate {
        self.start
    }

    pub fn end(&self) -> Option<FractionalDate> {
        self.end
    }

    pub fn is_open(&self) -> bool {
        self.end.is_none()
    }

    pub fn start_value(&self) -> f64 {
        self.start.to_fractional(FractionMode::Start)
    }

    pub fn end_value(&self) -> Option<f64> {
        self.end.map(|e| e.to_fractional(FractionMode::End))
    }

    /// The end as it should be drawn at `now`.
    ///
    /// Ongoing ranges and ends stored in the future both stop at `now`, and
    /// the result never falls below the start.
    pub fn end_value_clamped(&self, now: f64) -> f64 {
        let end = self.end_value().map_or(now, |e| e.min(now));
        end.max(self.start_value())
    }

    /// Whether the range is still running at `now`.
    pub fn is_ongoing_at(&self, now: f64) -> bool {
        self.end_value().map_or(true, |e| e > now)
    }
}

impl std::fmt::Display for TemporalRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.end {
            Some(end) => write!(f, "{}–{end}", self.start),
            None => write!(f, "{}–", self.start),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
