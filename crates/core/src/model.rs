//! Normalized records exchanged with entity providers.
//!
//! Providers may hold spans and connections in whatever shape they like;
//! the core only ever sees these types. A [`StoredConnection`] is written
//! once between a parent and a child and normalized into a subject-relative
//! [`ConnectionRecord`] when read from either side.

use serde::{Deserialize, Serialize};

use crate::{FractionalDate, Result, TemporalRange};

/// A stable span identifier supplied by the provider.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SpanId(pub String);

impl SpanId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SpanId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for SpanId {
    fn from(s: &str) -> Self {
        SpanId(s.to_string())
    }
}

/// The six nullable date columns every dated entity carries.
///
/// A `0` month or day is the storage sentinel for "not specified".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateFields {
    pub start_year: Option<i32>,
    pub start_month: Option<u32>,
    pub start_day: Option<u32>,
    pub end_year: Option<i32>,
    pub end_month: Option<u32>,
    pub end_day: Option<u32>,
}

impl DateFields {
    /// Year-precision start with an optional year-precision end.
    pub fn years(start: i32, end: Option<i32>) -> Self {
        Self {
            start_year: Some(start),
            end_year: end,
            ..Self::default()
        }
    }

    /// Day-precision start, open end.
    pub fn start_ymd(year: i32, month: u32, day: u32) -> Self {
        Self {
            start_year: Some(year),
            start_month: Some(month),
            start_day: Some(day),
            ..Self::default()
        }
    }

    /// Day-precision start and end.
    pub fn ymd_range(start: (i32, u32, u32), end: (i32, u32, u32)) -> Self {
        Self {
            start_year: Some(start.0),
            start_month: Some(start.1),
            start_day: Some(start.2),
            end_year: Some(end.0),
            end_month: Some(end.1),
            end_day: Some(end.2),
        }
    }

    pub fn has_start(&self) -> bool {
        self.start_year.is_some()
    }

    /// Sort key placing unknown months/days after known ones within a year.
    pub fn start_sort_key(&self) -> (i32, u32, u32) {
        let month = self.start_month.filter(|m| *m != 0);
        let day = self.start_day.filter(|d| *d != 0);
        (
            self.start_year.unwrap_or(i32::MAX),
            month.unwrap_or(u32::MAX),
            day.unwrap_or(u32::MAX),
        )
    }

    pub fn start_date(&self) -> Result<FractionalDate> {
        FractionalDate::from_parts(self.start_year, self.start_month, self.start_day)
    }

    /// The end date, or `None` when the span is ongoing.
    pub fn end_date(&self) -> Result<Option<FractionalDate>> {
        match self.end_year {
            Some(_) => FractionalDate::from_parts(self.end_year, self.end_month, self.end_day).map(Some),
            None => Ok(None),
        }
    }

    pub fn to_range(&self) -> Result<TemporalRange> {
        TemporalRange::from_fields(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpanKind {
    Person,
    Organisation,
    Place,
    Event,
    Thing,
    Connection,
    Phase,
}

/// How complete a span's data is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionState {
    Placeholder,
    Draft,
    Complete,
}

impl CompletionState {
    /// Derive a state from how much of the date range is known.
    ///
    /// No start is a placeholder; a day-precision start with a day-precision
    /// (or absent) end is complete; anything in between is a draft.
    pub fn derive(dates: &DateFields) -> Self {
        let Ok(start) = dates.start_date() else {
            return CompletionState::Placeholder;
        };
        let start_exact = start.precision() == crate::Precision::Day;
        let end_exact = match dates.end_date() {
            Ok(Some(end)) => end.precision() == crate::Precision::Day,
            Ok(None) => true,
            Err(_) => false,
        };
        if start_exact && end_exact {
            CompletionState::Complete
        } else {
            CompletionState::Draft
        }
    }
}

/// A dated entity as the provider hands it over.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpanRecord {
    pub id: SpanId,
    pub name: String,
    pub kind: SpanKind,
    #[serde(default)]
    pub dates: DateFields,
    /// Stored state, when the provider tracks one.
    #[serde(default)]
    pub state: Option<CompletionState>,
}

impl SpanRecord {
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: SpanKind, dates: DateFields) -> Self {
        Self {
            id: SpanId(id.into()),
            name: name.into(),
            kind,
            dates,
            state: None,
        }
    }

    pub fn state(&self) -> CompletionState {
        self.state.unwrap_or_else(|| CompletionState::derive(&self.dates))
    }

    pub fn entity_ref(&self) -> EntityRef {
        EntityRef {
            id: self.id.clone(),
            name: self.name.clone(),
            kind: self.kind,
        }
    }
}

/// A lightweight pointer to a span, enough to label and link it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityRef {
    pub id: SpanId,
    pub name: String,
    pub kind: SpanKind,
}

/// Which end of a connection the viewing subject sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// The subject is the grammatical subject ("Alice *employed by* Acme").
    SubjectIsParent,
    /// The subject is the grammatical object ("Acme *employed* Alice").
    SubjectIsChild,
}

/// A connection seen from one subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionRecord {
    pub id: SpanId,
    pub connection_type: String,
    /// Predicate already resolved for [`Self::direction`].
    pub predicate: String,
    pub direction: Direction,
    /// The span at the other end.
    pub other: EntityRef,
    #[serde(default)]
    pub dates: DateFields,
    /// Set when this record is a phase nested inside another connection.
    #[serde(default)]
    pub phase_of: Option<SpanId>,
    #[serde(default)]
    pub state: Option<CompletionState>,
}

impl ConnectionRecord {
    pub fn is_phase(&self) -> bool {
        self.phase_of.is_some()
    }

    pub fn state(&self) -> CompletionState {
        self.state.unwrap_or_else(|| CompletionState::derive(&self.dates))
    }
}

/// A connection as persisted: one row between a parent and a child.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredConnection {
    pub id: SpanId,
    pub connection_type: String,
    pub parent: SpanId,
    pub child: SpanId,
    /// Read from the parent's side, e.g. `employed by`.
    pub forward_predicate: String,
    /// Read from the child's side, e.g. `employed`. Falls back to the
    /// forward predicate when absent.
    #[serde(default)]
    pub inverse_predicate: Option<String>,
    #[serde(default)]
    pub dates: DateFields,
    #[serde(default)]
    pub phase_of: Option<SpanId>,
    #[serde(default)]
    pub state: Option<CompletionState>,
}

impl StoredConnection {
    /// Normalize for `viewer`, given the record of the span at the other end.
    ///
    /// Returns `None` if `viewer` is neither the parent nor the child.
    pub fn normalize_for(&self, viewer: &SpanId, other: EntityRef) -> Option<ConnectionRecord> {
        let (direction, predicate) = if *viewer == self.parent {
            (Direction::SubjectIsParent, self.forward_predicate.clone())
        } else if *viewer == self.child {
            (
                Direction::SubjectIsChild,
                self.inverse_predicate
                    .clone()
                    .unwrap_or_else(|| self.forward_predicate.clone()),
            )
        } else {
            return None;
        };
        Some(ConnectionRecord {
            id: self.id.clone(),
            connection_type: self.connection_type.clone(),
            predicate,
            direction,
            other,
            dates: self.dates,
            phase_of: self.phase_of.clone(),
            state: self.state,
        })
    }

    /// The id of the span opposite `viewer`.
    pub fn other_end(&self, viewer: &SpanId) -> Option<&SpanId> {
        if *viewer == self.parent {
            Some(&self.child)
        } else if *viewer == self.child {
            Some(&self.parent)
        } else {
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn employment() -> StoredConnection {
        StoredConnection {
            id: SpanId::new("c-1"),
            connection_type: "employment".into(),
            parent: SpanId::new("alice"),
            child: SpanId::new("acme"),
            forward_predicate: "employed by".into(),
            inverse_predicate: Some("employed".into()),
            dates: DateFields::years(1997, Some(2000)),
            phase_of: None,
            state: None,
        }
    }

    fn entity(id: &str, kind: SpanKind) -> EntityRef {
        EntityRef {
            id: SpanId::new(id),
            name: id.to_uppercase(),
            kind,
        }
    }

    #[test]
    fn normalizing_from_the_parent_uses_forward_predicate() {
        let conn = employment();
        let rec = conn
            .normalize_for(&SpanId::new("alice"), entity("acme", SpanKind::Organisation))
            .unwrap();
        assert_eq!(rec.direction, Direction::SubjectIsParent);
        assert_eq!(rec.predicate, "employed by");
        assert_eq!(rec.other.id, SpanId::new("acme"));
    }

    #[test]
    fn normalizing_from_the_child_uses_inverse_predicate() {
        let conn = employment();
        let rec = conn
            .normalize_for(&SpanId::new("acme"), entity("alice", SpanKind::Person))
            .unwrap();
        assert_eq!(rec.direction, Direction::SubjectIsChild);
        assert_eq!(rec.predicate, "employed");
    }

    #[test]
    fn normalizing_for_a_stranger_yields_nothing() {
        let conn = employment();
        assert!(conn
            .normalize_for(&SpanId::new("bob"), entity("acme", SpanKind::Organisation))
            .is_none());
        assert!(conn.other_end(&SpanId::new("bob")).is_none());
    }

    #[test]
    fn sort_key_places_unknown_parts_last() {
        let year_only = DateFields::years(1995, None);
        let full = DateFields::start_ymd(1995, 12, 31);
        assert!(full.start_sort_key() < year_only.start_sort_key());

        let zero_month = DateFields {
            start_year: Some(1995),
            start_month: Some(0),
            ..DateFields::default()
        };
        assert_eq!(zero_month.start_sort_key(), year_only.start_sort_key());
    }

    #[test]
    fn derived_state_tracks_known_precision() {
        assert_eq!(
            CompletionState::derive(&DateFields::default()),
            CompletionState::Placeholder
        );
        assert_eq!(
            CompletionState::derive(&DateFields::years(1990, Some(1995))),
            CompletionState::Draft
        );
        assert_eq!(
            CompletionState::derive(&DateFields::start_ymd(1990, 1, 1)),
            CompletionState::Complete
        );
        assert_eq!(
            CompletionState::derive(&DateFields::ymd_range((1990, 1, 1), (1991, 2, 3))),
            CompletionState::Complete
        );
    }

    #[test]
    fn stored_state_overrides_derivation() {
        let mut span = SpanRecord::new("x", "X", SpanKind::Thing, DateFields::start_ymd(2000, 1, 1));
        assert_eq!(span.state(), CompletionState::Complete);
        span.state = Some(CompletionState::Draft);
        assert_eq!(span.state(), CompletionState::Draft);
    }

    #[test]
    fn records_round_trip_through_json_with_defaults() {
        let raw = r#"{"id":"p1","name":"Ada","kind":"person"}"#;
        let span: SpanRecord = serde_json::from_str(raw).unwrap();
        assert_eq!(span.dates, DateFields::default());
        assert_eq!(span.state(), CompletionState::Placeholder);
    }
}
