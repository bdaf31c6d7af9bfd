//! Allen interval relations between two [`TemporalRange`]s.
//!
//! [`relate`] is the raw 13-relation classifier. [`relate_lenient`] applies
//! the coarse-precision override on top, and [`DisplayRelation::from_raw`]
//! folds the result into the vocabulary the relation tabs use.
//!
//! An ongoing range has an unbounded end here. Two ongoing ranges therefore
//! resolve on their starts alone (`equals`, `finishes`, `finished_by`), and
//! an ongoing range is never `before` anything or `met_by` anything.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::{DateFields, FractionMode, Precision, TemporalRange};

/// The thirteen Allen interval relations, read as "a *relation* b".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllenRelation {
    Before,
    Meets,
    Overlaps,
    During,
    Starts,
    Finishes,
    Equals,
    OverlappedBy,
    Contains,
    StartedBy,
    FinishedBy,
    After,
    MetBy,
}

impl AllenRelation {
    pub const ALL: [AllenRelation; 13] = [
        AllenRelation::Before,
        AllenRelation::Meets,
        AllenRelation::Overlaps,
        AllenRelation::During,
        AllenRelation::Starts,
        AllenRelation::Finishes,
        AllenRelation::Equals,
        AllenRelation::OverlappedBy,
        AllenRelation::Contains,
        AllenRelation::StartedBy,
        AllenRelation::FinishedBy,
        AllenRelation::After,
        AllenRelation::MetBy,
    ];

    /// The relation of `b` to `a` given the relation of `a` to `b`.
    pub fn inverse(self) -> Self {
        match self {
            AllenRelation::Before => AllenRelation::After,
            AllenRelation::After => AllenRelation::Before,
            AllenRelation::Meets => AllenRelation::MetBy,
            AllenRelation::MetBy => AllenRelation::Meets,
            AllenRelation::Overlaps => AllenRelation::OverlappedBy,
            AllenRelation::OverlappedBy => AllenRelation::Overlaps,
            AllenRelation::During => AllenRelation::Contains,
            AllenRelation::Contains => AllenRelation::During,
            AllenRelation::Starts => AllenRelation::StartedBy,
            AllenRelation::StartedBy => AllenRelation::Starts,
            AllenRelation::Finishes => AllenRelation::FinishedBy,
            AllenRelation::FinishedBy => AllenRelation::Finishes,
            AllenRelation::Equals => AllenRelation::Equals,
        }
    }

    /// True when the two intervals share at least one day.
    pub fn intersects(self) -> bool {
        !matches!(
            self,
            AllenRelation::Before | AllenRelation::After | AllenRelation::Meets | AllenRelation::MetBy
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AllenRelation::Before => "before",
            AllenRelation::Meets => "meets",
            AllenRelation::Overlaps => "overlaps",
            AllenRelation::During => "during",
            AllenRelation::Starts => "starts",
            AllenRelation::Finishes => "finishes",
            AllenRelation::Equals => "equals",
            AllenRelation::OverlappedBy => "overlapped_by",
            AllenRelation::Contains => "contains",
            AllenRelation::StartedBy => "started_by",
            AllenRelation::FinishedBy => "finished_by",
            AllenRelation::After => "after",
            AllenRelation::MetBy => "met_by",
        }
    }
}

impl std::fmt::Display for AllenRelation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which instant of each endpoint's precision window is compared.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryPolicy {
    /// Starts at the beginning of their window, ends at the end of theirs.
    #[default]
    Extent,
    /// Both endpoints at the centre of their window. Day-precision dates are
    /// unaffected; coarse dates move to mid-year or mid-month.
    Midpoint,
}

impl BoundaryPolicy {
    fn bounds(self, range: &TemporalRange) -> (f64, f64) {
        let (start_mode, end_mode) = match self {
            BoundaryPolicy::Extent => (FractionMode::Start, FractionMode::End),
            BoundaryPolicy::Midpoint => (FractionMode::Midpoint, FractionMode::Midpoint),
        };
        let start = range.start().to_fractional(start_mode);
        let end = range
            .end()
            .map_or(f64::INFINITY, |e| e.to_fractional(end_mode));
        (start, end)
    }
}

/// The reduced vocabulary shown on relation tabs.
///
/// Declaration order is the tab order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayRelation {
    Before,
    Overlaps,
    Starts,
    During,
    Contains,
    ContainedBy,
    Finishes,
    After,
}

impl DisplayRelation {
    /// Fold a raw relation of a candidate to its subject into a display
    /// relation. `is_phase` marks a phase nested inside a connection.
    pub fn from_raw(raw: AllenRelation, is_phase: bool) -> Self {
        match raw {
            AllenRelation::Before | AllenRelation::Meets => DisplayRelation::Before,
            AllenRelation::Overlaps => DisplayRelation::Overlaps,
            AllenRelation::OverlappedBy => DisplayRelation::Starts,
            AllenRelation::During if is_phase => DisplayRelation::Contains,
            AllenRelation::During => DisplayRelation::During,
            AllenRelation::Contains => DisplayRelation::ContainedBy,
            AllenRelation::Starts | AllenRelation::StartedBy => DisplayRelation::Starts,
            AllenRelation::Finishes | AllenRelation::FinishedBy => DisplayRelation::Finishes,
            AllenRelation::Equals => DisplayRelation::During,
            AllenRelation::After | AllenRelation::MetBy => DisplayRelation::After,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DisplayRelation::Before => "before",
            DisplayRelation::Overlaps => "overlaps",
            DisplayRelation::Starts => "starts",
            DisplayRelation::During => "during",
            DisplayRelation::Contains => "contains",
            DisplayRelation::ContainedBy => "contained by",
            DisplayRelation::Finishes => "finishes",
            DisplayRelation::After => "after",
        }
    }
}

impl std::fmt::Display for DisplayRelation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Classify `a` against `b` using [`BoundaryPolicy::Extent`].
pub fn relate(a: &TemporalRange, b: &TemporalRange) -> AllenRelation {
    relate_with(a, b, BoundaryPolicy::Extent)
}

/// Classify `a` against `b` under the given boundary policy.
pub fn relate_with(a: &TemporalRange, b: &TemporalRange, policy: BoundaryPolicy) -> AllenRelation {
    let (a_start, a_end) = policy.bounds(a);
    let (b_start, b_end) = policy.bounds(b);
    classify(a_start, a_end, b_start, b_end)
}

fn cmp(x: f64, y: f64) -> Ordering {
    // Bounds are finite or +inf, never NaN.
    x.partial_cmp(&y).unwrap_or(Ordering::Equal)
}

fn classify(a_start: f64, a_end: f64, b_start: f64, b_end: f64) -> AllenRelation {
    let starts = cmp(a_start, b_start);
    let ends = cmp(a_end, b_end);

    // Tested first so zero-length ranges keep the inverse property.
    if starts == Ordering::Equal && ends == Ordering::Equal {
        return AllenRelation::Equals;
    }

    // A single instant sharing an endpoint lies inside the other range, so
    // it starts or finishes it rather than meeting it.
    let instant = a_start == a_end || b_start == b_end;

    match cmp(a_end, b_start) {
        Ordering::Less => return AllenRelation::Before,
        Ordering::Equal if !instant => return AllenRelation::Meets,
        _ => {}
    }
    match cmp(a_start, b_end) {
        Ordering::Greater => return AllenRelation::After,
        Ordering::Equal if !instant => return AllenRelation::MetBy,
        _ => {}
    }

    match (starts, ends) {
        (Ordering::Equal, Ordering::Less) => AllenRelation::Starts,
        (Ordering::Equal, _) => AllenRelation::StartedBy,
        (Ordering::Greater, Ordering::Equal) => AllenRelation::Finishes,
        (Ordering::Less, Ordering::Equal) => AllenRelation::FinishedBy,
        (Ordering::Greater, Ordering::Less) => AllenRelation::During,
        (Ordering::Less, Ordering::Greater) => AllenRelation::Contains,
        (Ordering::Less, Ordering::Less) => AllenRelation::Overlaps,
        (Ordering::Greater, Ordering::Greater) => AllenRelation::OverlappedBy,
    }
}

/// Classify `a` against `b`, then apply the coarse-end override.
///
/// A raw `overlapped_by` becomes `during` when both ends fall in the same
/// calendar year and exactly one of them is stored at year precision while
/// the other has a month or day. Other precision mismatches are left alone.
pub fn relate_lenient(a: &TemporalRange, b: &TemporalRange, policy: BoundaryPolicy) -> AllenRelation {
    let raw = relate_with(a, b, policy);
    if raw == AllenRelation::OverlappedBy && coarse_same_year_ends(a, b) {
        AllenRelation::During
    } else {
        raw
    }
}

fn coarse_same_year_ends(a: &TemporalRange, b: &TemporalRange) -> bool {
    let (Some(a_end), Some(b_end)) = (a.end(), b.end()) else {
        return false;
    };
    if a_end.year_value() != b_end.year_value() {
        return false;
    }
    let a_year_only = a_end.precision() == Precision::Year;
    let b_year_only = b_end.precision() == Precision::Year;
    a_year_only != b_year_only
}

/// Classify two entities' stored dates, falling back to `overlaps` when
/// either side has no usable range.
pub fn relate_fields(a: &DateFields, b: &DateFields, policy: BoundaryPolicy) -> AllenRelation {
    match (a.to_range(), b.to_range()) {
        (Ok(a), Ok(b)) => relate_lenient(&a, &b, policy),
        (Err(e), _) | (_, Err(e)) => {
            tracing::debug!(error = %e, "no usable range, assuming overlap");
            AllenRelation::Overlaps
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FractionalDate;

    fn years(start: i32, end: i32) -> TemporalRange {
        TemporalRange::from_fields(&DateFields::years(start, Some(end))).unwrap()
    }

    fn days(start: (i32, u32, u32), end: (i32, u32, u32)) -> TemporalRange {
        TemporalRange::from_fields(&DateFields::ymd_range(start, end)).unwrap()
    }

    fn open(start: (i32, u32, u32)) -> TemporalRange {
        TemporalRange::from_fields(&DateFields::start_ymd(start.0, start.1, start.2)).unwrap()
    }

    #[test]
    fn all_thirteen_relations_are_reachable() {
        let b = days((2000, 3, 1), (2000, 6, 30));
        let cases = [
            (days((2000, 1, 1), (2000, 2, 1)), AllenRelation::Before),
            (days((2000, 1, 1), (2000, 3, 1)), AllenRelation::Meets),
            (days((2000, 1, 1), (2000, 4, 1)), AllenRelation::Overlaps),
            (days((2000, 4, 1), (2000, 5, 1)), AllenRelation::During),
            (days((2000, 3, 1), (2000, 4, 1)), AllenRelation::Starts),
            (days((2000, 4, 1), (2000, 6, 30)), AllenRelation::Finishes),
            (days((2000, 3, 1), (2000, 6, 30)), AllenRelation::Equals),
            (days((2000, 4, 1), (2000, 8, 1)), AllenRelation::OverlappedBy),
            (days((2000, 1, 1), (2000, 8, 1)), AllenRelation::Contains),
            (days((2000, 3, 1), (2000, 8, 1)), AllenRelation::StartedBy),
            (days((2000, 1, 1), (2000, 6, 30)), AllenRelation::FinishedBy),
            (days((2000, 8, 1), (2000, 9, 1)), AllenRelation::After),
            (days((2000, 6, 30), (2000, 9, 1)), AllenRelation::MetBy),
        ];
        for (a, expected) in cases {
            assert_eq!(relate(&a, &b), expected, "{a} vs {b}");
        }
    }

    #[test]
    fn relations_are_algebraic_inverses() {
        let ranges = [
            years(1990, 1995),
            years(1995, 1998),
            years(1998, 1998),
            days((1995, 1, 1), (1995, 1, 1)),
            days((1999, 6, 30), (1999, 6, 30)),
            days((1995, 3, 1), (1999, 6, 30)),
            days((1997, 3, 1), (2000, 7, 15)),
            days((1998, 12, 31), (2003, 1, 1)),
            TemporalRange::new(
                FractionalDate::year_month(1995, 2).unwrap(),
                Some(FractionalDate::year_month(1998, 12).unwrap()),
            )
            .unwrap(),
        ];
        for a in &ranges {
            for b in &ranges {
                for policy in [BoundaryPolicy::Extent, BoundaryPolicy::Midpoint] {
                    let ab = relate_with(a, b, policy);
                    let ba = relate_with(b, a, policy);
                    assert_eq!(ab.inverse(), ba, "{a} vs {b} ({policy:?})");
                }
            }
        }
    }

    #[test]
    fn inverse_is_an_involution() {
        for r in AllenRelation::ALL {
            assert_eq!(r.inverse().inverse(), r);
        }
    }

    #[test]
    fn day_adjacent_ranges_do_not_overlap() {
        let march = days((2000, 3, 1), (2000, 3, 31));
        let april = days((2000, 4, 1), (2000, 4, 30));
        assert_eq!(relate(&march, &april), AllenRelation::Before);
        assert!(!relate(&march, &april).intersects());
    }

    #[test]
    fn single_day_on_a_boundary_starts_or_finishes() {
        let life = days((1990, 1, 1), (2020, 6, 30));
        let birth = days((1990, 1, 1), (1990, 1, 1));
        let death = days((2020, 6, 30), (2020, 6, 30));
        assert_eq!(relate(&birth, &life), AllenRelation::Starts);
        assert_eq!(relate(&life, &birth), AllenRelation::StartedBy);
        assert_eq!(relate(&death, &life), AllenRelation::Finishes);
        assert_eq!(relate(&life, &death), AllenRelation::FinishedBy);

        let next_day = days((2020, 7, 1), (2020, 7, 1));
        assert_eq!(relate(&life, &next_day), AllenRelation::Before);
        assert_eq!(relate(&next_day, &life), AllenRelation::After);
    }

    #[test]
    fn consecutive_years_do_not_overlap() {
        let a = years(1990, 1995);
        let b = years(1996, 2000);
        assert_eq!(relate(&a, &b), AllenRelation::Before);
    }

    #[test]
    fn shared_boundary_year_overlaps() {
        let a = years(1990, 1995);
        let b = years(1995, 2000);
        assert_eq!(relate(&a, &b), AllenRelation::Overlaps);
    }

    #[test]
    fn two_open_ranges_resolve_on_starts() {
        let early = open((1990, 1, 1));
        let late = open((2000, 1, 1));
        assert_eq!(relate(&early, &late), AllenRelation::FinishedBy);
        assert_eq!(relate(&late, &early), AllenRelation::Finishes);
        assert_eq!(relate(&early, &early), AllenRelation::Equals);
    }

    #[test]
    fn open_range_never_reports_after_against_now() {
        let now = TemporalRange::new(
            FractionalDate::ymd(2026, 10, 18).unwrap(),
            Some(FractionalDate::ymd(2026, 10, 18).unwrap()),
        )
        .unwrap();
        // "now" is never after an ongoing range: it has not ended yet.
        for start in [(1900, 1, 1), (2026, 10, 18), (2030, 1, 1)] {
            let r = relate(&now, &open(start));
            assert_ne!(r, AllenRelation::After, "start {start:?}");
            assert_ne!(r, AllenRelation::MetBy, "start {start:?}");
        }
        assert_eq!(relate(&now, &open((1900, 1, 1))), AllenRelation::During);
    }

    #[test]
    fn coarse_year_end_leniency_turns_overlapped_by_into_during() {
        let connection = years(2001, 2005);
        let subject = days((2001, 3, 1), (2005, 6, 30));

        let raw = relate_with(&connection, &subject, BoundaryPolicy::Midpoint);
        assert_eq!(raw, AllenRelation::OverlappedBy);
        assert_eq!(
            relate_lenient(&connection, &subject, BoundaryPolicy::Midpoint),
            AllenRelation::During
        );
    }

    #[test]
    fn leniency_applies_under_extent_policy_too() {
        let connection = years(2002, 2005);
        let subject = days((2001, 3, 1), (2005, 6, 30));
        assert_eq!(relate(&connection, &subject), AllenRelation::OverlappedBy);
        assert_eq!(
            relate_lenient(&connection, &subject, BoundaryPolicy::Extent),
            AllenRelation::During
        );
    }

    #[test]
    fn leniency_needs_same_end_year() {
        let connection = years(2002, 2006);
        let subject = days((2001, 3, 1), (2005, 6, 30));
        assert_eq!(
            relate_lenient(&connection, &subject, BoundaryPolicy::Extent),
            AllenRelation::OverlappedBy
        );
    }

    #[test]
    fn leniency_ignores_month_versus_day_mismatch() {
        let connection = TemporalRange::new(
            FractionalDate::year(2002).unwrap(),
            Some(FractionalDate::year_month(2005, 6).unwrap()),
        )
        .unwrap();
        let subject = days((2001, 3, 1), (2005, 6, 15));
        assert_eq!(
            relate_lenient(&connection, &subject, BoundaryPolicy::Extent),
            AllenRelation::OverlappedBy
        );
    }

    #[test]
    fn missing_start_year_falls_back_to_overlaps() {
        let undated = DateFields::default();
        let dated = DateFields::years(1990, Some(2000));
        assert_eq!(
            relate_fields(&undated, &dated, BoundaryPolicy::Extent),
            AllenRelation::Overlaps
        );
        assert_eq!(
            relate_fields(&dated, &undated, BoundaryPolicy::Extent),
            AllenRelation::Overlaps
        );
    }

    #[test]
    fn display_remapping_table() {
        use AllenRelation as A;
        use DisplayRelation as D;
        let table = [
            (A::Before, false, D::Before),
            (A::Meets, false, D::Before),
            (A::Overlaps, false, D::Overlaps),
            (A::OverlappedBy, false, D::Starts),
            (A::During, true, D::Contains),
            (A::During, false, D::During),
            (A::Contains, false, D::ContainedBy),
            (A::Starts, false, D::Starts),
            (A::StartedBy, false, D::Starts),
            (A::Finishes, false, D::Finishes),
            (A::FinishedBy, false, D::Finishes),
            (A::Equals, false, D::During),
            (A::After, false, D::After),
            (A::MetBy, false, D::After),
        ];
        for (raw, phase, expected) in table {
            assert_eq!(DisplayRelation::from_raw(raw, phase), expected, "{raw} phase={phase}");
        }
        assert_eq!(DisplayRelation::ContainedBy.to_string(), "contained by");
    }
}
