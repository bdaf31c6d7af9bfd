//! Temporal relations between a subject and its connections.
//!
//! [`aggregate`] takes the subject's dates and a set of normalized
//! [`ConnectionRecord`]s (connections seen from the subject, plus phases),
//! keeps the ones that share time with the subject, classifies each one and
//! sorts them chronologically. [`aggregate_phases`] does the same for the
//! phases of one connection, measured against that connection. The result
//! is recomputed per request.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::allen::{self, AllenRelation, BoundaryPolicy, DisplayRelation};
use crate::{
    ConnectionRecord, DateFields, Direction, EntityRef, SpanId, StoredConnection, TemporalRange,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateOptions {
    #[serde(default)]
    pub policy: BoundaryPolicy,
}

/// One connection placed relative to the subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemporalRelation {
    pub connection_id: SpanId,
    pub related: EntityRef,
    pub connection_type: String,
    pub predicate: String,
    pub direction: Direction,
    pub raw: AllenRelation,
    pub display: DisplayRelation,
    pub range: TemporalRange,
    pub is_phase: bool,
    #[serde(skip)]
    sort_key: (i32, u32, u32),
}

/// A tab on the relations panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "tab", content = "value", rename_all = "snake_case")]
pub enum Tab {
    All,
    Relation(DisplayRelation),
    Predicate(String),
}

/// The sorted relations of one subject, with both tab groupings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RelationSet {
    entries: Vec<TemporalRelation>,
    by_relation: BTreeMap<DisplayRelation, Vec<usize>>,
    by_predicate: BTreeMap<String, Vec<usize>>,
}

impl RelationSet {
    fn from_sorted(entries: Vec<TemporalRelation>) -> Self {
        let mut by_relation: BTreeMap<DisplayRelation, Vec<usize>> = BTreeMap::new();
        let mut by_predicate: BTreeMap<String, Vec<usize>> = BTreeMap::new();
        for (i, entry) in entries.iter().enumerate() {
            by_relation.entry(entry.display).or_default().push(i);
            by_predicate
                .entry(entry.predicate.clone())
                .or_default()
                .push(i);
        }
        Self {
            entries,
            by_relation,
            by_predicate,
        }
    }

    pub fn entries(&self) -> &[TemporalRelation] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Display relations that have at least one entry, in tab order.
    pub fn relation_tabs(&self) -> impl Iterator<Item = DisplayRelation> + '_ {
        self.by_relation.keys().copied()
    }

    /// Predicates that have at least one entry, alphabetically.
    pub fn predicate_tabs(&self) -> impl Iterator<Item = &str> + '_ {
        self.by_predicate.keys().map(String::as_str)
    }

    /// Entries on `tab`, in chronological order.
    pub fn select(&self, tab: &Tab) -> Vec<&TemporalRelation> {
        let indices = match tab {
            Tab::All => return self.entries.iter().collect(),
            Tab::Relation(r) => self.by_relation.get(r),
            Tab::Predicate(p) => self.by_predicate.get(p),
        };
        indices
            .map(|ix| ix.iter().map(|&i| &self.entries[i]).collect())
            .unwrap_or_default()
    }
}

/// Place every dated candidate relative to the subject's dates.
///
/// Candidates without a start year are dropped, as are candidates whose
/// dates do not form a valid range. If the subject itself has no usable
/// range every remaining candidate is kept as `overlaps`.
pub fn aggregate(
    subject: &DateFields,
    candidates: &[ConnectionRecord],
    options: AggregateOptions,
) -> RelationSet {
    relate_all(subject, candidates, options, false)
}

/// Place the phases of one connection relative to that connection's dates.
///
/// Same filtering as [`aggregate`], except that a phase lying inside its
/// connection is shown as `contains`. Records that are not phases of
/// `connection` are ignored.
pub fn aggregate_phases(
    connection: &StoredConnection,
    phases: &[ConnectionRecord],
    options: AggregateOptions,
) -> RelationSet {
    let own: Vec<ConnectionRecord> = phases
        .iter()
        .filter(|p| p.phase_of.as_ref() == Some(&connection.id))
        .cloned()
        .collect();
    if own.len() != phases.len() {
        tracing::warn!(
            connection = %connection.id,
            skipped = phases.len() - own.len(),
            "ignoring records that are not phases of this connection"
        );
    }
    relate_all(&connection.dates, &own, options, true)
}

fn relate_all(
    subject: &DateFields,
    candidates: &[ConnectionRecord],
    options: AggregateOptions,
    within_connection: bool,
) -> RelationSet {
    let reference = match subject.to_range() {
        Ok(r) => Some(r),
        Err(e) => {
            tracing::debug!(error = %e, "subject has no usable range, assuming overlap");
            None
        }
    };

    let mut entries = Vec::with_capacity(candidates.len());
    let mut undated = 0usize;
    let mut disjoint = 0usize;

    for candidate in candidates {
        if !candidate.dates.has_start() {
            undated += 1;
            continue;
        }
        let range = match candidate.dates.to_range() {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(connection = %candidate.id, error = %e, "skipping malformed dates");
                continue;
            }
        };

        let raw = match &reference {
            Some(subject_range) => allen::relate_lenient(&range, subject_range, options.policy),
            None => AllenRelation::Overlaps,
        };
        if !raw.intersects() {
            disjoint += 1;
            continue;
        }

        let is_phase = candidate.is_phase();
        entries.push(TemporalRelation {
            connection_id: candidate.id.clone(),
            related: candidate.other.clone(),
            connection_type: candidate.connection_type.clone(),
            predicate: candidate.predicate.clone(),
            direction: candidate.direction,
            raw,
            display: DisplayRelation::from_raw(raw, within_connection && is_phase),
            range,
            is_phase,
            sort_key: candidate.dates.start_sort_key(),
        });
    }

    // Stable, so equal keys keep provider order.
    entries.sort_by_key(|e| e.sort_key);

    tracing::debug!(
        kept = entries.len(),
        undated,
        disjoint,
        "aggregated temporal relations"
    );
    RelationSet::from_sorted(entries)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
