//! Spanline — temporal relations and timeline layout for dated spans.
//!
//! The core primitive is a [`TemporalRange`]: a pair of [`FractionalDate`]
//! endpoints whose precision (year, month or day) is carried alongside the
//! value, so comparisons can tell "2005" apart from "2005-06-30".
//!
//! On top of ranges sit three layers:
//!
//! - the [`allen`] engine, which classifies two ranges into one of the 13
//!   Allen interval relations and remaps them to a display vocabulary,
//! - the [`relations`] aggregator, which filters, classifies and sorts a
//!   subject's connections and phases,
//! - the [`layout`] engine, which turns labelled intervals into swimlane
//!   geometry under a caller-owned [`LayoutSession`].
//!
//! # Quick start
//!
//! ```rust
//! use spanline::{allen, AllenRelation, DateFields, TemporalRange};
//!
//! let residence = TemporalRange::from_fields(&DateFields::years(1995, Some(1998))).unwrap();
//! let life = TemporalRange::from_fields(&DateFields::start_ymd(1990, 1, 1)).unwrap();
//!
//! assert_eq!(allen::relate(&residence, &life), AllenRelation::During);
//! ```

pub mod allen;
pub mod date;
pub mod layout;
pub mod model;
pub mod range;
pub mod relations;
#[cfg(feature = "store")]
pub mod store;

pub use allen::{AllenRelation, BoundaryPolicy, DisplayRelation};
pub use date::{FractionMode, FractionalDate, Precision};
pub use layout::{
    AxisMode, AxisTick, Frame, LaneBar, LaneMode, LaneMove, LayoutConfig, LayoutSession,
    StateFilter, Swimlane, SwimlaneKind, SwimlaneSpan, TimelineLayout, TypeFilter, Viewport,
    VisibleRange, ZoomAnimation, ZoomState,
};
pub use model::{
    CompletionState, ConnectionRecord, DateFields, Direction, EntityRef, SpanId, SpanKind,
    SpanRecord, StoredConnection,
};
pub use range::TemporalRange;
pub use relations::{AggregateOptions, RelationSet, Tab, TemporalRelation};
#[cfg(feature = "store")]
pub use store::SpanStore;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum SpanlineError {
    #[error("invalid date: {0}")]
    InvalidDate(String),
    #[error("invalid range: {0}")]
    InvalidRange(String),
    #[error("storage error: {0}")]
    Storage(String),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("not found: {0}")]
    NotFound(String),
}

#[cfg(feature = "store")]
impl From<redb::DatabaseError> for SpanlineError {
    fn from(e: redb::DatabaseError) -> Self {
        SpanlineError::Storage(e.to_string())
    }
}
#[cfg(feature = "store")]
impl From<redb::TransactionError> for SpanlineError {
    fn from(e: redb::TransactionError) -> Self {
        SpanlineError::Storage(e.to_string())
    }
}
#[cfg(feature = "store")]
impl From<redb::TableError> for SpanlineError {
    fn from(e: redb::TableError) -> Self {
        SpanlineError::Storage(e.to_string())
    }
}
#[cfg(feature = "store")]
impl From<redb::StorageError> for SpanlineError {
    fn from(e: redb::StorageError) -> Self {
        SpanlineError::Storage(e.to_string())
    }
}
#[cfg(feature = "store")]
impl From<redb::CommitError> for SpanlineError {
    fn from(e: redb::CommitError) -> Self {
        SpanlineError::Storage(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SpanlineError>;
