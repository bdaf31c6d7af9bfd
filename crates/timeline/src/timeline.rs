//! Timeline assembly on top of Spanline.
//!
//! Data comes from an [`EntityProvider`], usually a network client or the
//! embedded [`spanline::SpanStore`]. [`TimelineAssembler`] fetches the
//! subject, fans out one request per related span, and hands back
//! [`Timeline`]s ready for [`spanline::layout::layout`]. A failed related
//! fetch is reported in [`Assembly::failures`] and never hides the others.
//!
//! # Usage
//!
//! ```rust,no_run
//! # async fn run() -> spanline_timeline::Result<()> {
//! use spanline::{FractionalDate, LayoutConfig, LayoutSession, SpanId, SpanStore};
//! use spanline_timeline::TimelineAssembler;
//!
//! let store = SpanStore::open("./people.spanline")?;
//! let assembler = TimelineAssembler::new(&store);
//! let assembly = assembler.assemble(&SpanId::new("ada"), &[]).await?;
//!
//! let timeline = &assembly.subject;
//! let now = FractionalDate::today();
//! if let Some(frame) = timeline.frame(800.0, now) {
//!     let layout = timeline.layout(&LayoutSession::new(), &frame, &LayoutConfig::default());
//!     println!("{} lanes", layout.lane_count);
//! }
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use futures::future::{join_all, try_join};
use serde::Serialize;
use spanline::layout::{self, Frame};
use spanline::relations::{self, AggregateOptions};
use spanline::{
    AxisMode, ConnectionRecord, FractionMode, FractionalDate, LayoutConfig, LayoutSession,
    RelationSet, SpanId, SpanRecord, SpanlineError, Swimlane, TimelineLayout, Viewport,
    VisibleRange,
};

#[derive(Debug, thiserror::Error)]
pub enum TimelineError {
    #[error(transparent)]
    Core(#[from] SpanlineError),
    #[error("provider error: {0}")]
    Provider(String),
}

pub type Result<T> = std::result::Result<T, TimelineError>;

/// Source of spans and their connections.
///
/// `connections` returns records already normalized for `id`, phases
/// included.
#[async_trait]
pub trait EntityProvider: Send + Sync {
    async fn span(&self, id: &SpanId) -> Result<SpanRecord>;
    async fn connections(&self, id: &SpanId) -> Result<Vec<ConnectionRecord>>;
}

#[cfg(feature = "store")]
#[async_trait]
impl EntityProvider for spanline::SpanStore {
    async fn span(&self, id: &SpanId) -> Result<SpanRecord> {
        Ok(spanline::SpanStore::span(self, id)?)
    }

    async fn connections(&self, id: &SpanId) -> Result<Vec<ConnectionRecord>> {
        Ok(self.connections_of(id)?)
    }
}

// ---------------------------------------------------------------------------
// Timeline
// ---------------------------------------------------------------------------

/// One span's fetched data, classified and turned into swimlanes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Timeline {
    pub subject: SpanRecord,
    pub connections: Vec<ConnectionRecord>,
    pub relations: RelationSet,
    /// Life lane first, then connections by start date; undated last.
    pub swimlanes: Vec<Swimlane>,
}

impl Timeline {
    pub fn build(
        subject: SpanRecord,
        mut connections: Vec<ConnectionRecord>,
        options: AggregateOptions,
    ) -> Self {
        connections.sort_by_key(|c| c.dates.start_sort_key());
        let relations = relations::aggregate(&subject.dates, &connections, options);

        let mut swimlanes = Vec::with_capacity(connections.len() + 1);
        swimlanes.extend(Swimlane::life(&subject));
        for connection in &connections {
            let relation = relations
                .entries()
                .iter()
                .find(|r| r.connection_id == connection.id)
                .map(|r| r.display);
            swimlanes.push(Swimlane::connection(connection, relation));
        }

        Self {
            subject,
            connections,
            relations,
            swimlanes,
        }
    }

    pub fn visible_range(&self, now: FractionalDate) -> Option<VisibleRange> {
        VisibleRange::covering(&self.swimlanes, now)
    }

    /// Frame for a viewport starting at x = 0.
    pub fn frame(&self, width: f64, now: FractionalDate) -> Option<Frame> {
        Some(Frame {
            viewport: Viewport::new(0.0, width),
            visible: self.visible_range(now)?,
            now,
        })
    }

    /// Relative axis measured from the subject's start, if it has one.
    pub fn relative_axis(&self) -> Option<AxisMode> {
        let start = self.subject.dates.start_date().ok()?;
        Some(AxisMode::Relative {
            origin: start.to_fractional(FractionMode::Start),
        })
    }

    pub fn layout(
        &self,
        session: &LayoutSession,
        frame: &Frame,
        config: &LayoutConfig,
    ) -> TimelineLayout {
        layout::layout(&self.swimlanes, session, frame, config)
    }
}

// ---------------------------------------------------------------------------
// Assembly
// ---------------------------------------------------------------------------

/// A related span that could not be fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FetchFailure {
    pub id: SpanId,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assembly {
    pub subject: Timeline,
    /// Successfully fetched related timelines, in request order.
    pub related: Vec<Timeline>,
    pub failures: Vec<FetchFailure>,
}

pub struct TimelineAssembler<'a, P: EntityProvider + ?Sized> {
    provider: &'a P,
    options: AggregateOptions,
}

impl<'a, P: EntityProvider + ?Sized> TimelineAssembler<'a, P> {
    pub fn new(provider: &'a P) -> Self {
        Self {
            provider,
            options: AggregateOptions::default(),
        }
    }

    pub fn with_options(mut self, options: AggregateOptions) -> Self {
        self.options = options;
        self
    }

    /// Fetch and build the subject's timeline, then every related one
    /// concurrently.
    ///
    /// # Errors
    ///
    /// Fails only when the subject itself cannot be fetched.
    pub async fn assemble(&self, subject_id: &SpanId, related_ids: &[SpanId]) -> Result<Assembly> {
        let subject = self.fetch(subject_id).await?;

        let fetches = related_ids.iter().map(|id| async move { (id, self.fetch(id).await) });
        let mut related = Vec::with_capacity(related_ids.len());
        let mut failures = Vec::new();
        for (id, outcome) in join_all(fetches).await {
            match outcome {
                Ok(timeline) => related.push(timeline),
                Err(e) => {
                    tracing::warn!(span = %id, error = %e, "related timeline fetch failed");
                    failures.push(FetchFailure {
                        id: id.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        tracing::debug!(
            subject = %subject_id,
            related = related.len(),
            failed = failures.len(),
            "timelines assembled"
        );
        Ok(Assembly {
            subject,
            related,
            failures,
        })
    }

    async fn fetch(&self, id: &SpanId) -> Result<Timeline> {
        let (span, connections) =
            try_join(self.provider.span(id), self.provider.connections(id)).await?;
        Ok(Timeline::build(span, connections, self.options))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
