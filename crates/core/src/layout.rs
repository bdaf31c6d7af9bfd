//! Swimlane timeline layout.
//!
//! [`layout`] is a pure function from swimlanes, a [`LayoutSession`] and a
//! [`Frame`] to [`TimelineLayout`] geometry. It never draws; a renderer
//! consumes the bars it returns.
//!
//! The session carries everything the viewer can change without refetching
//! data: lane mode, type and state filters, axis mode and zoom/pan. It is an
//! ordinary value owned by whoever owns the view.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::{
    CompletionState, ConnectionRecord, DisplayRelation, FractionMode, FractionalDate, SpanId,
    SpanRecord, TemporalRange,
};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Pixel metrics and zoom limits.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub lane_height: f64,
    pub lane_gap: f64,
    pub margin_top: f64,
    pub margin_bottom: f64,
    /// Share of the viewport a fitted interval should fill.
    pub fit_fraction: f64,
    pub max_zoom: f64,
    /// Duration of a fit-to-interval transition.
    pub animation_ms: u64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            lane_height: 24.0,
            lane_gap: 6.0,
            margin_top: 10.0,
            margin_bottom: 10.0,
            fit_fraction: 0.6,
            max_zoom: 200.0,
            animation_ms: 500,
        }
    }
}

// ---------------------------------------------------------------------------
// Swimlanes
// ---------------------------------------------------------------------------

/// What a swimlane stands for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SwimlaneKind {
    /// The subject's own lifetime.
    Life,
    /// One connection or phase, grouped by its connection type.
    Connection { type_id: String },
}

/// The interval a swimlane covers, if known.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "span", rename_all = "snake_case")]
pub enum SwimlaneSpan {
    Known { range: TemporalRange },
    /// The connection exists but its dates cannot be placed.
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Swimlane {
    pub id: SpanId,
    pub kind: SwimlaneKind,
    pub label: String,
    pub span: SwimlaneSpan,
    pub state: CompletionState,
    #[serde(default)]
    pub relation: Option<DisplayRelation>,
}

impl Swimlane {
    /// The subject's life lane, or `None` when the subject has no dates.
    pub fn life(subject: &SpanRecord) -> Option<Self> {
        let range = subject.dates.to_range().ok()?;
        Some(Self {
            id: subject.id.clone(),
            kind: SwimlaneKind::Life,
            label: subject.name.clone(),
            span: SwimlaneSpan::Known { range },
            state: subject.state(),
            relation: None,
        })
    }

    /// A connection lane labelled `"{predicate} {other}"`.
    pub fn connection(record: &ConnectionRecord, relation: Option<DisplayRelation>) -> Self {
        let (span, derived) = match record.dates.to_range() {
            Ok(range) => (SwimlaneSpan::Known { range }, record.state()),
            Err(_) => (SwimlaneSpan::Unknown, CompletionState::Placeholder),
        };
        Self {
            id: record.id.clone(),
            kind: SwimlaneKind::Connection {
                type_id: record.connection_type.clone(),
            },
            label: format!("{} {}", record.predicate, record.other.name),
            span,
            state: record.state.unwrap_or(derived),
            relation,
        }
    }

    pub fn is_life(&self) -> bool {
        matches!(self.kind, SwimlaneKind::Life)
    }

    pub fn type_id(&self) -> Option<&str> {
        match &self.kind {
            SwimlaneKind::Life => None,
            SwimlaneKind::Connection { type_id } => Some(type_id),
        }
    }

    pub fn range(&self) -> Option<&TemporalRange> {
        match &self.span {
            SwimlaneSpan::Known { range } => Some(range),
            SwimlaneSpan::Unknown => None,
        }
    }
}

/// Every connection type present in `swimlanes`.
pub fn connection_types(swimlanes: &[Swimlane]) -> BTreeSet<String> {
    swimlanes
        .iter()
        .filter_map(|s| s.type_id().map(str::to_string))
        .collect()
}

// ---------------------------------------------------------------------------
// Session state
// ---------------------------------------------------------------------------

/// How swimlanes map onto vertical lanes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LaneMode {
    /// One lane per swimlane, in input order.
    #[default]
    Expanded,
    /// One lane per connection type.
    Grouped,
    /// Everything on the life lane.
    Collapsed,
}

/// Labelling of the horizontal axis. Pixel positions are the same in both
/// modes; only axis values change.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "axis", rename_all = "snake_case")]
pub enum AxisMode {
    /// Calendar years.
    #[default]
    Absolute,
    /// Years since `origin`, usually the subject's start.
    Relative { origin: f64 },
}

impl AxisMode {
    fn to_axis(self, value: f64) -> f64 {
        match self {
            AxisMode::Absolute => value,
            AxisMode::Relative { origin } => value - origin,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "filter", content = "types", rename_all = "snake_case")]
pub enum TypeFilter {
    #[default]
    All,
    Isolated(String),
    Subset(BTreeSet<String>),
}

impl TypeFilter {
    pub fn matches(&self, type_id: &str) -> bool {
        match self {
            TypeFilter::All => true,
            TypeFilter::Isolated(t) => t == type_id,
            TypeFilter::Subset(set) => set.contains(type_id),
        }
    }

    /// Flip one type in or out. Collapses back to [`TypeFilter::All`] once
    /// every known type is active again.
    pub fn toggle(&mut self, type_id: &str, known: &BTreeSet<String>) {
        let mut active = match self {
            TypeFilter::All => known.clone(),
            TypeFilter::Isolated(t) => BTreeSet::from([t.clone()]),
            TypeFilter::Subset(set) => set.clone(),
        };
        if !active.remove(type_id) {
            active.insert(type_id.to_string());
        }
        *self = if active == *known {
            TypeFilter::All
        } else {
            TypeFilter::Subset(active)
        };
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "filter", content = "state", rename_all = "snake_case")]
pub enum StateFilter {
    #[default]
    All,
    Only(CompletionState),
}

impl StateFilter {
    pub fn matches(&self, state: CompletionState) -> bool {
        match self {
            StateFilter::All => true,
            StateFilter::Only(s) => *s == state,
        }
    }
}

/// Horizontal zoom and pan, in pixels of the zoomed content.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomState {
    pub factor: f64,
    pub pan: f64,
}

impl Default for ZoomState {
    fn default() -> Self {
        Self {
            factor: 1.0,
            pan: 0.0,
        }
    }
}

impl ZoomState {
    /// Force `factor >= 1` (and at most `max_zoom`) and keep the window inside
    /// `[0, content_width - viewport_width]`.
    pub fn clamped(self, viewport: Viewport, max_zoom: f64) -> Self {
        let viewport = viewport.sanitized();
        let factor = if self.factor.is_finite() {
            self.factor.clamp(1.0, max_zoom.max(1.0))
        } else {
            1.0
        };
        let max_pan = (viewport.width * factor - viewport.width).max(0.0);
        let pan = if self.pan.is_finite() {
            self.pan.clamp(0.0, max_pan)
        } else {
            0.0
        };
        Self { factor, pan }
    }

    pub fn content_width(&self, viewport: Viewport) -> f64 {
        viewport.width * self.factor
    }
}

/// A timed transition between two zoom states.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomAnimation {
    pub from: ZoomState,
    pub to: ZoomState,
    pub duration_ms: u64,
}

impl ZoomAnimation {
    /// The zoom state `elapsed_ms` into the transition.
    pub fn sample(&self, elapsed_ms: u64) -> ZoomState {
        if self.duration_ms == 0 || elapsed_ms >= self.duration_ms {
            return self.to;
        }
        let t = ease_in_out_cubic(elapsed_ms as f64 / self.duration_ms as f64);
        ZoomState {
            factor: self.from.factor + (self.to.factor - self.from.factor) * t,
            pan: self.from.pan + (self.to.pan - self.from.pan) * t,
        }
    }

    pub fn is_finished(&self, elapsed_ms: u64) -> bool {
        elapsed_ms >= self.duration_ms
    }
}

fn ease_in_out_cubic(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

/// Per-view state. Owned by the calling view; nothing here is global.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutSession {
    #[serde(default)]
    pub mode: LaneMode,
    #[serde(default)]
    pub axis: AxisMode,
    #[serde(default)]
    pub type_filter: TypeFilter,
    #[serde(default)]
    pub state_filter: StateFilter,
    #[serde(default)]
    pub zoom: ZoomState,
}

impl LayoutSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// The life lane ignores both filters.
    pub fn is_visible(&self, swimlane: &Swimlane) -> bool {
        match swimlane.type_id() {
            None => true,
            Some(type_id) => {
                self.type_filter.matches(type_id) && self.state_filter.matches(swimlane.state)
            }
        }
    }

    pub fn isolate(&mut self, type_id: impl Into<String>) {
        self.type_filter = TypeFilter::Isolated(type_id.into());
    }

    pub fn toggle_type(&mut self, type_id: &str, known: &BTreeSet<String>) {
        self.type_filter.toggle(type_id, known);
    }

    pub fn show_all(&mut self) {
        self.type_filter = TypeFilter::All;
    }

    pub fn set_zoom(&mut self, zoom: ZoomState, viewport: Viewport, config: &LayoutConfig) {
        self.zoom = zoom.clamped(viewport, config.max_zoom);
    }

    pub fn reset_zoom(&mut self) {
        self.zoom = ZoomState::default();
    }

    pub fn pan_by(&mut self, dx: f64, viewport: Viewport, config: &LayoutConfig) {
        let zoom = ZoomState {
            pan: self.zoom.pan + dx,
            ..self.zoom
        };
        self.set_zoom(zoom, viewport, config);
    }

    /// Multiply the zoom factor by `scale`, keeping whatever is under
    /// `anchor_x` where it is.
    pub fn zoom_at(&mut self, scale: f64, anchor_x: f64, viewport: Viewport, config: &LayoutConfig) {
        let viewport = viewport.sanitized();
        let old = self.zoom.clamped(viewport, config.max_zoom);
        let old_content = old.content_width(viewport);
        let anchor_offset = (anchor_x - viewport.left).clamp(0.0, viewport.width);
        let ratio = if old_content > 0.0 {
            (anchor_offset + old.pan) / old_content
        } else {
            0.0
        };

        let factor = (old.factor * scale).clamp(1.0, config.max_zoom.max(1.0));
        let new_content = viewport.width * factor;
        let zoom = ZoomState {
            factor,
            pan: ratio * new_content - anchor_offset,
        };
        self.set_zoom(zoom, viewport, config);
    }

    /// Start a transition that frames `swimlane_id` at
    /// [`LayoutConfig::fit_fraction`] of the viewport. `None` for undated or
    /// unknown swimlanes.
    pub fn fit_animation(
        &self,
        layout: &TimelineLayout,
        swimlane_id: &SpanId,
        config: &LayoutConfig,
    ) -> Option<ZoomAnimation> {
        let to = layout.fit_interval(swimlane_id, config)?;
        Some(ZoomAnimation {
            from: self.zoom,
            to,
            duration_ms: config.animation_ms,
        })
    }
}

// ---------------------------------------------------------------------------
// Geometry
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub left: f64,
    pub width: f64,
}

impl Viewport {
    pub fn new(left: f64, width: f64) -> Self {
        Self { left, width }.sanitized()
    }

    /// Non-finite bounds become zero and a negative width becomes empty, so
    /// `left <= right()` always holds.
    pub fn sanitized(self) -> Self {
        let finite_or_zero = |v: f64| if v.is_finite() { v } else { 0.0 };
        Self {
            left: finite_or_zero(self.left),
            width: finite_or_zero(self.width).max(0.0),
        }
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }
}

/// The calendar window mapped onto the (unzoomed) viewport, in fractional
/// years.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VisibleRange {
    pub start: f64,
    pub end: f64,
}

impl VisibleRange {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    /// Window length; an empty or inverted window counts as one year.
    pub fn span(&self) -> f64 {
        let span = self.end - self.start;
        if span > 0.0 && span.is_finite() {
            span
        } else {
            1.0
        }
    }

    /// From the earliest known start to the latest drawn end.
    ///
    /// Ongoing ranges end at `now`. `None` when no swimlane has a range.
    pub fn covering(swimlanes: &[Swimlane], now: FractionalDate) -> Option<Self> {
        let now = now.to_fractional(FractionMode::Start);
        let mut bounds: Option<(f64, f64)> = None;
        for range in swimlanes.iter().filter_map(Swimlane::range) {
            let start = range.start_value();
            let end = range.end_value_clamped(now);
            bounds = Some(match bounds {
                None => (start, end),
                Some((lo, hi)) => (lo.min(start), hi.max(end)),
            });
        }
        let (start, end) = bounds?;
        if end > start {
            Some(Self { start, end })
        } else {
            Some(Self {
                start,
                end: start + 1.0,
            })
        }
    }
}

/// Everything about the rendering context that is not session state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub viewport: Viewport,
    pub visible: VisibleRange,
    pub now: FractionalDate,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct TimeScale {
    start: f64,
    span: f64,
    left: f64,
    content_width: f64,
    pan: f64,
}

impl TimeScale {
    fn new(visible: VisibleRange, viewport: Viewport, zoom: ZoomState) -> Self {
        Self {
            start: visible.start,
            span: visible.span(),
            left: viewport.left,
            content_width: zoom.content_width(viewport),
            pan: zoom.pan,
        }
    }

    fn x(&self, value: f64) -> f64 {
        self.left + (value - self.start) / self.span * self.content_width - self.pan
    }

    fn value_at(&self, x: f64) -> f64 {
        if self.content_width <= 0.0 {
            return self.start;
        }
        self.start + (x - self.left + self.pan) / self.content_width * self.span
    }
}

/// One drawable bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaneBar {
    pub swimlane_id: SpanId,
    pub kind: SwimlaneKind,
    pub lane: usize,
    pub x1: f64,
    pub x2: f64,
    pub y: f64,
    pub height: f64,
    pub label: String,
    pub relation: Option<DisplayRelation>,
    pub state: CompletionState,
    /// Full-width faint bar for a swimlane without usable dates.
    pub undated: bool,
    /// Still running at `now`, including ends stored in the future.
    pub ongoing: bool,
    /// Clickable and eligible for hover tooltips. False for undated bars and
    /// for bars panned entirely out of the viewport.
    pub interactive: bool,
    /// Drawn interval in fractional years, absent when undated.
    pub start_value: Option<f64>,
    pub end_value: Option<f64>,
}

/// A swimlane changing lanes between two layouts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaneMove {
    pub swimlane_id: SpanId,
    /// `None` when the swimlane was hidden before.
    pub from: Option<usize>,
    /// `None` when the swimlane is hidden now.
    pub to: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisTick {
    pub x: f64,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineLayout {
    pub bars: Vec<LaneBar>,
    pub lane_count: usize,
    pub content_width: f64,
    pub content_height: f64,
    pub viewport: Viewport,
    pub visible: VisibleRange,
    pub zoom: ZoomState,
    pub axis: AxisMode,
}

impl TimelineLayout {
    fn scale(&self) -> TimeScale {
        TimeScale::new(self.visible, self.viewport, self.zoom)
    }

    pub fn bar(&self, swimlane_id: &SpanId) -> Option<&LaneBar> {
        self.bars.iter().find(|b| b.swimlane_id == *swimlane_id)
    }

    /// Fractional year under pixel `x`.
    pub fn value_at(&self, x: f64) -> f64 {
        self.scale().value_at(x)
    }

    /// Value under pixel `x` in axis units (years since origin in relative
    /// mode).
    pub fn axis_value_at(&self, x: f64) -> f64 {
        self.axis.to_axis(self.value_at(x))
    }

    /// The calendar day under pixel `x`.
    pub fn date_at(&self, x: f64) -> Option<FractionalDate> {
        FractionalDate::from_fractional(self.value_at(x)).ok()
    }

    /// The topmost interactive bar under a point. Undated bars never match.
    pub fn hit_test(&self, x: f64, y: f64) -> Option<&LaneBar> {
        self.bars.iter().rev().find(|b| {
            b.interactive && x >= b.x1 && x <= b.x2 && y >= b.y && y <= b.y + b.height
        })
    }

    /// Zoom state that frames a bar's interval, centred.
    pub fn fit_interval(&self, swimlane_id: &SpanId, config: &LayoutConfig) -> Option<ZoomState> {
        let bar = self.bar(swimlane_id)?;
        let (start, end) = (bar.start_value?, bar.end_value?);
        let span = self.visible.span();
        let f1 = (start - self.visible.start) / span;
        let f2 = (end - self.visible.start) / span;

        // A one-day interval still needs a finite zoom.
        let width = (f2 - f1).max(1e-6);
        let factor = (config.fit_fraction / width).clamp(1.0, config.max_zoom.max(1.0));
        let content = self.viewport.width * factor;
        let centre = (f1 + f2) / 2.0 * content;
        let zoom = ZoomState {
            factor,
            pan: centre - self.viewport.width / 2.0,
        };
        Some(zoom.clamped(self.viewport, config.max_zoom))
    }

    /// Lane changes relative to an earlier layout of the same swimlanes.
    pub fn transitions_from(&self, previous: &TimelineLayout) -> Vec<LaneMove> {
        let before: HashMap<&SpanId, usize> = previous
            .bars
            .iter()
            .map(|b| (&b.swimlane_id, b.lane))
            .collect();
        let after: HashMap<&SpanId, usize> =
            self.bars.iter().map(|b| (&b.swimlane_id, b.lane)).collect();

        let mut moves: Vec<LaneMove> = self
            .bars
            .iter()
            .filter_map(|b| {
                let from = before.get(&b.swimlane_id).copied();
                (from != Some(b.lane)).then(|| LaneMove {
                    swimlane_id: b.swimlane_id.clone(),
                    from,
                    to: Some(b.lane),
                })
            })
            .collect();
        moves.extend(
            previous
                .bars
                .iter()
                .filter(|b| !after.contains_key(&b.swimlane_id))
                .map(|b| LaneMove {
                    swimlane_id: b.swimlane_id.clone(),
                    from: Some(b.lane),
                    to: None,
                }),
        );
        moves
    }

    /// Evenly stepped axis ticks inside the viewport, at most `max_ticks`.
    ///
    /// Steps are 1, 2 or 5 times a power of ten years, in axis units, so a
    /// month-scale zoom gets fractional-year steps.
    pub fn ticks(&self, max_ticks: usize) -> Vec<AxisTick> {
        if max_ticks == 0 || self.viewport.width <= 0.0 {
            return Vec::new();
        }
        let scale = self.scale();
        let lo = self.axis.to_axis(scale.value_at(self.viewport.left));
        let hi = self.axis.to_axis(scale.value_at(self.viewport.right()));
        let step = nice_step((hi - lo) / max_ticks as f64);
        let offset = lo - scale.value_at(self.viewport.left);

        let first = (lo / step).ceil();
        (0..max_ticks)
            .map(|i| (first + i as f64) * step)
            .take_while(|value| *value <= hi)
            .map(|value| AxisTick {
                x: scale.x(value - offset),
                value,
            })
            .collect()
    }
}

fn nice_step(raw: f64) -> f64 {
    if !(raw.is_finite() && raw > 0.0) {
        return 1.0;
    }
    let magnitude = 10f64.powf(raw.log10().floor());
    for multiple in [1.0, 2.0, 5.0, 10.0] {
        if multiple * magnitude >= raw {
            return multiple * magnitude;
        }
    }
    10.0 * magnitude
}

/// Lay out `swimlanes` for one frame.
///
/// Visible swimlanes are packed without gaps: the life lane takes lane 0 and
/// connections follow according to [`LaneMode`].
pub fn layout(
    swimlanes: &[Swimlane],
    session: &LayoutSession,
    frame: &Frame,
    config: &LayoutConfig,
) -> TimelineLayout {
    let viewport = frame.viewport.sanitized();
    let zoom = session.zoom.clamped(viewport, config.max_zoom);
    let scale = TimeScale::new(frame.visible, viewport, zoom);
    let now = frame.now.to_fractional(FractionMode::Start);

    let visible: Vec<&Swimlane> = swimlanes.iter().filter(|s| session.is_visible(s)).collect();
    let has_life = visible.iter().any(|s| s.is_life());
    let first_connection_lane = usize::from(has_life);

    let mut next_lane = first_connection_lane;
    let mut group_lanes: HashMap<&str, usize> = HashMap::new();
    let mut bars = Vec::with_capacity(visible.len());

    for swimlane in visible {
        let lane = match (&swimlane.kind, session.mode) {
            (SwimlaneKind::Life, _) | (_, LaneMode::Collapsed) => 0,
            (SwimlaneKind::Connection { .. }, LaneMode::Expanded) => {
                next_lane += 1;
                next_lane - 1
            }
            (SwimlaneKind::Connection { type_id }, LaneMode::Grouped) => {
                *group_lanes.entry(type_id.as_str()).or_insert_with(|| {
                    next_lane += 1;
                    next_lane - 1
                })
            }
        };
        bars.push(place(swimlane, lane, &scale, viewport, now, config));
    }

    let lane_count = bars.iter().map(|b| b.lane + 1).max().unwrap_or(0);
    let content_height = if lane_count == 0 {
        0.0
    } else {
        config.margin_top
            + lane_count as f64 * config.lane_height
            + (lane_count - 1) as f64 * config.lane_gap
            + config.margin_bottom
    };

    tracing::trace!(bars = bars.len(), lane_count, mode = ?session.mode, "timeline laid out");

    TimelineLayout {
        bars,
        lane_count,
        content_width: zoom.content_width(viewport),
        content_height,
        viewport,
        visible: frame.visible,
        zoom,
        axis: session.axis,
    }
}

fn place(
    swimlane: &Swimlane,
    lane: usize,
    scale: &TimeScale,
    viewport: Viewport,
    now: f64,
    config: &LayoutConfig,
) -> LaneBar {
    let y = config.margin_top + lane as f64 * (config.lane_height + config.lane_gap);
    let clamp = |x: f64| x.clamp(viewport.left, viewport.right());

    let (x1, x2, start_value, end_value, ongoing, in_view) = match swimlane.range() {
        Some(range) => {
            let start = range.start_value();
            let end = range.end_value_clamped(now);
            let (raw1, raw2) = (scale.x(start), scale.x(end));
            (
                clamp(raw1),
                clamp(raw2),
                Some(start),
                Some(end),
                range.is_ongoing_at(now),
                raw2 >= viewport.left && raw1 <= viewport.right(),
            )
        }
        None => (viewport.left, viewport.right(), None, None, false, false),
    };
    let undated = start_value.is_none();

    LaneBar {
        swimlane_id: swimlane.id.clone(),
        kind: swimlane.kind.clone(),
        lane,
        x1,
        x2,
        y,
        height: config.lane_height,
        label: swimlane.label.clone(),
        relation: swimlane.relation,
        state: swimlane.state,
        undated,
        ongoing,
        interactive: in_view,
        start_value,
        end_value,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
