//! Drag state for card and column drags.
//!
//! A drag moves through three phases:
//!
//! - **Idle**: no source.
//! - **Dragging**: a source is set but the pointer is not over a drop zone.
//! - **Targeting**: a target and its placement are set together.
//!
//! `end()` returns to idle whether or not a drop happened. The card and
//! column machines are independent; keeping only one of them active at a
//! time is up to the caller.

use serde::Serialize;

/// Where a drop lands relative to its target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Placement {
    Before,
    After,
}

impl Placement {
    /// Placement for a pointer at `pointer` over an element spanning
    /// `start..start + extent` along the drag axis. The first half is
    /// `Before`, the midpoint and beyond are `After`.
    pub fn from_pointer(pointer: f64, start: f64, extent: f64) -> Self {
        if pointer < start + extent / 2.0 {
            Placement::Before
        } else {
            Placement::After
        }
    }

    /// Placement of a pointer over a rectangle along the given axis
    pub fn from_rect(x: f64, y: f64, rect: Rect, axis: Axis) -> Self {
        match axis {
            Axis::Vertical => Self::from_pointer(y, rect.y, rect.height),
            Axis::Horizontal => Self::from_pointer(x, rect.x, rect.width),
        }
    }
}

/// Bounding box of a candidate drop element
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Axis used for placement: cards stack vertically, columns horizontally
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Vertical,
    Horizontal,
}

/// Which board element a drag carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DragKind {
    Card,
    Column,
}

impl DragKind {
    /// MIME-like type string for the host's native drag payload
    pub fn drag_type(self) -> &'static str {
        match self {
            DragKind::Card => "application/x-cardboard-card",
            DragKind::Column => "application/x-cardboard-column",
        }
    }

    /// Axis along which placement is derived
    pub fn axis(self) -> Axis {
        match self {
            DragKind::Card => Axis::Vertical,
            DragKind::Column => Axis::Horizontal,
        }
    }
}

/// Data handed to the host layer when a drag starts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragPayload {
    pub drag_type: &'static str,
    pub id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragPhase {
    Idle,
    Dragging,
    Targeting,
}

/// One drag state machine. `target` holds the drop target and its
/// placement as a single pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragState {
    kind: DragKind,
    source: Option<String>,
    target: Option<(String, Placement)>,
}

impl DragState {
    pub fn new(kind: DragKind) -> Self {
        DragState {
            kind,
            source: None,
            target: None,
        }
    }

    pub fn kind(&self) -> DragKind {
        self.kind
    }

    pub fn phase(&self) -> DragPhase {
        match (&self.source, &self.target) {
            (None, _) => DragPhase::Idle,
            (Some(_), None) => DragPhase::Dragging,
            (Some(_), Some(_)) => DragPhase::Targeting,
        }
    }

    pub fn is_active(&self) -> bool {
        self.source.is_some()
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// Current target and placement; `None` while idle or between zones
    pub fn target(&self) -> Option<(&str, Placement)> {
        if self.source.is_none() {
            return None;
        }
        self.target.as_ref().map(|(id, p)| (id.as_str(), *p))
    }

    /// Begin a drag from `id`.
    pub fn start(&mut self, id: &str) -> DragPayload {
        self.source = Some(id.to_string());
        self.target = None;
        DragPayload {
            drag_type: self.kind.drag_type(),
            id: id.to_string(),
        }
    }

    /// Point the drag at a drop target. Returns `false` without changing
    /// anything when idle or when the pair is unchanged.
    pub fn set_target(&mut self, id: &str, placement: Placement) -> bool {
        if self.source.is_none() {
            return false;
        }
        if let Some((current, p)) = &self.target
            && current == id
            && *p == placement
        {
            return false;
        }
        self.target = Some((id.to_string(), placement));
        true
    }

    /// The pointer left every drop zone; the drag continues.
    pub fn clear_target(&mut self) -> bool {
        self.target.take().is_some()
    }

    /// Finish the drag, dropped or cancelled.
    pub fn end(&mut self) {
        self.source = None;
        self.target = None;
    }

    /// Owned view of the drag for observers; `None` while idle
    pub fn snapshot(&self) -> Option<DragSnapshot> {
        let source = self.source.clone()?;
        let (target, placement) = match &self.target {
            Some((id, p)) => (Some(id.clone()), Some(*p)),
            None => (None, None),
        };
        Some(DragSnapshot {
            kind: self.kind,
            source,
            target,
            placement,
        })
    }
}

/// Live drag state handed to the display layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DragSnapshot {
    pub kind: DragKind,
    pub source: String,
    pub target: Option<String>,
    pub placement: Option<Placement>,
}

// ---------------------------------------------------------------------------
// Frame throttling
// ---------------------------------------------------------------------------

/// Ticket returned by [`FrameGate::request`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameTicket(u64);

/// Coalesces high-frequency requests to at most one per animation frame.
///
/// A newer request supersedes a pending one; its ticket is the only one that
/// can still fire. `cancel()` discards whatever is pending so nothing acts on
/// a stale pointer position after a drag ends.
#[derive(Debug, Clone)]
pub struct FrameGate<T> {
    pending: Option<(u64, T)>,
    next: u64,
}

impl<T> Default for FrameGate<T> {
    fn default() -> Self {
        FrameGate {
            pending: None,
            next: 0,
        }
    }
}

impl<T> FrameGate<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&mut self, value: T) -> FrameTicket {
        self.next += 1;
        self.pending = Some((self.next, value));
        FrameTicket(self.next)
    }

    /// Fire the frame callback for `ticket`. Yields the pending value only
    /// if `ticket` is still the latest request.
    pub fn fire(&mut self, ticket: FrameTicket) -> Option<T> {
        let latest = self.pending.as_ref().map(|(id, _)| *id);
        if latest != Some(ticket.0) {
            return None;
        }
        self.pending.take().map(|(_, v)| v)
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}
