//! Event stream for mark clicks and selection changes.
//!
//! Callers can observe what the selection layer does via
//! [`EventController`].  Each event carries a set of [`EventKind`] flags
//! (bitflags-style) so that a single occurrence can match multiple
//! categories (e.g. a click on a mark that changed the selection).
//!
//! The caller specifies an [`EventFilter`] to receive only the events they
//! care about.  The filter is a simple OR mask: an event is delivered when
//! `(event.kinds & filter) != 0`.

use std::sync::mpsc::{Receiver, Sender};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::data::data_point::SelectionId;

// ─────────────────────────────────────────────────────────────────────────────
// EventKind – bitflags
// ─────────────────────────────────────────────────────────────────────────────

/// Bitflags describing the *categories* an event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EventKind(pub u64);

impl EventKind {
    // ── Pointer ─────────────────────────────────────────────────────────
    /// A click landed on a data-point mark.
    pub const MARK_CLICK: Self = Self(1 << 0);
    /// A click landed on the background (clear surface).
    pub const CLEAR_CLICK: Self = Self(1 << 1);

    // ── Selection ───────────────────────────────────────────────────────
    /// The set of selected identities changed.
    pub const SELECTION_CHANGED: Self = Self(1 << 2);
    /// The selection was cleared.
    pub const SELECTION_CLEARED: Self = Self(1 << 3);
    /// Mark opacities were recomputed.
    pub const SELECTION_RENDERED: Self = Self(1 << 4);

    /// Wildcard: matches *every* event kind.
    pub const ALL: Self = Self(u64::MAX);

    /// Combine two event kinds (bitwise OR).
    #[inline]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Check whether `self` contains all bits in `other`.
    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    /// Check whether `self` intersects with `other` (at least one bit in common).
    #[inline]
    pub const fn intersects(self, other: Self) -> bool {
        (self.0 & other.0) != 0
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl std::ops::BitOr for EventKind {
    type Output = Self;
    #[inline]
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl std::ops::BitOrAssign for EventKind {
    #[inline]
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl std::ops::BitAnd for EventKind {
    type Output = Self;
    #[inline]
    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            return write!(f, "EMPTY");
        }
        if *self == EventKind::ALL {
            return write!(f, "ALL");
        }

        let pairs: &[(EventKind, &str)] = &[
            (EventKind::MARK_CLICK, "MARK_CLICK"),
            (EventKind::CLEAR_CLICK, "CLEAR_CLICK"),
            (EventKind::SELECTION_CHANGED, "SELECTION_CHANGED"),
            (EventKind::SELECTION_CLEARED, "SELECTION_CLEARED"),
            (EventKind::SELECTION_RENDERED, "SELECTION_RENDERED"),
        ];

        let mut names = Vec::new();
        let mut known_bits: u64 = 0;
        for (kind, name) in pairs {
            known_bits |= kind.0;
            if self.contains(*kind) {
                names.push((*name).to_string());
            }
        }

        let extra = self.0 & !known_bits;
        if extra != 0 {
            names.push(format!("0x{:x}", extra));
        }
        write!(f, "{}", names.join("|"))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Metadata – per-event-type payloads
// ─────────────────────────────────────────────────────────────────────────────

/// Plot-space coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotPos {
    pub x: f64,
    pub y: f64,
}

/// Keyboard modifier state at the time of a click.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyModifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub command: bool,
}

impl From<egui::Modifiers> for KeyModifiers {
    fn from(m: egui::Modifiers) -> Self {
        Self {
            ctrl: m.ctrl,
            alt: m.alt,
            shift: m.shift,
            command: m.command,
        }
    }
}

/// Metadata attached to click events.
#[derive(Debug, Clone)]
pub struct ClickMeta {
    /// Index of the clicked mark (`None` for background clicks).
    pub mark_index: Option<usize>,
    /// Identity of the clicked data point.
    pub identity: Option<SelectionId>,
    pub plot_pos: Option<PlotPos>,
    pub modifiers: KeyModifiers,
}

/// Metadata for selection changes.
#[derive(Debug, Clone)]
pub struct SelectionMeta {
    /// Identities selected after the change.
    pub selected: Vec<SelectionId>,
    /// Whether the change came from an additive (multi-select) click.
    pub multi_select: bool,
}

/// Metadata for a render pass.
#[derive(Debug, Clone, Copy)]
pub struct RenderMeta {
    pub mark_count: usize,
    pub has_selection: bool,
    pub has_highlights: bool,
}

// ─────────────────────────────────────────────────────────────────────────────
// PlotEvent
// ─────────────────────────────────────────────────────────────────────────────

/// An event emitted by the selection layer.
#[derive(Debug, Clone)]
pub struct PlotEvent {
    pub kinds: EventKind,
    /// Seconds since the controller was created.
    pub timestamp: f64,

    pub click: Option<ClickMeta>,
    pub selection: Option<SelectionMeta>,
    pub render: Option<RenderMeta>,
}

impl PlotEvent {
    pub fn new(kinds: EventKind) -> Self {
        Self {
            kinds,
            timestamp: 0.0, // will be set by controller
            click: None,
            selection: None,
            render: None,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// EventFilter
// ─────────────────────────────────────────────────────────────────────────────

/// A filter that selects which event categories a subscriber receives.
#[derive(Debug, Clone, Copy)]
pub struct EventFilter {
    pub mask: EventKind,
}

impl EventFilter {
    pub const fn all() -> Self {
        Self {
            mask: EventKind::ALL,
        }
    }

    pub const fn only(mask: EventKind) -> Self {
        Self { mask }
    }

    #[inline]
    pub fn matches(&self, event: &PlotEvent) -> bool {
        event.kinds.intersects(self.mask)
    }
}

impl Default for EventFilter {
    fn default() -> Self {
        Self::all()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// EventController
// ─────────────────────────────────────────────────────────────────────────────

struct Subscriber {
    filter: EventFilter,
    sender: Sender<PlotEvent>,
}

struct EventCtrlInner {
    subscribers: Vec<Subscriber>,
    start_instant: std::time::Instant,
}

/// Controller that distributes selection-layer events to subscribers.
///
/// Attach it to an [`InteractivityService`](crate::InteractivityService) or a
/// [`ScatterLayer`](crate::ScatterLayer), then call
/// [`subscribe`](Self::subscribe) to receive events on an `mpsc` channel.
#[derive(Clone)]
pub struct EventController {
    inner: Arc<Mutex<EventCtrlInner>>,
}

impl EventController {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(EventCtrlInner {
                subscribers: Vec::new(),
                start_instant: std::time::Instant::now(),
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, EventCtrlInner> {
        // A panicking subscriber cannot leave the list half-updated.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Subscribe to events matching the given filter.
    pub fn subscribe(&self, filter: EventFilter) -> Receiver<PlotEvent> {
        let (tx, rx) = std::sync::mpsc::channel();
        self.lock().subscribers.push(Subscriber { filter, sender: tx });
        rx
    }

    pub fn subscribe_all(&self) -> Receiver<PlotEvent> {
        self.subscribe(EventFilter::all())
    }

    /// Emit an event to all matching subscribers.
    ///
    /// Subscribers whose receiver was dropped are pruned when an event would
    /// have been delivered to them.
    pub fn emit(&self, mut event: PlotEvent) {
        let mut inner = self.lock();
        event.timestamp = inner.start_instant.elapsed().as_secs_f64();
        inner.subscribers.retain(|sub| {
            if sub.filter.matches(&event) {
                sub.sender.send(event.clone()).is_ok()
            } else {
                true
            }
        });
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock().subscribers.len()
    }
}

impl Default for EventController {
    fn default() -> Self {
        Self::new()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Unit tests
// ─────────────────────────────────────────────────────────────────────────────
