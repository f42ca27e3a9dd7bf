//! Rendering-layer handles: the mark collection and the clear surface.
//!
//! Both handles are cheap to clone and share their state, so the host, the
//! behavior and the plot adapter all see the same marks. Everything runs on
//! the UI thread; listeners are invoked without any internal borrow held, so
//! a click listener may update the marks it was fired from.

use std::cell::RefCell;
use std::rc::Rc;

use crate::data::data_point::{DataPoint, SelectionId};
use crate::events::{KeyModifiers, PlotPos};

/// Opacity of a mark before any selection has been rendered.
const UNSTYLED_OPACITY: f32 = 1.0;

/// A pointer click as seen by mark and surface listeners.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ClickEvent {
    pub modifiers: KeyModifiers,
    pub plot_pos: Option<PlotPos>,
}

impl ClickEvent {
    pub fn with_modifiers(modifiers: KeyModifiers) -> Self {
        Self {
            modifiers,
            plot_pos: None,
        }
    }
}

type MarkClickFn = dyn Fn(&DataPoint, &ClickEvent);
type SurfaceClickFn = dyn Fn(&ClickEvent);

#[derive(Debug, Clone)]
struct Mark {
    datum: DataPoint,
    opacity: f32,
}

impl Mark {
    fn new(datum: DataPoint) -> Self {
        Self {
            datum,
            opacity: UNSTYLED_OPACITY,
        }
    }
}

#[derive(Default)]
struct MarkSelectionInner {
    marks: Vec<Mark>,
    on_click: Option<Rc<MarkClickFn>>,
}

/// The collection of rendered data-point marks of one layer.
///
/// Each mark carries its bound [`DataPoint`] and an opacity style. A single
/// click listener applies to every mark in the collection.
#[derive(Clone, Default)]
pub struct MarkSelection {
    inner: Rc<RefCell<MarkSelectionInner>>,
}

impl MarkSelection {
    pub fn new(data: Vec<DataPoint>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(MarkSelectionInner {
                marks: data.into_iter().map(Mark::new).collect(),
                on_click: None,
            })),
        }
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().marks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of the bound data, in mark order.
    pub fn data(&self) -> Vec<DataPoint> {
        self.inner.borrow().marks.iter().map(|m| m.datum.clone()).collect()
    }

    pub fn datum(&self, index: usize) -> Option<DataPoint> {
        self.inner.borrow().marks.get(index).map(|m| m.datum.clone())
    }

    /// Current opacity style of every mark, in mark order.
    pub fn opacities(&self) -> Vec<f32> {
        self.inner.borrow().marks.iter().map(|m| m.opacity).collect()
    }

    pub fn opacity(&self, index: usize) -> Option<f32> {
        self.inner.borrow().marks.get(index).map(|m| m.opacity)
    }

    /// Bind new data to the collection.
    ///
    /// Marks that still exist keep their style, new marks start unstyled and
    /// surplus marks are removed. The click listener stays installed.
    pub fn join(&self, data: Vec<DataPoint>) {
        let mut inner = self.inner.borrow_mut();
        let keep = data.len().min(inner.marks.len());
        inner.marks.truncate(keep);
        let mut data = data.into_iter();
        for (mark, datum) in inner.marks.iter_mut().zip(data.by_ref()) {
            mark.datum = datum;
        }
        inner.marks.extend(data.map(Mark::new));
    }

    /// Mutate every bound data point in place.
    pub fn update_data(&self, mut f: impl FnMut(&mut DataPoint)) {
        for mark in self.inner.borrow_mut().marks.iter_mut() {
            f(&mut mark.datum);
        }
    }

    /// Install the click listener of every mark, replacing any previous one.
    pub fn on_click(&self, listener: impl Fn(&DataPoint, &ClickEvent) + 'static) {
        self.inner.borrow_mut().on_click = Some(Rc::new(listener));
    }

    pub fn has_click_listener(&self) -> bool {
        self.inner.borrow().on_click.is_some()
    }

    /// Remove the click listener; later clicks are not delivered.
    pub fn remove_click_listener(&self) {
        self.inner.borrow_mut().on_click = None;
    }

    /// Whether any bound data point carries `identity`.
    pub fn contains_identity(&self, identity: &SelectionId) -> bool {
        self.inner.borrow().marks.iter().any(|m| &m.datum.identity == identity)
    }

    /// Assign the opacity style of every mark from its bound data.
    pub fn style_opacity(&self, f: impl Fn(&DataPoint) -> f32) {
        for mark in self.inner.borrow_mut().marks.iter_mut() {
            mark.opacity = f(&mark.datum);
        }
    }

    /// Deliver a click to the mark at `index`.
    ///
    /// Returns `false` when the index is out of range or no listener is installed.
    pub fn dispatch_click(&self, index: usize, event: &ClickEvent) -> bool {
        let (listener, datum) = {
            let inner = self.inner.borrow();
            let (Some(mark), Some(listener)) = (inner.marks.get(index), inner.on_click.as_ref())
            else {
                return false;
            };
            (Rc::clone(listener), mark.datum.clone())
        };
        listener(&datum, event);
        true
    }
}

impl std::fmt::Debug for MarkSelection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("MarkSelection")
            .field("marks", &inner.marks)
            .field("has_click_listener", &inner.on_click.is_some())
            .finish()
    }
}

/// The background region behind the marks. Clicking it clears the selection.
#[derive(Clone, Default)]
pub struct ClearSurface {
    on_click: Rc<RefCell<Option<Rc<SurfaceClickFn>>>>,
}

impl ClearSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the click listener, replacing any previous one.
    pub fn on_click(&self, listener: impl Fn(&ClickEvent) + 'static) {
        *self.on_click.borrow_mut() = Some(Rc::new(listener));
    }

    pub fn has_click_listener(&self) -> bool {
        self.on_click.borrow().is_some()
    }

    pub fn remove_click_listener(&self) {
        *self.on_click.borrow_mut() = None;
    }

    /// Deliver a click. Returns `false` when no listener is installed.
    pub fn dispatch_click(&self, event: &ClickEvent) -> bool {
        let listener = self.on_click.borrow().clone();
        match listener {
            Some(listener) => {
                listener(event);
                true
            }
            None => false,
        }
    }
}

impl std::fmt::Debug for ClearSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClearSurface")
            .field("has_click_listener", &self.has_click_listener())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn points(n: usize) -> Vec<DataPoint> {
        (0..n)
            .map(|i| DataPoint::new(format!("p{i}"), i as f64, i as f64))
            .collect()
    }

    #[test]
    fn new_marks_start_unstyled() {
        let marks = MarkSelection::new(points(3));
        assert_eq!(marks.len(), 3);
        assert_eq!(marks.opacities(), vec![1.0, 1.0, 1.0]);
        assert!(!marks.has_click_listener());
    }

    #[test]
    fn on_click_replaces_previous_listener() {
        let marks = MarkSelection::new(points(2));
        let first = Rc::new(Cell::new(0));
        let second = Rc::new(Cell::new(0));
        let f = first.clone();
        marks.on_click(move |_, _| f.set(f.get() + 1));
        let s = second.clone();
        marks.on_click(move |_, _| s.set(s.get() + 1));

        assert!(marks.dispatch_click(1, &ClickEvent::default()));
        assert_eq!(first.get(), 0);
        assert_eq!(second.get(), 1);
    }

    #[test]
    fn dispatch_out_of_range_is_ignored() {
        let marks = MarkSelection::new(points(1));
        marks.on_click(|_, _| panic!("must not fire"));
        assert!(!marks.dispatch_click(5, &ClickEvent::default()));
    }

    #[test]
    fn listener_may_reenter_collection() {
        let marks = MarkSelection::new(points(2));
        let handle = marks.clone();
        marks.on_click(move |clicked, _| {
            let id = clicked.identity.clone();
            handle.update_data(|d| d.selected = d.identity == id);
            handle.style_opacity(|d| if d.selected { 0.85 } else { 0.4 });
        });
        assert!(marks.dispatch_click(0, &ClickEvent::default()));
        assert_eq!(marks.opacities(), vec![0.85, 0.4]);
    }

    #[test]
    fn join_keeps_style_of_surviving_marks() {
        let marks = MarkSelection::new(points(2));
        marks.style_opacity(|_| 0.4);
        marks.join(points(3));
        assert_eq!(marks.opacities(), vec![0.4, 0.4, 1.0]);
        marks.join(points(1));
        assert_eq!(marks.len(), 1);
        assert_eq!(marks.datum(0).map(|d| d.identity.0), Some("p0".to_string()));
    }

    #[test]
    fn removed_listener_no_longer_fires() {
        let marks = MarkSelection::new(points(1));
        let surface = ClearSurface::new();
        marks.on_click(|_, _| panic!("must not fire"));
        surface.on_click(|_| panic!("must not fire"));
        marks.remove_click_listener();
        surface.remove_click_listener();
        assert!(!marks.dispatch_click(0, &ClickEvent::default()));
        assert!(!surface.dispatch_click(&ClickEvent::default()));
        assert!(marks.contains_identity(&SelectionId::from("p0")));
        assert!(!marks.contains_identity(&SelectionId::from("p9")));
    }

    #[test]
    fn clear_surface_without_listener_reports_false() {
        let surface = ClearSurface::new();
        assert!(!surface.dispatch_click(&ClickEvent::default()));
        let hits = Rc::new(Cell::new(0));
        let h = hits.clone();
        surface.on_click(move |_| h.set(h.get() + 1));
        assert!(surface.dispatch_click(&ClickEvent::default()));
        assert_eq!(hits.get(), 1);
    }
}
