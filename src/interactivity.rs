//! Host-side selection capabilities and a reference interactivity service.
//!
//! The behavior only talks to the host through the narrow traits below.
//! [`InteractivityService`] is an in-process host implementing them: it owns
//! the selected identities, keeps the marks' `selected` flags in sync and
//! asks the bound behavior to re-render after every change.

use std::cell::RefCell;
use std::collections::{BTreeSet, HashSet};
use std::rc::{Rc, Weak};

use crate::behavior::{BehaviorError, BehaviorOptions, InteractiveBehavior};
use crate::config::{BehaviorConfig, MultiSelectModifier};
use crate::data::data_point::{DataPoint, SelectionId};
use crate::events::{EventController, EventKind, PlotEvent, SelectionMeta};
use crate::marks::{ClearSurface, MarkSelection};

/// Read access to the host's selection/highlight state.
pub trait SelectionQuery {
    /// Any data point is currently selected.
    fn has_selection(&self) -> bool;
    /// Some data points are currently highlighted (e.g. by a cross-filter).
    ///
    /// Hosts return `true` while any bound point has `highlight` set, not when a selection exists.
    fn has_highlights(&self) -> bool;
}

pub trait SelectionClearer {
    fn handle_clear_selection(&self);
}

/// Receives selection gestures from the marks.
pub trait SelectionHandler: SelectionClearer {
    fn handle_selection(&self, data_point: &DataPoint, multi_select: bool);
}

/// Attach the standard click-to-select behavior to every mark.
///
/// A click with Ctrl (or Cmd) held is an additive selection; any other
/// click is a single selection.
pub fn register_standard_selection_handler(
    marks: &MarkSelection,
    selection_handler: Rc<dyn SelectionHandler>,
) {
    register_selection_handler_with(marks, selection_handler, MultiSelectModifier::default());
}

/// Like [`register_standard_selection_handler`] with a custom multi-select modifier.
pub fn register_selection_handler_with(
    marks: &MarkSelection,
    selection_handler: Rc<dyn SelectionHandler>,
    modifier: MultiSelectModifier,
) {
    marks.on_click(move |data_point, event| {
        let multi_select = modifier.is_multi_select(&event.modifiers);
        selection_handler.handle_selection(data_point, multi_select);
    });
}

struct Binding {
    marks: MarkSelection,
    clear_catcher: ClearSurface,
    behavior: Box<dyn InteractiveBehavior>,
}

/// Reference host service: selection state plus re-render on change.
///
/// Always handed out as `Rc<InteractivityService>`. The behavior and the mark
/// listeners only hold a [`ServiceRef`], so dropping the service releases
/// the whole binding.
pub struct InteractivityService {
    config: BehaviorConfig,
    self_ref: Weak<InteractivityService>,
    selected: RefCell<BTreeSet<SelectionId>>,
    binding: RefCell<Option<Binding>>,
    events: RefCell<Option<EventController>>,
}

impl InteractivityService {
    pub fn new(config: BehaviorConfig) -> Rc<Self> {
        Rc::new_cyclic(|self_ref| Self {
            config,
            self_ref: self_ref.clone(),
            selected: RefCell::new(BTreeSet::new()),
            binding: RefCell::new(None),
            events: RefCell::new(None),
        })
    }

    pub fn config(&self) -> &BehaviorConfig {
        &self.config
    }

    /// Publish selection changes to `ctrl`.
    pub fn attach_events(&self, ctrl: EventController) {
        *self.events.borrow_mut() = Some(ctrl);
    }

    /// Weak handle implementing the selection capabilities.
    pub fn handle(&self) -> ServiceRef {
        ServiceRef(self.self_ref.clone())
    }

    /// Bind a behavior to the marks and clear surface, then render once.
    ///
    /// Identities selected earlier stay selected if the new marks still
    /// contain them. Listeners of a previous binding are removed, so its
    /// marks and surface stop reaching this service.
    pub fn bind(
        &self,
        marks: MarkSelection,
        mut behavior: Box<dyn InteractiveBehavior>,
        clear_catcher: ClearSurface,
    ) -> Result<(), BehaviorError> {
        if let Some(previous) = self.binding.borrow_mut().take() {
            previous.marks.remove_click_listener();
            previous.clear_catcher.remove_click_listener();
        }

        let handle = self.handle();
        let options = BehaviorOptions {
            clear_catcher: clear_catcher.clone(),
            data_points: marks.clone(),
            interactivity: Rc::new(handle.clone()),
        };
        behavior.bind(options, Rc::new(handle));

        *self.binding.borrow_mut() = Some(Binding {
            marks,
            clear_catcher,
            behavior,
        });
        self.prune_selection();
        self.sync_selection_state();
        self.render_all()
    }

    /// Bind fresh data to the already bound marks and re-render.
    pub fn update_data(&self, data: Vec<DataPoint>) -> Result<(), BehaviorError> {
        if let Some(binding) = self.binding.borrow().as_ref() {
            binding.marks.join(data);
        } else {
            return Err(BehaviorError::NotBound);
        }
        self.prune_selection();
        self.sync_selection_state();
        self.render_all()
    }

    /// Identities currently selected, in sorted order.
    pub fn selected_ids(&self) -> Vec<SelectionId> {
        self.selected.borrow().iter().cloned().collect()
    }

    pub fn has_selection(&self) -> bool {
        !self.selected.borrow().is_empty()
    }

    pub fn has_highlights(&self) -> bool {
        self.binding
            .borrow()
            .as_ref()
            .map(|b| b.marks.data().iter().any(|d| d.highlight))
            .unwrap_or(false)
    }

    /// Apply a selection gesture on `data_point` and re-render.
    ///
    /// Points that are not part of the bound marks are ignored.
    pub fn handle_selection(&self, data_point: &DataPoint, multi_select: bool) {
        let is_bound = self
            .binding
            .borrow()
            .as_ref()
            .is_some_and(|b| b.marks.contains_identity(&data_point.identity));
        if !is_bound {
            tracing::debug!(identity = %data_point.identity, "ignoring selection of unbound point");
            return;
        }
        {
            let mut selected = self.selected.borrow_mut();
            let id = &data_point.identity;
            if multi_select {
                if !selected.remove(id) {
                    selected.insert(id.clone());
                }
            } else if selected.len() == 1 && selected.contains(id) {
                selected.clear();
            } else {
                selected.clear();
                selected.insert(id.clone());
            }
        }
        tracing::debug!(
            identity = %data_point.identity,
            multi_select,
            selected = self.selected.borrow().len(),
            "selection changed"
        );

        let mut kinds = EventKind::SELECTION_CHANGED;
        if !self.has_selection() {
            kinds |= EventKind::SELECTION_CLEARED;
        }
        self.sync_selection_state();
        self.emit_selection(kinds, multi_select);
        self.render_after_gesture();
    }

    /// Drop every selected identity and re-render.
    pub fn handle_clear_selection(&self) {
        self.selected.borrow_mut().clear();
        tracing::debug!("selection cleared");
        self.sync_selection_state();
        self.emit_selection(EventKind::SELECTION_CLEARED, false);
        self.render_after_gesture();
    }

    /// Ask the bound behavior to render the current state.
    pub fn render_all(&self) -> Result<(), BehaviorError> {
        let has_selection = self.has_selection();
        let binding = self.binding.borrow();
        let binding = binding.as_ref().ok_or(BehaviorError::NotBound)?;
        binding.behavior.render_selection(has_selection)?;

        if let Some(ctrl) = self.events.borrow().as_ref() {
            let mut evt = PlotEvent::new(EventKind::SELECTION_RENDERED);
            evt.render = Some(crate::events::RenderMeta {
                mark_count: binding.marks.len(),
                has_selection,
                has_highlights: binding.marks.data().iter().any(|d| d.highlight),
            });
            ctrl.emit(evt);
        }
        Ok(())
    }

    fn render_after_gesture(&self) {
        // Gestures arrive from event callbacks, which have no caller to report to.
        if let Err(e) = self.render_all() {
            tracing::error!("failed to render selection: {e}");
        }
    }

    fn prune_selection(&self) {
        let Some(marks) = self.binding.borrow().as_ref().map(|b| b.marks.clone()) else {
            return;
        };
        let present: HashSet<SelectionId> = marks.data().into_iter().map(|d| d.identity).collect();
        let mut selected = self.selected.borrow_mut();
        let before = selected.len();
        selected.retain(|id| present.contains(id));
        if selected.len() != before {
            tracing::debug!(
                dropped = before - selected.len(),
                "selected identities no longer bound"
            );
        }
    }

    fn sync_selection_state(&self) {
        let binding = self.binding.borrow();
        if let Some(binding) = binding.as_ref() {
            let selected = self.selected.borrow();
            binding
                .marks
                .update_data(|d| d.selected = selected.contains(&d.identity));
        }
    }

    fn emit_selection(&self, kinds: EventKind, multi_select: bool) {
        if let Some(ctrl) = self.events.borrow().as_ref() {
            let mut evt = PlotEvent::new(kinds);
            evt.selection = Some(SelectionMeta {
                selected: self.selected_ids(),
                multi_select,
            });
            ctrl.emit(evt);
        }
    }
}

impl SelectionQuery for InteractivityService {
    fn has_selection(&self) -> bool {
        InteractivityService::has_selection(self)
    }

    fn has_highlights(&self) -> bool {
        InteractivityService::has_highlights(self)
    }
}

impl SelectionClearer for InteractivityService {
    fn handle_clear_selection(&self) {
        InteractivityService::handle_clear_selection(self)
    }
}

impl SelectionHandler for InteractivityService {
    fn handle_selection(&self, data_point: &DataPoint, multi_select: bool) {
        InteractivityService::handle_selection(self, data_point, multi_select)
    }
}

/// Non-owning handle to an [`InteractivityService`].
///
/// Calls on a handle whose service was dropped are ignored.
#[derive(Clone)]
pub struct ServiceRef(Weak<InteractivityService>);

impl ServiceRef {
    fn service(&self) -> Option<Rc<InteractivityService>> {
        let service = self.0.upgrade();
        if service.is_none() {
            tracing::warn!("interactivity service dropped; ignoring call");
        }
        service
    }
}

impl SelectionQuery for ServiceRef {
    fn has_selection(&self) -> bool {
        self.service().is_some_and(|s| s.has_selection())
    }

    fn has_highlights(&self) -> bool {
        self.service().is_some_and(|s| s.has_highlights())
    }
}

impl SelectionClearer for ServiceRef {
    fn handle_clear_selection(&self) {
        if let Some(s) = self.service() {
            s.handle_clear_selection();
        }
    }
}

impl SelectionHandler for ServiceRef {
    fn handle_selection(&self, data_point: &DataPoint, multi_select: bool) {
        if let Some(s) = self.service() {
            s.handle_selection(data_point, multi_select);
        }
    }
}
