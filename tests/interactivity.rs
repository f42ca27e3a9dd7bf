use std::rc::Rc;

use scatter_select::events::KeyModifiers;
use scatter_select::{
    BehaviorConfig, ClearSurface, ClickEvent, DataPoint, EventController, EventFilter, EventKind,
    InteractivityService, MarkSelection, MultiSelectModifier, SelectionId, VisualBehavior,
};

fn setup(config: BehaviorConfig) -> (Rc<InteractivityService>, MarkSelection, ClearSurface) {
    let service = InteractivityService::new(config.clone());
    let marks = MarkSelection::new(vec![
        DataPoint::new("a", 0.0, 0.0),
        DataPoint::new("b", 1.0, 0.0),
        DataPoint::new("c", 2.0, 0.0),
    ]);
    let clear = ClearSurface::new();
    service
        .bind(
            marks.clone(),
            Box::new(VisualBehavior::with_config(&config)),
            clear.clone(),
        )
        .unwrap();
    (service, marks, clear)
}

fn ctrl_click() -> ClickEvent {
    ClickEvent::with_modifiers(KeyModifiers {
        ctrl: true,
        ..Default::default()
    })
}

#[test]
fn click_selects_and_dims_the_rest() {
    let (service, marks, _) = setup(BehaviorConfig::default());
    marks.dispatch_click(1, &ClickEvent::default());

    assert_eq!(service.selected_ids(), vec![SelectionId::from("b")]);
    assert_eq!(marks.opacities(), vec![0.4, 0.85, 0.4]);
}

#[test]
fn ctrl_click_adds_to_selection() {
    let (service, marks, _) = setup(BehaviorConfig::default());
    marks.dispatch_click(0, &ClickEvent::default());
    marks.dispatch_click(2, &ctrl_click());

    assert_eq!(service.selected_ids().len(), 2);
    assert_eq!(marks.opacities(), vec![0.85, 0.4, 0.85]);
}

#[test]
fn background_click_clears_regardless_of_state() {
    let (service, marks, clear) = setup(BehaviorConfig::default());
    clear.dispatch_click(&ClickEvent::default());
    assert!(!service.has_selection());

    marks.dispatch_click(0, &ClickEvent::default());
    marks.dispatch_click(1, &ctrl_click());
    clear.dispatch_click(&ClickEvent::default());

    assert!(!service.has_selection());
    assert!(marks.data().iter().all(|d| !d.selected));
    assert_eq!(marks.opacities(), vec![0.85, 0.85, 0.85]);
}

#[test]
fn configured_modifier_controls_multi_select() {
    let config = BehaviorConfig {
        multi_select: MultiSelectModifier::Shift,
        ..Default::default()
    };
    let (service, marks, _) = setup(config);
    marks.dispatch_click(0, &ClickEvent::default());
    // ctrl is not the configured modifier: replaces the selection
    marks.dispatch_click(1, &ctrl_click());
    assert_eq!(service.selected_ids(), vec![SelectionId::from("b")]);

    let shift = ClickEvent::with_modifiers(KeyModifiers {
        shift: true,
        ..Default::default()
    });
    marks.dispatch_click(2, &shift);
    assert_eq!(service.selected_ids().len(), 2);
}

#[test]
fn cross_filter_highlight_dims_unhighlighted_marks() {
    let (service, marks, _) = setup(BehaviorConfig::default());
    service
        .update_data(vec![
            DataPoint::new("a", 0.0, 0.0).with_highlight(true),
            DataPoint::new("b", 1.0, 0.0),
            DataPoint::new("c", 2.0, 0.0),
        ])
        .unwrap();
    assert_eq!(marks.opacities(), vec![0.85, 0.4, 0.4]);

    // selecting an unhighlighted mark keeps it at full opacity
    marks.dispatch_click(2, &ClickEvent::default());
    assert_eq!(marks.opacities(), vec![0.85, 0.4, 0.85]);
}

#[test]
fn selection_events_are_published() {
    let (service, marks, clear) = setup(BehaviorConfig::default());
    let ctrl = EventController::new();
    let rx = ctrl.subscribe(EventFilter::only(
        EventKind::SELECTION_CHANGED | EventKind::SELECTION_CLEARED,
    ));
    let renders = ctrl.subscribe(EventFilter::only(EventKind::SELECTION_RENDERED));
    service.attach_events(ctrl);

    marks.dispatch_click(0, &ClickEvent::default());
    let evt = rx.try_recv().unwrap();
    assert!(evt.kinds.contains(EventKind::SELECTION_CHANGED));
    assert_eq!(evt.selection.unwrap().selected, vec![SelectionId::from("a")]);

    clear.dispatch_click(&ClickEvent::default());
    let evt = rx.try_recv().unwrap();
    assert!(evt.kinds.contains(EventKind::SELECTION_CLEARED));
    assert!(evt.selection.unwrap().selected.is_empty());

    let render = renders.try_recv().unwrap().render.unwrap();
    assert_eq!(render.mark_count, 3);
    assert!(render.has_selection);
    assert_eq!(renders.try_iter().count(), 1);
}
