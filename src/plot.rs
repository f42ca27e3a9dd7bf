//! egui_plot adapter for the scatter layer.
//!
//! [`ScatterLayer`] draws the marks with their current opacity style and
//! turns plot clicks into mark clicks or clear-surface clicks.

use std::collections::BTreeMap;

use egui::{Color32, Pos2};
use egui_plot::{MarkerShape, PlotPoint, Points};

use crate::config::BehaviorConfig;
use crate::events::{ClickMeta, EventController, EventKind, KeyModifiers, PlotEvent, PlotPos};
use crate::marks::{ClearSurface, ClickEvent, MarkSelection};

/// Visual presentation of the marks (before opacity is applied).
#[derive(Debug, Clone, Copy)]
pub struct MarkLook {
    pub color: Color32,
    pub radius: f32,
    pub shape: MarkerShape,
}

impl Default for MarkLook {
    fn default() -> Self {
        Self {
            color: Color32::from_rgb(31, 119, 180),
            radius: 4.0,
            shape: MarkerShape::Circle,
        }
    }
}

/// Where a plot click was delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickTarget {
    Mark(usize),
    ClearSurface,
    /// Nothing was listening.
    Unhandled,
}

/// Index of the mark closest to `pos`, if it lies within `radius` (screen px).
pub fn nearest_mark(mark_positions: &[Pos2], pos: Pos2, radius: f32) -> Option<usize> {
    let max_d2 = radius * radius;
    let mut best: Option<(usize, f32)> = None;
    for (i, p) in mark_positions.iter().enumerate() {
        let d2 = p.distance_sq(pos);
        // also skips NaN distances from marks with missing coordinates
        if !(d2 <= max_d2) {
            continue;
        }
        if best.map_or(true, |(_, best_d2)| d2 < best_d2) {
            best = Some((i, d2));
        }
    }
    best.map(|(i, _)| i)
}

pub struct ScatterLayer {
    name: String,
    marks: MarkSelection,
    clear_catcher: ClearSurface,
    look: MarkLook,
    hit_radius: f32,
    events: Option<EventController>,
}

impl ScatterLayer {
    pub fn new(marks: MarkSelection, clear_catcher: ClearSurface) -> Self {
        Self {
            name: String::new(),
            marks,
            clear_catcher,
            look: MarkLook::default(),
            hit_radius: BehaviorConfig::default().hit_radius,
            events: None,
        }
    }

    pub fn with_config(mut self, config: &BehaviorConfig) -> Self {
        self.hit_radius = config.hit_radius;
        self
    }

    /// Legend name of the layer.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_look(mut self, look: MarkLook) -> Self {
        self.look = look;
        self
    }

    pub fn with_hit_radius(mut self, hit_radius: f32) -> Self {
        self.hit_radius = hit_radius;
        self
    }

    pub fn with_events(mut self, ctrl: EventController) -> Self {
        self.events = Some(ctrl);
        self
    }

    pub fn marks(&self) -> &MarkSelection {
        &self.marks
    }

    pub fn clear_catcher(&self) -> &ClearSurface {
        &self.clear_catcher
    }

    /// Color of a mark drawn at `opacity`.
    pub fn mark_color(&self, opacity: f32) -> Color32 {
        self.look.color.gamma_multiply(opacity)
    }

    /// Draw all marks, one point series per distinct opacity.
    pub fn draw(&self, plot_ui: &mut egui_plot::PlotUi) {
        let mut by_opacity: BTreeMap<u32, Vec<[f64; 2]>> = BTreeMap::new();
        for (datum, opacity) in self.marks.data().iter().zip(self.marks.opacities()) {
            by_opacity
                .entry(opacity.to_bits())
                .or_default()
                .push(datum.position());
        }
        for (bits, positions) in by_opacity {
            let points = Points::new(self.name.as_str(), positions)
                .radius(self.look.radius)
                .shape(self.look.shape)
                .color(self.mark_color(f32::from_bits(bits)));
            plot_ui.points(points);
        }
    }

    /// Route a click on the plot to the nearest mark or to the clear surface.
    pub fn handle_plot_click<R>(
        &self,
        plot_response: &egui_plot::PlotResponse<R>,
        modifiers: egui::Modifiers,
    ) -> Option<ClickTarget> {
        if !plot_response.response.clicked() {
            return None;
        }
        let screen_pos = plot_response.response.interact_pointer_pos()?;
        let transform = &plot_response.transform;
        let positions: Vec<Pos2> = self
            .marks
            .data()
            .iter()
            .map(|d| transform.position_from_point(&PlotPoint::new(d.x, d.y)))
            .collect();
        let hit = nearest_mark(&positions, screen_pos, self.hit_radius);
        let value = transform.value_from_position(screen_pos);
        let event = ClickEvent {
            modifiers: KeyModifiers::from(modifiers),
            plot_pos: Some(PlotPos {
                x: value.x,
                y: value.y,
            }),
        };
        Some(self.route_click(hit, &event))
    }

    /// Deliver a click that hit mark `hit`, or the background when `None`.
    pub fn route_click(&self, hit: Option<usize>, event: &ClickEvent) -> ClickTarget {
        let (delivered, target) = match hit {
            Some(index) => (self.marks.dispatch_click(index, event), ClickTarget::Mark(index)),
            None => (self.clear_catcher.dispatch_click(event), ClickTarget::ClearSurface),
        };
        if !delivered {
            tracing::debug!(?target, "plot click had no listener");
            return ClickTarget::Unhandled;
        }

        if let Some(ctrl) = &self.events {
            let kind = match target {
                ClickTarget::Mark(_) => EventKind::MARK_CLICK,
                _ => EventKind::CLEAR_CLICK,
            };
            let mut evt = PlotEvent::new(kind);
            evt.click = Some(ClickMeta {
                mark_index: hit,
                identity: hit.and_then(|i| self.marks.datum(i)).map(|d| d.identity),
                plot_pos: event.plot_pos,
                modifiers: event.modifiers,
            });
            ctrl.emit(evt);
        }
        target
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::data_point::DataPoint;
    use crate::events::EventFilter;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn nearest_mark_respects_radius() {
        let positions = [Pos2::new(0.0, 0.0), Pos2::new(10.0, 0.0), Pos2::new(13.0, 0.0)];
        assert_eq!(nearest_mark(&positions, Pos2::new(12.0, 0.0), 5.0), Some(2));
        assert_eq!(nearest_mark(&positions, Pos2::new(1.0, 1.0), 5.0), Some(0));
        assert_eq!(nearest_mark(&positions, Pos2::new(50.0, 50.0), 5.0), None);
        assert_eq!(nearest_mark(&[], Pos2::ZERO, 5.0), None);
    }

    #[test]
    fn nearest_mark_ignores_non_finite_positions() {
        let positions = [Pos2::new(f32::NAN, f32::NAN), Pos2::new(10.0, 0.0)];
        assert_eq!(nearest_mark(&positions, Pos2::new(10.0, 0.0), 5.0), Some(1));
        assert_eq!(nearest_mark(&positions, Pos2::new(500.0, 500.0), 5.0), None);
    }

    #[test]
    fn mark_color_scales_alpha() {
        let layer = ScatterLayer::new(MarkSelection::default(), ClearSurface::new()).with_look(
            MarkLook {
                color: Color32::WHITE,
                ..Default::default()
            },
        );
        assert_eq!(layer.mark_color(1.0), Color32::WHITE);
        assert!(layer.mark_color(0.4).a() < layer.mark_color(0.85).a());
    }

    #[test]
    fn route_click_without_listeners_is_unhandled() {
        let layer = ScatterLayer::new(
            MarkSelection::new(vec![DataPoint::new("a", 0.0, 0.0)]),
            ClearSurface::new(),
        );
        assert_eq!(layer.route_click(Some(0), &ClickEvent::default()), ClickTarget::Unhandled);
        assert_eq!(layer.route_click(None, &ClickEvent::default()), ClickTarget::Unhandled);
    }

    #[test]
    fn route_click_emits_events() {
        let marks = MarkSelection::new(vec![DataPoint::new("a", 0.0, 0.0)]);
        let clear = ClearSurface::new();
        let mark_hits = Rc::new(Cell::new(0));
        let h = mark_hits.clone();
        marks.on_click(move |_, _| h.set(h.get() + 1));
        clear.on_click(|_| {});

        let ctrl = EventController::new();
        let rx = ctrl.subscribe(EventFilter::only(EventKind::MARK_CLICK | EventKind::CLEAR_CLICK));
        let layer = ScatterLayer::new(marks, clear).with_events(ctrl);

        assert_eq!(layer.route_click(Some(0), &ClickEvent::default()), ClickTarget::Mark(0));
        assert_eq!(layer.route_click(None, &ClickEvent::default()), ClickTarget::ClearSurface);
        assert_eq!(mark_hits.get(), 1);

        let first = rx.try_recv().unwrap();
        assert!(first.kinds.contains(EventKind::MARK_CLICK));
        let meta = first.click.unwrap();
        assert_eq!(meta.mark_index, Some(0));
        assert_eq!(meta.identity.map(|id| id.0), Some("a".to_string()));
        let second = rx.try_recv().unwrap();
        assert!(second.kinds.contains(EventKind::CLEAR_CLICK));
        assert_eq!(second.click.unwrap().mark_index, None);
    }
}
