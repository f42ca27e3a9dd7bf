//! Example: Clickable scatter layer with selection and cross-filter highlight
//!
//! What it demonstrates
//! - Binding a `VisualBehavior` to a mark collection through `InteractivityService`.
//! - Drawing the marks with `ScatterLayer` and routing plot clicks to marks or the background.
//! - Simulating a cross-filter highlight by rebinding data with `highlight` flags.
//!
//! How to run
//! ```bash
//! RUST_LOG=scatter_select=debug cargo run --example scatter
//! ```
//! Click a point to select it, Ctrl+click to add to the selection, click empty
//! space to clear.

use std::rc::Rc;

use egui_plot::Plot;
use scatter_select::{
    BehaviorConfig, ClearSurface, DataPoint, EventController, EventFilter, EventKind,
    InteractivityService, MarkSelection, PlotEvent, ScatterLayer, VisualBehavior,
};
use tracing_subscriber::EnvFilter;

fn sample_points() -> Vec<DataPoint> {
    (0..40)
        .map(|i| {
            let x = i as f64 * 0.25;
            let y = (x * 1.3).sin() * 2.0 + (i % 7) as f64 * 0.3;
            DataPoint::new(format!("pt-{i}"), x, y)
        })
        .collect()
}

struct ScatterApp {
    service: Rc<InteractivityService>,
    layer: ScatterLayer,
    events: std::sync::mpsc::Receiver<PlotEvent>,
    highlight_upper: bool,
    last_event: String,
}

impl ScatterApp {
    fn new(config: BehaviorConfig) -> Result<Self, scatter_select::BehaviorError> {
        let ctrl = EventController::new();
        let events = ctrl.subscribe(EventFilter::only(
            EventKind::MARK_CLICK | EventKind::CLEAR_CLICK | EventKind::SELECTION_CHANGED,
        ));

        let marks = MarkSelection::new(sample_points());
        let clear = ClearSurface::new();
        let service = InteractivityService::new(config.clone());
        service.attach_events(ctrl.clone());
        service.bind(
            marks.clone(),
            Box::new(VisualBehavior::with_config(&config)),
            clear.clone(),
        )?;

        let layer = ScatterLayer::new(marks, clear)
            .with_config(&config)
            .with_name("points")
            .with_events(ctrl);

        Ok(Self {
            service,
            layer,
            events,
            highlight_upper: false,
            last_event: String::new(),
        })
    }

    fn apply_highlight(&mut self) {
        let highlight = self.highlight_upper;
        let data = self
            .layer
            .marks()
            .data()
            .into_iter()
            .map(|d| {
                let upper = d.y > 1.0;
                d.with_highlight(highlight && upper)
            })
            .collect();
        if let Err(e) = self.service.update_data(data) {
            tracing::error!("failed to rebind data: {e}");
        }
    }
}

impl eframe::App for ScatterApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::TopBottomPanel::top("controls").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui
                    .checkbox(&mut self.highlight_upper, "Highlight y > 1 (cross-filter)")
                    .changed()
                {
                    self.apply_highlight();
                }
                ui.separator();
                ui.label(format!("{} selected", self.service.selected_ids().len()));
                ui.separator();
                ui.label(&self.last_event);
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            let modifiers = ui.input(|i| i.modifiers);
            let resp = Plot::new("scatter")
                .allow_drag(false)
                .show(ui, |plot_ui| self.layer.draw(plot_ui));
            self.layer.handle_plot_click(&resp, modifiers);
        });

        while let Ok(evt) = self.events.try_recv() {
            self.last_event = format!("{:.2}s {}", evt.timestamp, evt.kinds);
        }
    }
}

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let app = match ScatterApp::new(BehaviorConfig::default()) {
        Ok(app) => app,
        Err(e) => {
            eprintln!("failed to bind scatter layer: {e}");
            std::process::exit(1);
        }
    };
    eframe::run_native(
        "scatter-select",
        eframe::NativeOptions::default(),
        Box::new(|_cc| Ok(Box::new(app))),
    )
}
