//! scatter-select crate root: re-exports and module wiring.
//!
//! This crate provides the selection/highlight behavior for one layer of
//! data-point marks in a scatter chart:
//! - `data`: data points and the opacity policy
//! - `marks`: mark collection and clear-surface handles (event hooks + style)
//! - `interactivity`: capability traits for the host selection service, plus a
//!   reference in-process service
//! - `behavior`: binds click events and renders selection as mark opacity
//! - `events`: observable event stream for clicks and selection changes
//! - `config`: opacity levels and interaction settings (YAML/JSON)
//! - `plot`: egui_plot adapter that draws marks and routes plot clicks

pub mod behavior;
pub mod config;
pub mod data;
pub mod events;
pub mod interactivity;
pub mod marks;
pub mod plot;

// Public re-exports for a compact external API
pub use behavior::{BehaviorError, BehaviorOptions, InteractiveBehavior, VisualBehavior};
pub use config::{BehaviorConfig, ConfigError, MultiSelectModifier};
pub use data::data_point::{DataPoint, SelectionId};
pub use data::opacity::{resolve_opacity, Opacity, OpacityLevels, DEFAULT_OPACITY, DIMMED_OPACITY};
pub use events::{EventController, EventFilter, EventKind, PlotEvent};
pub use interactivity::{
    register_standard_selection_handler, InteractivityService, SelectionClearer, SelectionHandler,
    SelectionQuery, ServiceRef,
};
pub use marks::{ClearSurface, ClickEvent, MarkSelection};
pub use plot::{ClickTarget, MarkLook, ScatterLayer};
