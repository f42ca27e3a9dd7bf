//! Selection/highlight behavior of the scatter layer.
//!
//! [`VisualBehavior`] wires clicks on marks and on the clear surface to a
//! host [`SelectionHandler`], and renders the resulting selection state as
//! per-mark opacity. It keeps no state besides the options retained by
//! [`bind`](InteractiveBehavior::bind); every render recomputes all marks.

use std::rc::Rc;

use thiserror::Error;

use crate::config::{BehaviorConfig, MultiSelectModifier};
use crate::data::opacity::{resolve_opacity, OpacityLevels};
use crate::interactivity::{register_selection_handler_with, SelectionHandler, SelectionQuery};
use crate::marks::{ClearSurface, MarkSelection};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BehaviorError {
    /// `render_selection` was called before `bind`.
    #[error("behavior is not bound: bind must be called before render_selection")]
    NotBound,
}

/// Handles passed to the behavior at bind time.
#[derive(Clone)]
pub struct BehaviorOptions {
    /// Background region whose click clears the selection.
    pub clear_catcher: ClearSurface,
    /// Rendered data-point marks.
    pub data_points: MarkSelection,
    /// Host service queried for highlight state during render.
    pub interactivity: Rc<dyn SelectionQuery>,
}

impl std::fmt::Debug for BehaviorOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BehaviorOptions")
            .field("clear_catcher", &self.clear_catcher)
            .field("data_points", &self.data_points)
            .finish_non_exhaustive()
    }
}

/// Contract between a host interactivity service and a layer behavior.
pub trait InteractiveBehavior {
    /// Attach click handling to the marks and clear surface in `options`.
    fn bind(&mut self, options: BehaviorOptions, selection_handler: Rc<dyn SelectionHandler>);

    /// Apply the current selection/highlight state to the marks.
    fn render_selection(&self, has_selection: bool) -> Result<(), BehaviorError>;
}

#[derive(Debug, Default)]
pub struct VisualBehavior {
    options: Option<BehaviorOptions>,
    levels: OpacityLevels,
    multi_select: MultiSelectModifier,
}

impl VisualBehavior {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: &BehaviorConfig) -> Self {
        Self {
            options: None,
            levels: config.opacity,
            multi_select: config.multi_select,
        }
    }

    /// Options retained by the last `bind`.
    pub fn options(&self) -> Option<&BehaviorOptions> {
        self.options.as_ref()
    }

    pub fn is_bound(&self) -> bool {
        self.options.is_some()
    }

    pub fn levels(&self) -> OpacityLevels {
        self.levels
    }
}

impl InteractiveBehavior for VisualBehavior {
    fn bind(&mut self, options: BehaviorOptions, selection_handler: Rc<dyn SelectionHandler>) {
        register_selection_handler_with(
            &options.data_points,
            Rc::clone(&selection_handler),
            self.multi_select,
        );

        options.clear_catcher.on_click(move |_| {
            selection_handler.handle_clear_selection();
        });

        tracing::debug!(marks = options.data_points.len(), "selection behavior bound");
        self.options = Some(options);
    }

    fn render_selection(&self, has_selection: bool) -> Result<(), BehaviorError> {
        let options = self.options.as_ref().ok_or(BehaviorError::NotBound)?;
        let has_highlights = options.interactivity.has_highlights();
        let levels = self.levels;

        options.data_points.style_opacity(|d| {
            let opacity = resolve_opacity(
                d.selected,
                d.highlight,
                has_selection && !d.highlight,
                has_highlights && !d.selected,
            );
            levels.value(opacity)
        });

        tracing::debug!(
            marks = options.data_points.len(),
            has_selection,
            has_highlights,
            "selection rendered"
        );
        Ok(())
    }
}
