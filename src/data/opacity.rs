//! Opacity policy for selected / highlighted marks.

use serde::{Deserialize, Serialize};

/// Opacity of a mark that is emphasized or unaffected by selection.
pub const DEFAULT_OPACITY: f32 = 0.85;
/// Opacity of a mark that is de-emphasized by a selection or highlight elsewhere.
pub const DIMMED_OPACITY: f32 = 0.4;

/// The two opacity levels a mark can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opacity {
    Full,
    Dimmed,
}

impl Opacity {
    /// Numeric opacity using the built-in levels.
    pub const fn value(self) -> f32 {
        match self {
            Opacity::Full => DEFAULT_OPACITY,
            Opacity::Dimmed => DIMMED_OPACITY,
        }
    }
}

/// Resolve the opacity level of a single mark.
///
/// The mark is dimmed when some marks are partially highlighted and this one
/// is not highlighted, or when a selection exists and this mark is not part
/// of it. Otherwise it is drawn at full opacity.
pub fn resolve_opacity(
    selected: bool,
    highlight: bool,
    has_selection: bool,
    has_partial_highlights: bool,
) -> Opacity {
    if (has_partial_highlights && !highlight) || (has_selection && !selected) {
        return Opacity::Dimmed;
    }
    Opacity::Full
}

/// Numeric values for the two opacity levels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpacityLevels {
    pub full: f32,
    pub dimmed: f32,
}

impl Default for OpacityLevels {
    fn default() -> Self {
        Self {
            full: DEFAULT_OPACITY,
            dimmed: DIMMED_OPACITY,
        }
    }
}

impl OpacityLevels {
    pub fn value(&self, opacity: Opacity) -> f32 {
        match opacity {
            Opacity::Full => self.full,
            Opacity::Dimmed => self.dimmed,
        }
    }
}
