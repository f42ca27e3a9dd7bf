//! DataPoint: one selectable mark of the scatter layer.

use serde::{Deserialize, Serialize};

/// Stable identity of a data point across data updates.
///
/// Selection is tracked per identity, so a point keeps its selected state
/// when the host rebinds fresh data containing the same identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SelectionId(pub String);

impl From<&str> for SelectionId {
    fn from(s: &str) -> Self {
        SelectionId(s.to_string())
    }
}

impl From<String> for SelectionId {
    fn from(s: String) -> Self {
        SelectionId(s)
    }
}

impl std::fmt::Display for SelectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A rendered data point.
///
/// `selected` and `highlight` are written by the data-binding stage and the
/// host selection service; the behavior only reads them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    pub identity: SelectionId,
    pub x: f64,
    pub y: f64,
    /// The user explicitly selected this point.
    #[serde(default)]
    pub selected: bool,
    /// The point belongs to the currently highlighted subset (cross-filter).
    #[serde(default)]
    pub highlight: bool,
}

impl DataPoint {
    /// Create an unselected, unhighlighted point.
    pub fn new(identity: impl Into<SelectionId>, x: f64, y: f64) -> Self {
        Self {
            identity: identity.into(),
            x,
            y,
            selected: false,
            highlight: false,
        }
    }

    /// Builder-style setter for the selected flag.
    pub fn with_selected(mut self, selected: bool) -> Self {
        self.selected = selected;
        self
    }

    /// Builder-style setter for the highlight flag.
    pub fn with_highlight(mut self, highlight: bool) -> Self {
        self.highlight = highlight;
        self
    }

    pub fn position(&self) -> [f64; 2] {
        [self.x, self.y]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_point_is_unselected_and_unhighlighted() {
        let p = DataPoint::new("a", 1.0, 2.0);
        assert!(!p.selected);
        assert!(!p.highlight);
        assert_eq!(p.position(), [1.0, 2.0]);
        assert_eq!(p.identity, SelectionId("a".into()));
    }

    #[test]
    fn flags_default_when_missing_in_json() {
        let p: DataPoint =
            serde_json::from_str(r#"{"identity":"p1","x":0.5,"y":-1.0}"#).unwrap();
        assert!(!p.selected);
        assert!(!p.highlight);
        assert_eq!(p.identity.to_string(), "p1");
    }
}
