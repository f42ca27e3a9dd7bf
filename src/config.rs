//! Configuration for the selection layer.
//!
//! [`BehaviorConfig`] can be built in code or parsed from YAML/JSON text.
//! Every field has a default, so a config document only needs the keys it
//! overrides:
//!
//! ```yaml
//! opacity:
//!   full: 0.9
//!   dimmed: 0.3
//! multi_select: shift
//! hit_radius: 8.0
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::data::opacity::OpacityLevels;
use crate::events::KeyModifiers;

/// Errors raised while loading or validating a [`BehaviorConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid YAML config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid JSON config: {0}")]
    Json(#[from] serde_json::Error),

    /// An opacity level lies outside `0.0..=1.0`.
    #[error("{level} opacity {value} is outside 0.0..=1.0")]
    OpacityOutOfRange { level: &'static str, value: f32 },

    /// The dimmed level would be more opaque than the full level.
    #[error("dimmed opacity {dimmed} exceeds full opacity {full}")]
    InvertedOpacity { full: f32, dimmed: f32 },

    #[error("hit radius {0} must be a positive finite number of pixels")]
    InvalidHitRadius(f32),
}

/// Which modifier turns a mark click into an additive (multi-select) click.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MultiSelectModifier {
    /// Ctrl, or Cmd on macOS.
    #[default]
    CtrlOrCommand,
    Ctrl,
    Shift,
    /// Every click replaces the selection.
    Disabled,
}

impl MultiSelectModifier {
    pub fn is_multi_select(self, modifiers: &KeyModifiers) -> bool {
        match self {
            MultiSelectModifier::CtrlOrCommand => modifiers.ctrl || modifiers.command,
            MultiSelectModifier::Ctrl => modifiers.ctrl,
            MultiSelectModifier::Shift => modifiers.shift,
            MultiSelectModifier::Disabled => false,
        }
    }
}

/// Settings shared by the behavior, the host service and the plot adapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviorConfig {
    /// Opacity values for emphasized and dimmed marks.
    pub opacity: OpacityLevels,
    pub multi_select: MultiSelectModifier,
    /// Maximum screen distance (px) between a click and a mark for the click
    /// to count as a mark click rather than a background click.
    pub hit_radius: f32,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            opacity: OpacityLevels::default(),
            multi_select: MultiSelectModifier::default(),
            hit_radius: 6.0,
        }
    }
}

impl BehaviorConfig {
    /// Parse and validate a YAML document.
    pub fn from_yaml_str(s: &str) -> Result<Self, ConfigError> {
        let cfg: BehaviorConfig = serde_yaml::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parse and validate a JSON document.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let cfg: BehaviorConfig = serde_json::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn to_yaml_string(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let OpacityLevels { full, dimmed } = self.opacity;
        for (level, value) in [("full", full), ("dimmed", dimmed)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::OpacityOutOfRange { level, value });
            }
        }
        if dimmed > full {
            return Err(ConfigError::InvertedOpacity { full, dimmed });
        }
        if !self.hit_radius.is_finite() || self.hit_radius <= 0.0 {
            return Err(ConfigError::InvalidHitRadius(self.hit_radius));
        }
        Ok(())
    }
}
