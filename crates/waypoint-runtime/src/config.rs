#![forbid(unsafe_code)]

//! Tours as data.
//!
//! A [`TourConfig`] holds everything needed to set up a tour: user
//! defaults, per-initialize defaults, the steps, and the hotkey switch. With
//! the `config` feature it loads from TOML or JSON.
//!
//! ```toml
//! hotkeys = true
//!
//! [defaults]
//! enable_backdrop = true
//!
//! [[steps]]
//! anchor_id = "nav"
//! title = "Navigation"
//!
//! [[steps]]
//! anchor_id = "settings"
//! route = "/settings"
//! is_optional = true
//! delay_before_step_show = 150
//! ```
//!
//! Durations are written in milliseconds.

#[cfg(feature = "config")]
use std::path::Path;

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};

use ahash::AHashSet;

use crate::error::TourError;
use crate::service::TourService;
use crate::step::{Step, StepOption, StepRef};

/// A complete tour definition.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct TourConfig {
    /// Applied with `set_defaults`, under every initialize.
    pub defaults: Option<StepOption>,
    /// Passed to `initialize` alongside the steps.
    pub step_defaults: Option<StepOption>,
    pub steps: Vec<StepOption>,
    /// Whether tour hotkeys start enabled.
    pub hotkeys: bool,
}

impl Default for TourConfig {
    fn default() -> Self {
        Self {
            defaults: None,
            step_defaults: None,
            steps: Vec::new(),
            hotkeys: true,
        }
    }
}

impl TourConfig {
    /// Load from a TOML string.
    #[cfg(feature = "config")]
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(ConfigError::Toml)
    }

    /// Load from a TOML file.
    #[cfg(feature = "config")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    #[cfg(feature = "config")]
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(s).map_err(ConfigError::Json)
    }

    /// Load from a JSON file.
    #[cfg(feature = "config")]
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_json_str(&content)
    }

    /// The steps as `initialize` would resolve them.
    pub fn resolved_steps(&self) -> Vec<Step> {
        let layers = [self.defaults.as_ref(), self.step_defaults.as_ref()];
        self.steps
            .iter()
            .map(|option| Step::resolve(&option.layered(&layers)))
            .collect()
    }

    /// Check the tour is well formed.
    ///
    /// Returns a list of problems. An empty list means the config is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.steps.is_empty() {
            errors.push("steps must not be empty".into());
        }

        let steps = self.resolved_steps();
        let mut ids = AHashSet::new();
        for (i, step) in steps.iter().enumerate() {
            if let Err(err) = step.validate() {
                errors.push(format!("steps[{i}]: {err}"));
            }
            if let Some(id) = &step.step_id {
                if !ids.insert(id.as_str()) {
                    errors.push(format!("steps[{i}]: duplicate step_id \"{id}\""));
                }
            }
        }

        let resolvable = |target: &StepRef| match target {
            StepRef::Index(index) => *index < steps.len(),
            StepRef::Id(id) => steps.iter().any(|s| s.step_id.as_deref() == Some(id.as_str())),
        };
        for (i, step) in steps.iter().enumerate() {
            for (field, target) in [("next_step", &step.next_step), ("prev_step", &step.prev_step)] {
                if let Some(target) = target {
                    if !resolvable(target) {
                        errors.push(format!("steps[{i}].{field}: no step {target}"));
                    }
                }
            }
        }
        errors
    }

    /// Configure `tour` and initialize it with these steps.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Validation`] when [`validate`](Self::validate) reports
    /// problems; nothing is applied in that case.
    pub fn apply(&self, tour: &mut TourService) -> Result<(), ConfigError> {
        let errors = self.validate();
        if !errors.is_empty() {
            return Err(ConfigError::Validation(errors));
        }
        if let Some(defaults) = &self.defaults {
            tour.set_defaults(defaults.clone());
        }
        if self.hotkeys {
            tour.enable_hotkeys();
        } else {
            tour.disable_hotkeys();
        }
        tour.initialize(&self.steps, self.step_defaults.as_ref())
            .map_err(ConfigError::Tour)
    }
}

/// Errors that can occur when loading or applying a tour configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// I/O error reading a file.
    Io(std::io::Error),
    /// TOML parse error.
    #[cfg(feature = "config")]
    Toml(toml::de::Error),
    /// JSON parse error.
    #[cfg(feature = "config")]
    Json(serde_json::Error),
    /// Validation errors.
    Validation(Vec<String>),
    /// The service rejected the steps.
    Tour(TourError),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            #[cfg(feature = "config")]
            Self::Toml(e) => write!(f, "TOML parse error: {e}"),
            #[cfg(feature = "config")]
            Self::Json(e) => write!(f, "JSON parse error: {e}"),
            Self::Validation(errors) => {
                write!(f, "validation errors: {}", errors.join("; "))
            }
            Self::Tour(e) => write!(f, "tour error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            #[cfg(feature = "config")]
            Self::Toml(e) => Some(e),
            #[cfg(feature = "config")]
            Self::Json(e) => Some(e),
            Self::Validation(_) => None,
            Self::Tour(e) => Some(e),
        }
    }
}
