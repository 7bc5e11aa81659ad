//! Editor configuration.
//!
//! Hosts pass a (possibly partial) JSON object; every missing key takes its
//! default.

use crate::error::{EditorError, EditorResult};
use crate::viewport::Breakpoint;
use pb_core::TreeOptions;
use serde::{Deserialize, Serialize};

/// Configuration for a `BuilderStore`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Maximum number of snapshots kept in history (the initial document
    /// counts as one). `0` keeps everything. Default: **200**.
    pub history_limit: usize,

    /// Reject out-of-range child indices instead of clamping them.
    /// Meant for tests and debug builds. Default: **false**.
    pub strict_indices: bool,

    pub zoom_min: f32,
    pub zoom_max: f32,
    /// Multiplicative zoom step for zoom in/out. Default: **1.25**.
    pub zoom_step: f32,

    pub default_breakpoint: Breakpoint,
    pub show_grid: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_limit: 200,
            strict_indices: false,
            zoom_min: 0.25,
            zoom_max: 4.0,
            zoom_step: 1.25,
            default_breakpoint: Breakpoint::Desktop,
            show_grid: false,
        }
    }
}

impl EditorConfig {
    /// Parse a JSON config object. Unknown keys are ignored.
    pub fn from_json(json: &str) -> EditorResult<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| EditorError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> EditorResult<()> {
        if !(self.zoom_min > 0.0 && self.zoom_min <= self.zoom_max) {
            return Err(EditorError::Config(format!(
                "zoom range {}..{} is empty",
                self.zoom_min, self.zoom_max
            )));
        }
        if self.zoom_step <= 1.0 {
            return Err(EditorError::Config(format!(
                "zoom_step must be greater than 1, got {}",
                self.zoom_step
            )));
        }
        Ok(())
    }

    pub fn tree_options(&self) -> TreeOptions {
        TreeOptions {
            strict_indices: self.strict_indices,
        }
    }
}
