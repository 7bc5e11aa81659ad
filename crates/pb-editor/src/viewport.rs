//! Canvas viewport state: zoom, breakpoint, grid overlay.
//!
//! Drives rendering only. Nothing here touches the document or history.

use crate::config::EditorConfig;
use serde::{Deserialize, Serialize};

/// Canvas width presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Breakpoint {
    #[default]
    Desktop,
    Tablet,
    Mobile,
}

impl Breakpoint {
    pub const ALL: [Breakpoint; 3] = [Self::Desktop, Self::Tablet, Self::Mobile];

    /// Canvas width in CSS pixels.
    pub fn width(self) -> u32 {
        match self {
            Self::Desktop => 1280,
            Self::Tablet => 768,
            Self::Mobile => 375,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Desktop => "desktop",
            Self::Tablet => "tablet",
            Self::Mobile => "mobile",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Viewport {
    pub zoom: f32,
    pub breakpoint: Breakpoint,
    pub show_grid: bool,
    #[serde(skip)]
    limits: ZoomLimits,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct ZoomLimits {
    min: f32,
    max: f32,
    step: f32,
}

impl Default for ZoomLimits {
    fn default() -> Self {
        let config = EditorConfig::default();
        Self {
            min: config.zoom_min,
            max: config.zoom_max,
            step: config.zoom_step,
        }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::from_config(&EditorConfig::default())
    }
}

impl Viewport {
    pub fn from_config(config: &EditorConfig) -> Self {
        Self {
            zoom: 1.0_f32.clamp(config.zoom_min, config.zoom_max),
            breakpoint: config.default_breakpoint,
            show_grid: config.show_grid,
            limits: ZoomLimits {
                min: config.zoom_min,
                max: config.zoom_max,
                step: config.zoom_step,
            },
        }
    }

    /// Set zoom, clamped to the configured range. Returns whether it changed.
    pub fn set_zoom(&mut self, zoom: f32) -> bool {
        let zoom = if zoom.is_finite() {
            zoom.clamp(self.limits.min, self.limits.max)
        } else {
            self.zoom
        };
        if (zoom - self.zoom).abs() < f32::EPSILON {
            return false;
        }
        self.zoom = zoom;
        true
    }

    pub fn zoom_in(&mut self) -> bool {
        self.set_zoom(self.zoom * self.limits.step)
    }

    pub fn zoom_out(&mut self) -> bool {
        self.set_zoom(self.zoom / self.limits.step)
    }

    pub fn reset_zoom(&mut self) -> bool {
        self.set_zoom(1.0)
    }

    pub fn set_breakpoint(&mut self, breakpoint: Breakpoint) -> bool {
        if self.breakpoint == breakpoint {
            return false;
        }
        self.breakpoint = breakpoint;
        true
    }

    pub fn toggle_grid(&mut self) {
        self.show_grid = !self.show_grid;
    }

    /// Canvas width at the current zoom, in screen pixels.
    pub fn canvas_width(&self) -> f32 {
        self.breakpoint.width() as f32 * self.zoom
    }
}
