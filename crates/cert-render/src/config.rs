//! Engine configuration

use crate::{RenderError, Result};
use cert_template::RenderContext;
use serde::{Deserialize, Serialize};
use std::time::Duration;

fn default_raster_multiplier() -> f64 {
    2.0
}

fn default_debounce_ms() -> u64 {
    300
}

fn default_filename_template() -> String {
    "certificate-{{index}}".to_string()
}

fn default_file_extension() -> String {
    "pdf".to_string()
}

fn default_preview_zoom() -> f64 {
    1.0
}

/// Engine-wide settings
///
/// Every field has a default, so `{}` is a valid configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineConfig {
    /// Output quality factor for snapshots
    #[serde(default = "default_raster_multiplier")]
    pub raster_multiplier: f64,

    /// Edit coalescing interval in milliseconds
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Batch filename template (`{{field}}` and `{{index}}`)
    #[serde(default = "default_filename_template")]
    pub filename_template: String,

    /// Extension appended to batch filenames when missing
    #[serde(default = "default_file_extension")]
    pub file_extension: String,

    /// Display zoom used for previews
    #[serde(default = "default_preview_zoom")]
    pub preview_zoom: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            raster_multiplier: default_raster_multiplier(),
            debounce_ms: default_debounce_ms(),
            filename_template: default_filename_template(),
            file_extension: default_file_extension(),
            preview_zoom: default_preview_zoom(),
        }
    }
}

impl EngineConfig {
    /// Parse a configuration from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| RenderError::Input(format!("Invalid config: {e}")))
    }

    pub fn debounce_interval(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Context used for snapshots and exported rasters
    pub fn export_context(&self) -> RenderContext {
        RenderContext::new(1.0, self.raster_multiplier)
    }

    /// Context used for on-screen previews
    pub fn preview_context(&self) -> RenderContext {
        RenderContext::new(self.preview_zoom, 1.0)
    }
}
