//! Interactive surface capability
//!
//! A surface owns a live, pixel-space copy of a template that the user
//! edits directly. The template model only sees those edits through
//! [`InteractiveSurface::serialize_to_template`].

use crate::Result;
use cert_template::{Color, ElementId, ElementKind, RenderContext, Row, Template};
use image::RgbaImage;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Where an edit sits within a user gesture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GesturePhase {
    /// Mid-drag or mid-typing; more edits are expected
    Continuing,
    /// The gesture ended (mouse up, blur, discrete action)
    Finished,
}

/// A user edit, expressed in surface pixels
#[derive(Debug, Clone, PartialEq)]
pub enum Edit {
    Add {
        kind: ElementKind,
        x_px: f64,
        y_px: f64,
    },
    Move {
        id: ElementId,
        x_px: f64,
        y_px: f64,
    },
    /// Text and lines only use the width; circles use the smaller side
    Resize {
        id: ElementId,
        width_px: f64,
        height_px: f64,
    },
    Recolor {
        id: ElementId,
        color: Color,
    },
    Delete {
        id: ElementId,
    },
    EditText {
        id: ElementId,
        content: String,
    },
    Rotate {
        id: ElementId,
        degrees: f64,
    },
}

impl Edit {
    /// Element the edit targets, if it already exists
    pub fn target(&self) -> Option<&ElementId> {
        match self {
            Edit::Add { .. } => None,
            Edit::Move { id, .. }
            | Edit::Resize { id, .. }
            | Edit::Recolor { id, .. }
            | Edit::Delete { id }
            | Edit::EditText { id, .. }
            | Edit::Rotate { id, .. } => Some(id),
        }
    }
}

/// Payload of an edit notification
#[derive(Debug, Clone, PartialEq)]
pub struct EditSummary {
    /// Number of edits coalesced into this notification
    pub edits: usize,
    /// Element touched by the most recent edit
    pub last_element: Option<ElementId>,
    pub phase: GesturePhase,
}

/// Snapshot settings
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SnapshotOptions {
    /// Pixels per mm of the snapshot; defaults to the surface's own scale
    pub scale: Option<f64>,
}

/// An image element that could not be drawn
#[derive(Debug, Clone, PartialEq)]
pub struct ImageFailure {
    pub element: ElementId,
    pub message: String,
}

/// Problems found during the most recent render
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SurfaceDiagnostics {
    pub image_failures: Vec<ImageFailure>,
}

impl SurfaceDiagnostics {
    pub fn is_clean(&self) -> bool {
        self.image_failures.is_empty()
    }
}

/// Callback fired after (debounced) edits
pub type EditCallback = Box<dyn FnMut(&EditSummary)>;

/// An editable rendering of a template
pub trait InteractiveSurface {
    /// Replace the surface contents with `template`
    fn load_template(&mut self, template: &Template, context: RenderContext);

    /// Register the edit notification callback, replacing any previous one
    fn on_edit(&mut self, callback: EditCallback);

    /// Apply a user edit at time `now`
    fn apply_edit(&mut self, edit: Edit, phase: GesturePhase, now: Instant) -> Result<()>;

    /// Flush debounced notifications whose quiet period ended before `now`
    fn tick(&mut self, now: Instant);

    /// Current contents as a template in mm
    fn serialize_to_template(&self) -> Template;

    /// Rescale for a new zoom or raster multiplier; the content is unchanged
    fn resize(&mut self, context: RenderContext);

    /// Rasterize the current contents, substituting `row` into text
    fn snapshot(&mut self, row: Option<&Row>, options: &SnapshotOptions) -> Result<RgbaImage>;

    /// Diagnostics of the most recent snapshot
    fn diagnostics(&self) -> &SurfaceDiagnostics;
}
