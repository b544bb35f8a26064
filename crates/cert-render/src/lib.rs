//! Certificate rendering - surfaces, export and batch generation
//!
//! This crate provides:
//! - The [`InteractiveSurface`] capability and a raster implementation
//! - Text layout shared by the raster and PDF paths
//! - PDF export, either element by element or from a surface snapshot
//! - Preview scheduling with cancel-and-replace semantics
//! - Batch generation over a data source
//!
//! # Example
//!
//! ```ignore
//! use cert_render::{BatchController, BatchMode, EngineConfig};
//!
//! let controller = BatchController::new(EngineConfig::default());
//! let output = controller.generate(&template, &data, BatchMode::Combined)?;
//! ```

mod batch;
mod canvas;
mod config;
mod debounce;
mod export;
mod glyphs;
pub mod layout;
mod preview;
mod raster;
mod session;
mod surface;

pub use batch::{
    generate, render_filename, BatchController, BatchMode, BatchOutput, BatchProgress,
    SeparateDocument,
};
pub use config::EngineConfig;
pub use debounce::Debouncer;
pub use export::{Exporter, Strategy};
pub use glyphs::FontBook;
pub use preview::{encode_png, BlobRegistry, MemoryBlobRegistry, PreviewScheduler, PreviewSlot, PreviewTicket};
pub use raster::RasterSurface;
pub use session::SurfaceSession;
pub use surface::{
    Edit, EditSummary, GesturePhase, ImageFailure, InteractiveSurface, SnapshotOptions,
    SurfaceDiagnostics,
};

use thiserror::Error;

/// Errors that can occur while rendering or generating documents
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Surface error: {0}")]
    Surface(String),

    #[error("Export error: {0}")]
    Export(String),

    #[error("Image error: {0}")]
    Image(String),

    #[error("Invalid input: {0}")]
    Input(String),

    #[error("PDF error: {0}")]
    Pdf(#[from] cert_pdf::PdfError),

    #[error("Template error: {0}")]
    Template(#[from] cert_template::TemplateError),
}

impl From<image::ImageError> for RenderError {
    fn from(err: image::ImageError) -> Self {
        RenderError::Image(err.to_string())
    }
}

/// Result type for rendering operations
pub type Result<T> = std::result::Result<T, RenderError>;
